//! Loose object-literal parsing
//!
//! Chart options and mind-maps are frequently emitted as JavaScript rather
//! than strict JSON: `option = { ... };`, unquoted keys, single-quoted
//! strings, trailing commas and comments. [`parse_loose_literal`] tries strict
//! JSON first and falls back to a relaxing rewrite that only touches tokens
//! outside of string literals.

use crate::error::LiteralError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:var|let|const)\s+)?option\s*=\s*").expect("option assignment pattern is valid")
});

/// Strip an `option =` assignment prefix and a trailing semicolon
#[must_use]
pub fn strip_assignment(text: &str) -> &str {
    let text = text.trim();
    let text = match ASSIGNMENT.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    text.trim_end().trim_end_matches(';').trim_end()
}

/// Parse a JSON value or JavaScript object literal
///
/// # Errors
/// Returns [`LiteralError::Empty`] for blank input and
/// [`LiteralError::Syntax`] carrying the strict parser message when neither
/// the strict nor the relaxed form parses.
pub fn parse_loose_literal(text: &str) -> Result<Value, LiteralError> {
    let body = strip_assignment(text);
    if body.is_empty() {
        return Err(LiteralError::Empty);
    }
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(strict) => {
            let relaxed = relax(body);
            serde_json::from_str(&relaxed).map_err(|_| LiteralError::Syntax(strict.to_string()))
        }
    }
}

/// Parse the first complete value of a literal followed by other text
///
/// Used for closed JSON blocks whose payload does not parse as a whole, so
/// they keep the kind their leading value had while streaming.
#[must_use]
pub fn parse_leading_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    let body = match ASSIGNMENT.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    first_value(body).or_else(|| first_value(&relax(body)))
}

fn first_value(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Rewrite JS literal syntax into JSON
fn relax(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out);
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
                continue;
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(',');
                }
            }
            c if is_ident_start(c) && in_key_position(&out) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let colon_follows = chars[i..]
                    .iter()
                    .find(|c| !c.is_whitespace())
                    .is_some_and(|c| *c == ':');
                if colon_follows {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

/// Copy a string literal starting at `start`, re-quoted with `"`
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                if next == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(next);
                }
                i += 2;
                continue;
            }
        }
        if c == quote {
            out.push('"');
            return i + 1;
        }
        if c == '"' {
            out.push_str("\\\"");
        } else {
            out.push(c);
        }
        i += 1;
    }
    out.push('"');
    i
}

fn in_key_position(out: &str) -> bool {
    matches!(out.trim_end().chars().last(), Some('{' | ','))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strict_json_passes_through() {
        let value = parse_loose_literal(r#"{"series": [{"type": "bar"}]}"#).unwrap();
        assert_eq!(value, json!({"series": [{"type": "bar"}]}));
    }

    #[test]
    fn assignment_and_semicolon_are_tolerated() {
        let value = parse_loose_literal("option = {\"title\": {\"text\": \"A\"}};").unwrap();
        assert_eq!(value, json!({"title": {"text": "A"}}));

        let value = parse_loose_literal("const option = {\"a\": 1};\n").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn js_object_literal_is_relaxed() {
        let src = r"option = {
            // chart title
            title: { text: 'Sales' },
            xAxis: { type: 'category', data: ['Mon', 'Tue',] },
            series: [{ type: 'line', data: [1, 2], }],
        };";
        let value = parse_loose_literal(src).unwrap();
        assert_eq!(value["title"]["text"], "Sales");
        assert_eq!(value["xAxis"]["data"], json!(["Mon", "Tue"]));
        assert_eq!(value["series"][0]["data"], json!([1, 2]));
    }

    #[test]
    fn strings_are_not_rewritten() {
        let value = parse_loose_literal(r#"{label: 'a, b: "c"', url: "http://x/y"}"#).unwrap();
        assert_eq!(value["label"], "a, b: \"c\"");
        assert_eq!(value["url"], "http://x/y");
    }

    #[test]
    fn keywords_in_value_position_survive() {
        let value = parse_loose_literal("{show: true, extra: null}").unwrap();
        assert_eq!(value, json!({"show": true, "extra": null}));
    }

    #[test]
    fn error_carries_strict_message() {
        let err = parse_loose_literal("{\"a\": }").unwrap_err();
        assert!(matches!(err, LiteralError::Syntax(ref msg) if msg.contains("line 1")));
    }

    #[test]
    fn blank_input_is_empty_error() {
        assert_eq!(parse_loose_literal("option = ;"), Err(LiteralError::Empty));
    }

    #[test]
    fn leading_value_ignores_trailing_text() {
        assert_eq!(
            parse_leading_literal("{\"a\": 1}\n{\"b\": 2}"),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            parse_leading_literal("option = {series: []};\nmyChart.setOption(option);"),
            Some(json!({"series": []}))
        );
        assert_eq!(parse_leading_literal("{\"name\": "), None);
    }
}
