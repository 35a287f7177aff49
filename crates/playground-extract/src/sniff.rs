//! Content sniffing
//!
//! Classifies a payload when the fence carries no usable language tag.
//! Priority order: HTML document, Draw.io XML, SVG, JSON family (mind-map,
//! chart option, generic JSON), Mermaid keyword, Markdown fallback.

use crate::literal::{parse_loose_literal, strip_assignment};
use playground_artifact::ArtifactKind;
use serde_json::Value;

/// Top-level keys that mark an ECharts option object
const CHART_KEYS: &[&str] = &[
    "series",
    "xAxis",
    "yAxis",
    "radar",
    "polar",
    "angleAxis",
    "radiusAxis",
    "geo",
    "dataset",
    "visualMap",
    "parallelAxis",
    "singleAxis",
    "calendar",
];

/// Top-level keys that mark a hierarchical mind-map
const HIERARCHY_KEYS: &[&str] = &["mindmap", "nodes", "children"];

/// Leading keywords of the Mermaid diagram grammars
const MERMAID_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "sequenceDiagram",
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "quadrantChart",
    "requirementDiagram",
    "gitGraph",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "mindmap",
    "timeline",
    "zenuml",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "packet-beta",
    "architecture-beta",
    "kanban",
];

/// Result of sniffing a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    /// Recognized by structure
    Kind(ArtifactKind),
    /// Nothing matched; Markdown is the fallback
    Fallback,
}

/// Classify `content` by structure
///
/// `complete` is false while the payload may still grow. JSON shapes are
/// then not guessed, since a literal that parses now may turn out to be the
/// first line of a longer snippet. Keyword matches require the first line
/// to be terminated so a partial word cannot match.
#[must_use]
pub fn sniff(content: &str, complete: bool) -> Sniffed {
    if let Some(kind) = sniff_markup(content) {
        return Sniffed::Kind(kind);
    }
    if complete {
        if let Some(kind) = sniff_json(content) {
            return Sniffed::Kind(kind);
        }
    }
    if is_mermaid(content, complete) {
        return Sniffed::Kind(ArtifactKind::Mermaid);
    }
    Sniffed::Fallback
}

/// Markup kinds recognizable from a prefix alone
#[must_use]
pub fn sniff_markup(content: &str) -> Option<ArtifactKind> {
    let head = skip_prolog(content);
    if starts_with_ci(head, "<!doctype") || starts_with_ci(head, "<html") {
        Some(ArtifactKind::Html)
    } else if starts_with_ci(head, "<mxfile") || starts_with_ci(head, "<mxgraphmodel") {
        Some(ArtifactKind::Drawio)
    } else if starts_with_ci(head, "<svg") {
        Some(ArtifactKind::Svg)
    } else {
        None
    }
}

/// JSON-family kind of a payload that parses as a loose literal
#[must_use]
pub fn sniff_json(content: &str) -> Option<ArtifactKind> {
    let body = strip_assignment(content);
    if !(body.starts_with('{') || body.starts_with('[')) {
        return None;
    }
    let value = parse_loose_literal(content).ok()?;
    Some(classify_json(&value))
}

/// Kind of an already-parsed JSON value
#[must_use]
pub fn classify_json(value: &Value) -> ArtifactKind {
    match value {
        Value::Object(map) if HIERARCHY_KEYS.iter().any(|k| map.contains_key(*k)) => {
            ArtifactKind::Mindmap
        }
        Value::Object(map) if CHART_KEYS.iter().any(|k| map.contains_key(*k)) => {
            ArtifactKind::Echarts
        }
        _ => ArtifactKind::Json,
    }
}

/// Whether the first meaningful line opens a Mermaid grammar
#[must_use]
pub fn is_mermaid(content: &str, complete: bool) -> bool {
    let mut in_front_matter = false;
    let mut seen_any = false;
    let lines = content.trim_start_matches(['\n', '\r']).split_inclusive('\n');

    for line in lines {
        let trimmed = line.trim();
        if !seen_any && trimmed == "---" {
            in_front_matter = true;
            seen_any = true;
            continue;
        }
        seen_any = true;
        if in_front_matter {
            if trimmed == "---" {
                in_front_matter = false;
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        if !complete && !line.ends_with('\n') {
            return false;
        }
        let word = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(';');
        return MERMAID_KEYWORDS.contains(&word);
    }
    false
}

/// Skip XML declarations, comments and leading whitespace
fn skip_prolog(content: &str) -> &str {
    let mut head = content.trim_start();
    loop {
        let next = if head.starts_with("<?") {
            head.find("?>").map(|end| &head[end + 2..])
        } else if head.starts_with("<!--") {
            head.find("-->").map(|end| &head[end + 3..])
        } else {
            None
        };
        match next {
            Some(rest) => head = rest.trim_start(),
            None => return head,
        }
    }
}

fn starts_with_ci(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
