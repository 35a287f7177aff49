//! Fenced code block scanning
//!
//! Uses pulldown-cmark to locate fenced blocks in a (possibly half-streamed)
//! buffer. CommonMark treats a fence still open at end-of-input as a block
//! running to the end of the document, so the last block of a buffer that
//! ends mid-fence comes back with its partial content. A block is *closed*
//! when its source range ends in a matching closing fence line.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// A fenced code block found in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Language tag: first word of the info string, lowercased
    pub tag: Option<String>,
    /// Block content without the fence lines
    pub content: String,
    /// Whether a closing fence has been seen
    pub closed: bool,
    /// Byte range of the whole block (fences included)
    pub span: Range<usize>,
}

impl FencedBlock {
    /// Content with surrounding whitespace removed
    #[inline]
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.content.trim()
    }
}

/// Scan `buffer` for fenced code blocks, in document order
#[must_use]
pub fn scan_blocks(buffer: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(Option<String>, Range<usize>, String)> = None;

    for (event, range) in Parser::new_ext(buffer, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some((language_tag(&info), range, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, _, ref mut content)) = current {
                    content.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((tag, span, content)) = current.take() {
                    let closed = is_closed(&buffer[span.clone()]);
                    let content = if closed {
                        content
                    } else {
                        strip_partial_fence(&content).to_string()
                    };
                    blocks.push(FencedBlock {
                        tag,
                        content,
                        closed,
                        span,
                    });
                }
            }
            _ => {}
        }
    }

    blocks
}

/// First word of a fence info string, lowercased
fn language_tag(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == '{' || c == ':' || c == ',')
        .find(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Remove container prefixes (indentation, blockquote markers)
fn fence_line(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '>']).trim_end()
}

/// Fence character and run length of an opening fence line
fn opening_fence(line: &str) -> Option<(char, usize)> {
    let line = fence_line(line);
    let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

fn is_closed(source: &str) -> bool {
    let mut lines = source.trim_end_matches(['\n', '\r']).lines();
    let Some((ch, open_len)) = lines.next().and_then(opening_fence) else {
        return false;
    };
    let Some(last) = lines.last() else {
        return false;
    };
    let last = fence_line(last);
    !last.is_empty() && last.chars().all(|c| c == ch) && last.chars().count() >= open_len
}

/// Drop a trailing line that is the beginning of a closing fence
fn strip_partial_fence(content: &str) -> &str {
    let body = content.trim_end_matches(['\n', '\r']);
    match body.rfind('\n') {
        Some(idx) => {
            let last = fence_line(&body[idx + 1..]);
            if !last.is_empty() && last.chars().all(|c| c == '`' || c == '~') {
                &body[..idx]
            } else {
                content
            }
        }
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_closed_block_with_tag() {
        let blocks = scan_blocks("intro\n```mermaid\ngraph TD; A-->B\n```\noutro");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tag.as_deref(), Some("mermaid"));
        assert_eq!(blocks[0].trimmed(), "graph TD; A-->B");
        assert!(blocks[0].closed);
    }

    #[test]
    fn open_block_runs_to_end() {
        let blocks = scan_blocks("```html\n<div>Hi");
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].closed);
        assert_eq!(blocks[0].trimmed(), "<div>Hi");
    }

    #[test]
    fn partial_closing_fence_is_stripped() {
        let blocks = scan_blocks("```html\n<div>Hi</div>\n``");
        assert!(!blocks[0].closed);
        assert_eq!(blocks[0].trimmed(), "<div>Hi</div>");
    }

    #[test]
    fn closing_fence_at_end_of_buffer() {
        let blocks = scan_blocks("```svg\n<svg></svg>\n```");
        assert!(blocks[0].closed);
        assert_eq!(blocks[0].trimmed(), "<svg></svg>");
    }

    #[test]
    fn tag_takes_first_word_lowercased() {
        let blocks = scan_blocks("```HTML title=app\n<p>x</p>\n```");
        assert_eq!(blocks[0].tag.as_deref(), Some("html"));
    }

    #[test]
    fn untagged_block_has_no_tag() {
        let blocks = scan_blocks("```\n{}\n```");
        assert_eq!(blocks[0].tag, None);
    }

    #[test]
    fn longer_opening_fence_needs_longer_close() {
        let blocks = scan_blocks("````markdown\n```js\nx\n```\n");
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].closed);
        assert!(blocks[0].content.contains("```js"));
    }

    #[test]
    fn multiple_blocks_in_order() {
        let blocks = scan_blocks("```json\n{}\n```\ntext\n```svg\n<svg/>\n```\n");
        let tags: Vec<_> = blocks.iter().map(|b| b.tag.clone()).collect();
        assert_eq!(tags, vec![Some("json".to_string()), Some("svg".to_string())]);
    }

    #[test]
    fn no_blocks_in_prose() {
        assert!(scan_blocks("just some `inline` text").is_empty());
    }
}
