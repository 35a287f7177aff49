//! Artifact extractor
//!
//! Pure, idempotent `buffer -> Option<Artifact>` detection, cheap enough to
//! run after every streamed chunk.
//!
//! # Algorithm
//!
//! 1. Scan fenced blocks. If the last one is still open, it alone decides:
//!    its speculative artifact, or `None` while it is not renderable yet.
//! 2. Otherwise walk closed blocks from last to first and take the first one
//!    that classifies as an artifact.
//!    A closed `json` block that does not parse as a whole is classified by
//!    its leading value, or as plain JSON so the viewer can report the error.
//! 3. A buffer without any fence is only an artifact when it starts with a
//!    full markup document (HTML, SVG, Draw.io).
//!
//! # Streaming stability
//!
//! While a block is open its kind must not flip as it grows, so open blocks
//! never use the Markdown fallback, tagged JSON-family kinds wait until the
//! payload parses, untagged blocks are never guessed as JSON, and keyword
//! sniffing waits for the first line to complete.

use crate::fence::{scan_blocks, FencedBlock};
use crate::literal::{parse_leading_literal, parse_loose_literal};
use crate::sniff::{classify_json, sniff, sniff_markup, Sniffed};
use playground_artifact::{Artifact, ArtifactKind};

/// How a fence language tag maps onto kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagHint {
    /// Tag names a kind directly
    Kind(ArtifactKind),
    /// `json` and friends: sub-classified by shape
    JsonFamily,
    /// Tag present but not one we render
    Unrecognized,
    /// No tag
    Untagged,
}

fn tag_hint(tag: Option<&str>) -> TagHint {
    let Some(tag) = tag else {
        return TagHint::Untagged;
    };
    match tag {
        "html" | "htm" => TagHint::Kind(ArtifactKind::Html),
        "svg" => TagHint::Kind(ArtifactKind::Svg),
        "mermaid" | "mmd" => TagHint::Kind(ArtifactKind::Mermaid),
        "drawio" | "xml" | "mxgraph" => TagHint::Kind(ArtifactKind::Drawio),
        "echarts" => TagHint::Kind(ArtifactKind::Echarts),
        "mindmap" | "markmap" => TagHint::Kind(ArtifactKind::Mindmap),
        "markdown" | "md" => TagHint::Kind(ArtifactKind::Markdown),
        "json" | "jsonc" | "json5" => TagHint::JsonFamily,
        _ => TagHint::Unrecognized,
    }
}

/// Detects renderable artifacts in streamed model output
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactExtractor;

impl ArtifactExtractor {
    /// Create new extractor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract the current artifact from `buffer`
    ///
    /// Never panics on partial or malformed input; returns `None` when the
    /// buffer holds no plausible artifact yet.
    #[must_use]
    pub fn extract(&self, buffer: &str) -> Option<Artifact> {
        let blocks = scan_blocks(buffer);

        let artifact = match blocks.last() {
            None => Self::bare_document(buffer),
            Some(last) if !last.closed => Self::classify(last),
            Some(_) => blocks
                .iter()
                .rev()
                .filter(|block| block.closed)
                .find_map(Self::classify),
        };

        tracing::trace!(
            buffer_len = buffer.len(),
            blocks = blocks.len(),
            kind = artifact.as_ref().map(|a| a.kind().as_str()),
            "extraction pass"
        );
        artifact
    }

    fn classify(block: &FencedBlock) -> Option<Artifact> {
        let content = block.trimmed();
        if content.is_empty() {
            return None;
        }

        let kind = match tag_hint(block.tag.as_deref()) {
            TagHint::Kind(kind) if kind.is_json_family() && !block.closed => {
                parse_loose_literal(content).ok().map(|_| kind)
            }
            TagHint::Kind(kind) => Some(kind),
            TagHint::JsonFamily if block.closed => Some(
                parse_loose_literal(content)
                    .ok()
                    .or_else(|| parse_leading_literal(content))
                    .map_or(ArtifactKind::Json, |value| classify_json(&value)),
            ),
            TagHint::JsonFamily => parse_loose_literal(content)
                .ok()
                .map(|value| classify_json(&value)),
            hint @ (TagHint::Unrecognized | TagHint::Untagged) => {
                // Untrimmed tail: keyword sniffing needs to see the newline
                // that completes the first line.
                match sniff(block.content.trim_start(), block.closed) {
                    Sniffed::Kind(kind) => Some(kind),
                    Sniffed::Fallback if block.closed && hint == TagHint::Untagged => {
                        Some(ArtifactKind::Markdown)
                    }
                    Sniffed::Fallback => None,
                }
            }
        }?;

        Artifact::new(kind, content).ok()
    }

    fn bare_document(buffer: &str) -> Option<Artifact> {
        let content = buffer.trim();
        let kind = sniff_markup(content)?;
        Artifact::new(kind, content).ok()
    }
}

/// Extract the current artifact from `buffer` with the default extractor
#[inline]
#[must_use]
pub fn extract(buffer: &str) -> Option<Artifact> {
    ArtifactExtractor::new().extract(buffer)
}
