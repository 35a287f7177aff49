//! Streaming adapter
//!
//! Accumulates chunks from the host's streaming pipeline and re-runs
//! extraction after each append, reporting only material changes.

use crate::extractor::ArtifactExtractor;
use playground_artifact::Artifact;

/// Buffer plus latest extraction result for one in-flight response
#[derive(Debug, Clone, Default)]
pub struct StreamingExtractor {
    extractor: ArtifactExtractor,
    buffer: String,
    current: Option<Artifact>,
    passes: usize,
}

impl StreamingExtractor {
    /// Create an empty stream
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and re-extract
    ///
    /// Returns the new artifact when it differs materially from the previous
    /// one; `None` when nothing changed or nothing is renderable yet. A
    /// previously detected artifact is kept while the buffer is ambiguous.
    pub fn push(&mut self, chunk: &str) -> Option<&Artifact> {
        self.buffer.push_str(chunk);
        self.passes += 1;

        let found = self.extractor.extract(&self.buffer)?;
        let changed = self
            .current
            .as_ref()
            .map_or(true, |current| current.differs_from(&found));
        if !changed {
            return None;
        }

        tracing::debug!(
            kind = %found.kind(),
            hash = %found.hash().short(),
            pass = self.passes,
            "artifact updated"
        );
        self.current = Some(found);
        self.current.as_ref()
    }

    /// Final extraction on stream completion
    ///
    /// The result of this pass is authoritative: if the finished buffer holds
    /// an artifact it replaces any speculative one.
    pub fn finish(&mut self) -> Option<Artifact> {
        if let Some(found) = self.extractor.extract(&self.buffer) {
            self.current = Some(found);
        }
        self.current.clone()
    }

    /// Latest artifact, if any
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&Artifact> {
        self.current.as_ref()
    }

    /// Accumulated text
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Drop buffer and result (conversation cleared)
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.current = None;
        self.passes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_artifact::ArtifactKind;

    #[test]
    fn reports_only_changes() {
        let mut stream = StreamingExtractor::new();
        assert!(stream.push("Here you go:\n").is_none());
        assert!(stream.push("```html\n<div>Hi").is_some());
        assert!(stream.push("").is_none());
        let updated = stream.push("</div>\n```").unwrap();
        assert_eq!(updated.content(), "<div>Hi</div>");
    }

    #[test]
    fn finish_is_authoritative() {
        let mut stream = StreamingExtractor::new();
        stream.push("```mermaid\ngraph TD; A-->B\n```");
        let last = stream.finish().unwrap();
        assert_eq!(last.kind(), ArtifactKind::Mermaid);
    }

    #[test]
    fn keeps_previous_artifact_while_ambiguous() {
        let mut stream = StreamingExtractor::new();
        stream.push("```svg\n<svg/>\n```\n```json\n{");
        assert!(stream.current().is_none());

        let mut stream = StreamingExtractor::new();
        stream.push("```svg\n<svg/>\n```\n");
        stream.push("```json\n{");
        assert_eq!(stream.current().map(Artifact::kind), Some(ArtifactKind::Svg));
    }

    #[test]
    fn reset_clears_state() {
        let mut stream = StreamingExtractor::new();
        stream.push("```svg\n<svg/>\n```");
        stream.reset();
        assert!(stream.current().is_none());
        assert!(stream.buffer().is_empty());
    }
}
