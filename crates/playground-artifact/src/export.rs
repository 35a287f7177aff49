//! Export descriptors
//!
//! Maps every [`ArtifactKind`] to the MIME type and file extension used by the
//! download action, and records whether the exported bytes come from the
//! source text or from the rendered output.

use crate::kind::ArtifactKind;

/// Where the export body comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// The (possibly edited) source text
    Source,
    /// Serialized SVG of the rendered diagram
    RenderedSvg,
    /// PNG rasterization of the live chart
    RenderedPng,
}

/// Download format for an artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// MIME type of the download
    pub mime: &'static str,
    /// File extension (without dot)
    pub extension: &'static str,
    /// Body source
    pub source: ExportSource,
}

impl ExportFormat {
    /// Export format for a kind
    #[must_use]
    pub const fn for_kind(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Html => Self::source("text/html", "html"),
            ArtifactKind::Svg => Self::source("image/svg+xml", "svg"),
            ArtifactKind::Drawio => Self::source("application/xml", "drawio"),
            ArtifactKind::Markdown => Self::source("text/markdown", "md"),
            ArtifactKind::Mindmap | ArtifactKind::Json => {
                Self::source("application/json", "json")
            }
            ArtifactKind::Mermaid => Self {
                mime: "image/svg+xml",
                extension: "svg",
                source: ExportSource::RenderedSvg,
            },
            ArtifactKind::Echarts => Self {
                mime: "image/png",
                extension: "png",
                source: ExportSource::RenderedPng,
            },
        }
    }

    const fn source(mime: &'static str, extension: &'static str) -> Self {
        Self {
            mime,
            extension,
            source: ExportSource::Source,
        }
    }

    /// File name for a base name, e.g. `artifact.svg`
    #[must_use]
    pub fn file_name(&self, base: &str) -> String {
        format!("{base}.{}", self.extension)
    }

    /// Whether export needs a successful render first
    #[inline]
    #[must_use]
    pub const fn requires_render(&self) -> bool {
        !matches!(self.source, ExportSource::Source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_table() {
        let cases = [
            (ArtifactKind::Html, "text/html", "html"),
            (ArtifactKind::Svg, "image/svg+xml", "svg"),
            (ArtifactKind::Drawio, "application/xml", "drawio"),
            (ArtifactKind::Mermaid, "image/svg+xml", "svg"),
            (ArtifactKind::Echarts, "image/png", "png"),
            (ArtifactKind::Markdown, "text/markdown", "md"),
            (ArtifactKind::Mindmap, "application/json", "json"),
            (ArtifactKind::Json, "application/json", "json"),
        ];
        for (kind, mime, ext) in cases {
            let format = ExportFormat::for_kind(kind);
            assert_eq!(format.mime, mime, "{kind}");
            assert_eq!(format.extension, ext, "{kind}");
        }
    }

    #[test]
    fn rendered_exports() {
        assert!(ExportFormat::for_kind(ArtifactKind::Mermaid).requires_render());
        assert!(ExportFormat::for_kind(ArtifactKind::Echarts).requires_render());
        assert!(!ExportFormat::for_kind(ArtifactKind::Html).requires_render());
    }

    #[test]
    fn file_name_uses_extension() {
        let format = ExportFormat::for_kind(ArtifactKind::Markdown);
        assert_eq!(format.file_name("artifact"), "artifact.md");
    }
}
