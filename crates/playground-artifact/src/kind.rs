//! Artifact kinds
//!
//! The closed set of payload formats the playground knows how to render.
//! Adding a kind is a compiler-checked change: every `match` over
//! [`ArtifactKind`] (dispatch table, export table, sniffing) must handle it.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Renderable artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Self-contained HTML application or fragment
    Html,
    /// Draw.io (`<mxfile>` / `<mxGraphModel>`) XML document
    Drawio,
    /// Mermaid diagram grammar
    Mermaid,
    /// ECharts option object literal
    Echarts,
    /// Raw `<svg>` markup
    Svg,
    /// CommonMark + GFM document
    Markdown,
    /// Hierarchical mind-map JSON
    Mindmap,
    /// Arbitrary JSON for generic viewing
    Json,
}

impl ArtifactKind {
    /// All kinds, in sniffing priority order
    pub const ALL: [ArtifactKind; 8] = [
        ArtifactKind::Html,
        ArtifactKind::Drawio,
        ArtifactKind::Svg,
        ArtifactKind::Mindmap,
        ArtifactKind::Echarts,
        ArtifactKind::Json,
        ArtifactKind::Mermaid,
        ArtifactKind::Markdown,
    ];

    /// Stable lowercase tag
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Html => "html",
            ArtifactKind::Drawio => "drawio",
            ArtifactKind::Mermaid => "mermaid",
            ArtifactKind::Echarts => "echarts",
            ArtifactKind::Svg => "svg",
            ArtifactKind::Markdown => "markdown",
            ArtifactKind::Mindmap => "mindmap",
            ArtifactKind::Json => "json",
        }
    }

    /// Whether the payload is JSON-shaped
    #[inline]
    #[must_use]
    pub const fn is_json_family(self) -> bool {
        matches!(
            self,
            ArtifactKind::Echarts | ArtifactKind::Mindmap | ArtifactKind::Json
        )
    }

    /// Whether an in-preview editor can write back into the editable copy
    #[inline]
    #[must_use]
    pub const fn is_live_editable(self) -> bool {
        matches!(self, ArtifactKind::Drawio)
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`ArtifactKind`] tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown artifact kind: '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ArtifactKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip_through_from_str() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.as_str().parse::<ArtifactKind>(), Ok(kind));
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("HTML".parse::<ArtifactKind>(), Ok(ArtifactKind::Html));
        assert!("python".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&ArtifactKind::Mindmap).unwrap();
        assert_eq!(json, "\"mindmap\"");
    }

    #[test]
    fn json_family() {
        assert!(ArtifactKind::Echarts.is_json_family());
        assert!(!ArtifactKind::Svg.is_json_family());
    }

    #[test]
    fn only_drawio_has_a_live_editor() {
        let editable: Vec<_> = ArtifactKind::ALL
            .into_iter()
            .filter(|k| k.is_live_editable())
            .collect();
        assert_eq!(editable, vec![ArtifactKind::Drawio]);
    }
}
