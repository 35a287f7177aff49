//! Error types for playground core
//!
//! Provides error handling for:
//! - Configuration loading
//! - Export and download
//! - Clipboard access
//! - Everything below, through the umbrella [`PlaygroundError`]

use playground_artifact::{ArtifactError, ArtifactKind};
use playground_render::{LibraryError, ProtocolError, RenderError};
use std::path::PathBuf;

/// Main playground error type
#[derive(Debug, thiserror::Error)]
pub enum PlaygroundError {
    /// Artifact construction failed
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Library could not be loaded
    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    /// Render pass failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Cross-context message rejected
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Export failed
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration invalid
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Clipboard unavailable
    #[error("clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// Export failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// No artifact adopted
    #[error("nothing to export")]
    NoArtifact,

    /// Export needs a rendering that does not exist yet
    #[error("{0} export needs a successful render first")]
    NotRendered(ArtifactKind),

    /// Renderer failed to produce the export
    #[error("export of {kind} failed: {reason}")]
    Failed { kind: ArtifactKind, reason: String },

    /// Rasterized export was not a base64 data URL
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse or did not match the schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Clipboard failures reported by the host
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// Result type for playground operations
pub type Result<T> = std::result::Result<T, PlaygroundError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_error_display() {
        assert_eq!(
            ExportError::NotRendered(ArtifactKind::Mermaid).to_string(),
            "mermaid export needs a successful render first"
        );
    }

    #[test]
    fn umbrella_conversion() {
        let err: PlaygroundError = ExportError::NoArtifact.into();
        assert_eq!(err.to_string(), "export error: nothing to export");
    }
}
