//! Export payloads
//!
//! Source-based kinds export their editable text as-is. Diagram exports
//! serialize the rendered SVG and chart exports decode the PNG data URL the
//! chart runtime produces.

use crate::error::ExportError;
use base64::Engine as _;
use playground_artifact::{ArtifactKind, ExportFormat};

/// File ready for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Suggested download name, e.g. `artifact.svg`
    pub file_name: String,
    /// MIME type of `bytes`
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    /// Payload for `kind` named after `stem`
    #[must_use]
    pub fn new(kind: ArtifactKind, stem: &str, bytes: Vec<u8>) -> Self {
        let format = ExportFormat::for_kind(kind);
        Self {
            file_name: format.file_name(stem),
            mime: format.mime,
            bytes,
        }
    }

    /// Payload content as text, when it is UTF-8
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL
///
/// # Errors
/// Returns [`ExportError::InvalidDataUrl`] for anything else.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ExportError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::InvalidDataUrl("missing data: scheme".to_owned()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidDataUrl("missing payload separator".to_owned()))?;
    if !meta.ends_with(";base64") {
        return Err(ExportError::InvalidDataUrl("payload is not base64".to_owned()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ExportError::InvalidDataUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_kind_format() {
        let payload = ExportPayload::new(ArtifactKind::Markdown, "notes", b"# hi".to_vec());
        assert_eq!(payload.file_name, "notes.md");
        assert_eq!(payload.mime, "text/markdown");
        assert_eq!(payload.as_text(), Some("# hi"));
    }

    #[test]
    fn decodes_png_data_url() {
        let bytes = decode_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn rejects_other_urls() {
        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
