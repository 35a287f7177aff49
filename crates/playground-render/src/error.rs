//! Error types for rendering
//!
//! Provides error handling for:
//! - Library loads (rendering engines fetched on demand)
//! - Render passes (engine failures, invalid content)
//! - Mind-map payload parsing
//! - Cross-context message validation

use crate::library::LibraryId;

/// Errors acquiring a rendering library
///
/// `Clone` because one failed in-flight load is reported to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    /// No loader registered for the library
    #[error("no loader registered for library: {0}")]
    NotRegistered(LibraryId),

    /// Fetching or initializing the library failed
    #[error("failed to load {library}: {reason}")]
    LoadFailed { library: LibraryId, reason: String },

    /// Loader returned a handle for a different library
    #[error("loader for {expected} returned a {actual} handle")]
    WrongHandle {
        expected: LibraryId,
        actual: LibraryId,
    },
}

impl LibraryError {
    /// Create load failure for library
    pub fn load_failed(library: LibraryId, reason: impl Into<String>) -> Self {
        Self::LoadFailed {
            library,
            reason: reason.into(),
        }
    }
}

/// Errors during a render pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Library could not be acquired
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Engine rejected the content or failed internally
    #[error("{0}")]
    Engine(String),

    /// Content could not be interpreted
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Operation needs a mounted renderer
    #[error("nothing is mounted")]
    NotMounted,
}

/// Errors interpreting a mind-map payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// No `{ ... }` object in the payload
    #[error("no JSON object found")]
    NoObject,

    /// Top-level array: the layout needs a single root
    #[error("top-level array is not a tree: expected a single root object")]
    TopLevelArray,

    /// Payload did not parse
    #[error("{0}")]
    Syntax(String),
}

/// Errors validating a cross-context message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Not JSON, or JSON of an unknown shape
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Message schema newer than this host understands
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// Sent by a frame that has since been discarded
    #[error("message from stale frame")]
    StaleFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_error_display() {
        let err = LibraryError::load_failed(LibraryId::Chart, "network down");
        assert_eq!(err.to_string(), "failed to load chart engine: network down");
    }

    #[test]
    fn render_error_wraps_library_error() {
        let err: RenderError = LibraryError::NotRegistered(LibraryId::Diagram).into();
        assert_eq!(
            err.to_string(),
            "no loader registered for library: diagram engine"
        );
    }

    #[test]
    fn hierarchy_error_display() {
        assert!(HierarchyError::TopLevelArray
            .to_string()
            .contains("single root"));
    }
}
