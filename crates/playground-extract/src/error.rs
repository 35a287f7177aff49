//! Error types for artifact extraction
//!
//! Extraction itself never fails: ambiguity is `None`. These errors describe
//! why a candidate payload could not be interpreted and are surfaced by the
//! renderers that parse the same payloads.

/// Errors parsing a loose JSON / JS object literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    /// Nothing left after stripping the assignment wrapper
    #[error("empty literal")]
    Empty,

    /// Neither strict JSON nor the relaxed form parsed
    #[error("{0}")]
    Syntax(String),
}
