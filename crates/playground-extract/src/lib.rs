//! Playground Artifact Extraction
//!
//! Decides whether, and when, a growing model response contains a renderable
//! artifact.
//!
//! # Contract
//!
//! - [`extract`] is pure and idempotent: the same buffer always yields the
//!   same result
//! - It never panics on partial or malformed input; ambiguity is `None`
//! - Cost is linear in the buffer, so it can run after every chunk
//!
//! # Example
//!
//! ```rust
//! use playground_artifact::ArtifactKind;
//! use playground_extract::extract;
//!
//! let artifact = extract("```mermaid\ngraph TD; A-->B\n```").unwrap();
//! assert_eq!(artifact.kind(), ArtifactKind::Mermaid);
//! assert_eq!(artifact.content(), "graph TD; A-->B");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod extractor;
pub mod fence;
pub mod literal;
pub mod sniff;
pub mod stream;

// Re-exports for convenience
pub use error::LiteralError;
pub use extractor::{extract, ArtifactExtractor};
pub use literal::{parse_leading_literal, parse_loose_literal, strip_assignment};
pub use stream::StreamingExtractor;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
