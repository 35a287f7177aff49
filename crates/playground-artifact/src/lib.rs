//! Playground Artifact System
//!
//! Typed, content-addressed artifacts produced from streamed model output.
//!
//! # Core Concepts
//!
//! - [`Artifact`]: immutable `(kind, content)` value with a content hash
//! - [`ArtifactKind`]: closed set of renderable formats
//! - [`ContentHash`]: 32-byte Blake3 hash used for change detection
//! - [`ExportFormat`]: MIME type and file extension per kind
//!
//! # Example
//!
//! ```rust
//! use playground_artifact::{Artifact, ArtifactKind, ExportFormat};
//!
//! let artifact = Artifact::new(ArtifactKind::Svg, "<svg></svg>").unwrap();
//! assert_eq!(ExportFormat::for_kind(artifact.kind()).mime, "image/svg+xml");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod export;
mod hash;
mod kind;

pub use artifact::{Artifact, ArtifactError};
pub use export::{ExportFormat, ExportSource};
pub use hash::ContentHash;
pub use kind::{ArtifactKind, UnknownKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
