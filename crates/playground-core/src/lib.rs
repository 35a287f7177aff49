//! Artifact playground
//!
//! Ties extraction and rendering together behind a single
//! [`PreviewSurface`]: feed it the latest artifact from a
//! [`playground_extract::StreamingExtractor`] and it routes the content to
//! the matching renderer, keeps the console, and builds exports.
//!
//! ```ignore
//! let mut extractor = StreamingExtractor::new();
//! let surface = PreviewSurface::new(PlaygroundConfig::default(), host);
//! for chunk in transcript_chunks {
//!     surface.adopt(extractor.push(&chunk).cloned()).await;
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod surface;

pub use config::{ConsoleConfig, PlaygroundConfig};
pub use error::{ClipboardError, ConfigError, ExportError, PlaygroundError, Result};
pub use export::{decode_data_url, ExportPayload};
pub use host::{Clipboard, NoClipboard, NoticeLevel, Notifier, TracingNotifier};
pub use surface::{FrameEvent, HostServices, PreviewSurface, ViewTab};

pub use playground_artifact::{Artifact, ArtifactKind};
pub use playground_extract::{extract, StreamingExtractor};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Artifact, ArtifactKind, HostServices, PlaygroundConfig, PlaygroundError,
        PreviewSurface, Result, StreamingExtractor,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
