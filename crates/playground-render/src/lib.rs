//! Sandboxed multi-format rendering
//!
//! Turns an [`playground_artifact::Artifact`] into something visible:
//!
//! - HTML runs in a sandboxed frame with console forwarding
//! - SVG, Markdown and JSON are inserted inline
//! - Diagrams, charts and mind maps go through lazily loaded engines
//! - Draw.io XML opens in the embedded editor with live sync
//!
//! The browser is abstracted behind [`MountPoint`] and [`FrameHost`]; the
//! engines behind the traits in [`engine`]. Engines load on first use through
//! the [`LibraryRegistry`].

#![allow(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod generation;
pub mod library;
pub mod protocol;
pub mod renderers;
pub mod surface;

pub use config::{
    DiagramConfig, DrawioConfig, ExportConfig, HierarchyConfig, LibraryTag, SandboxConfig,
    SandboxPermission, SandboxPolicy,
};
pub use console::{ConsoleLevel, ConsoleLogAggregator, ConsoleLogEntry};
pub use engine::{ChartEngine, ChartInstance, DiagramEngine, DiagramLook, GraphLayoutEngine};
pub use error::{HierarchyError, LibraryError, ProtocolError, RenderError};
pub use generation::{Generation, RenderTicket};
pub use library::{LibraryHandle, LibraryId, LibraryLoader, LibraryRegistry};
pub use renderers::chart::{ChartLease, ChartRenderer};
pub use renderers::diagram::DiagramRenderer;
pub use renderers::drawio::{DrawioRenderer, EditorUpdate};
pub use renderers::hierarchy::{HierarchyNode, HierarchyRenderer, SvgTreeEngine, TreeScene};
pub use renderers::html::HtmlSandboxRenderer;
pub use renderers::vector::VectorDocRenderer;
pub use renderers::{FormatRenderer, MountContext, RenderOutcome};
pub use surface::{
    FrameHost, FrameId, FrameSource, FrameSpec, MountPoint, ResizeCallback, ResizeGuard,
    ResizeObserver, Size,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ConsoleLevel, ConsoleLogAggregator, FormatRenderer, FrameHost, LibraryId,
        LibraryRegistry, MountContext, MountPoint, RenderOutcome, Size,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
