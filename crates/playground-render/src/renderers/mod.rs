//! Format renderers
//!
//! One renderer per artifact family, all behind [`FormatRenderer`]. The
//! preview surface owns one instance of each and dispatches by kind.
//!
//! Every renderer follows the same lifecycle:
//! 1. `mount` tears down whatever the renderer showed before
//! 2. awaits its library if it needs one, re-checking the ticket afterwards
//! 3. draws, or shows an inline error and reports it to the console
//! 4. `unmount` releases frames, chart instances and resize observers

pub mod chart;
pub mod diagram;
pub mod drawio;
pub mod hierarchy;
pub mod html;
pub mod vector;

use crate::console::{ConsoleLevel, ConsoleLogAggregator};
use crate::generation::RenderTicket;
use crate::surface::MountPoint;
use async_trait::async_trait;
use playground_artifact::ArtifactKind;
use std::fmt;
use std::sync::Arc;

/// Result of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Content is on screen
    Rendered,
    /// An inline error is on screen
    Failed(String),
    /// A newer pass superseded this one; nothing was touched
    Stale,
}

impl RenderOutcome {
    /// Whether the pass drew the content
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Everything a render pass needs from the surface
#[derive(Clone)]
pub struct MountContext {
    pub mount: Arc<dyn MountPoint>,
    pub kind: ArtifactKind,
    pub ticket: RenderTicket,
    pub console: ConsoleLogAggregator,
}

impl MountContext {
    /// Show an inline error and mirror it to the console
    pub(crate) fn fail(&self, message: impl Into<String>) -> RenderOutcome {
        let message = message.into();
        tracing::warn!(kind = %self.kind, error = %message, "render failed");
        self.mount.show_error(&message);
        self.console.push(ConsoleLevel::Error, message.clone());
        RenderOutcome::Failed(message)
    }
}

impl fmt::Debug for MountContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountContext")
            .field("kind", &self.kind)
            .field("generation", &self.ticket.value())
            .finish_non_exhaustive()
    }
}

/// Renderer for one artifact family
#[async_trait]
pub trait FormatRenderer: Send + Sync {
    /// Renderer name for logs
    fn name(&self) -> &'static str;

    /// Whether this renderer draws `kind`
    fn handles(&self, kind: ArtifactKind) -> bool;

    /// Render `content` into the context's mount point
    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome;

    /// Release everything the last mount acquired; idempotent
    fn unmount(&self);
}

/// Escape text for HTML element content and attribute values
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }
}
