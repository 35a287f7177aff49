//! Host collaborators
//!
//! The surrounding application provides a clipboard and a toast sink. Both
//! are injected so the surface never reaches for globals.

use crate::error::ClipboardError;
use std::fmt;

/// Clipboard write access
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard text
    ///
    /// # Errors
    /// Returns [`ClipboardError`] when the host denies access.
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Action completed
    Success,
    /// Action failed
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// Sink for non-inline notifications
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show a transient notification
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Clipboard that refuses every write
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError("clipboard is not available".to_owned()))
    }
}

/// Notifier that forwards to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => tracing::info!(%message, "notice"),
            NoticeLevel::Error => tracing::error!(%message, "notice"),
        }
    }
}
