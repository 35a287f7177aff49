//! Host surfaces
//!
//! Renderers never touch a browser directly. The host page provides a
//! [`MountPoint`] (a sized container element), resize observation and a
//! [`FrameHost`] that owns nested browsing contexts. Native callers and tests
//! supply their own implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Container dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create size
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Callback invoked with the new container size
pub type ResizeCallback = Arc<dyn Fn(Size) + Send + Sync>;

/// Container a renderer draws into
pub trait MountPoint: Send + Sync {
    /// Current container size
    fn size(&self) -> Size;

    /// Replace the container's markup
    fn set_markup(&self, markup: &str);

    /// Show a loading indicator
    fn show_loading(&self, label: &str);

    /// Show an inline error in place of the rendering
    fn show_error(&self, message: &str);

    /// Start observing container resizes
    fn observe_resize(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver>;
}

/// Live resize subscription
pub trait ResizeObserver: Send {
    /// Stop delivering callbacks; idempotent
    fn disconnect(&mut self);
}

/// Disconnects its observer when dropped
pub struct ResizeGuard {
    observer: Option<Box<dyn ResizeObserver>>,
}

impl ResizeGuard {
    /// Observe `mount` until the guard is dropped
    #[must_use]
    pub fn observe(mount: &dyn MountPoint, callback: ResizeCallback) -> Self {
        Self {
            observer: Some(mount.observe_resize(callback)),
        }
    }

    /// Disconnect now
    pub fn disconnect(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Drop for ResizeGuard {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for ResizeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeGuard")
            .field("connected", &self.observer.is_some())
            .finish()
    }
}

/// Handle to a nested browsing context created by a [`FrameHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// What a frame loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// Inline document (`srcdoc`)
    Document(String),
    /// Remote page (`src`)
    Url(String),
}

/// Description of a frame to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSpec {
    pub source: FrameSource,
    /// `sandbox` attribute value, `None` for an unsandboxed frame
    pub sandbox: Option<String>,
}

/// Owner of nested browsing contexts
pub trait FrameHost: Send + Sync {
    /// Create a frame inside `mount`
    fn create_frame(&self, mount: &dyn MountPoint, spec: FrameSpec) -> FrameId;

    /// Remove a frame and everything running in it
    fn destroy_frame(&self, frame: FrameId);

    /// Post a serialized message to a frame
    fn post_message(&self, frame: FrameId, payload: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver(Arc<AtomicUsize>);

    impl ResizeObserver for CountingObserver {
        fn disconnect(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_disconnects_once() {
        let disconnects = Arc::new(AtomicUsize::new(0));
        let mut guard = ResizeGuard {
            observer: Some(Box::new(CountingObserver(Arc::clone(&disconnects)))),
        };
        guard.disconnect();
        drop(guard);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_size() {
        assert!(Size::default().is_empty());
        assert!(!Size::new(10.0, 5.0).is_empty());
    }
}
