//! Rendering engine seams
//!
//! The heavy rendering libraries (diagram grammar, chart runtime, tree
//! layout) are fetched lazily by the host. These traits are the only surface
//! the renderers use, so any engine (a browser binding, a native port, a
//! test double) plugs in through a [`crate::LibraryLoader`].

use crate::error::RenderError;
use crate::renderers::hierarchy::TreeScene;
use crate::surface::{MountPoint, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Visual style for diagram rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramLook {
    /// Crisp, geometric
    #[default]
    Classic,
    /// Sketch-style, hand drawn
    HandDrawn,
}

impl DiagramLook {
    /// Engine configuration value
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::HandDrawn => "handDrawn",
        }
    }

    /// The other look
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Classic => Self::HandDrawn,
            Self::HandDrawn => Self::Classic,
        }
    }
}

impl fmt::Display for DiagramLook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram grammar engine
pub trait DiagramEngine: Send + Sync {
    /// Render `source` into SVG markup
    ///
    /// `render_id` is unique per render call so concurrent renders never
    /// collide on element ids.
    ///
    /// # Errors
    /// Returns [`RenderError::Engine`] for grammar errors.
    fn render(&self, render_id: &str, source: &str, look: DiagramLook)
        -> Result<String, RenderError>;
}

/// Chart runtime
pub trait ChartEngine: Send + Sync {
    /// Create a chart instance bound to `mount`
    ///
    /// # Errors
    /// Returns [`RenderError::Engine`] if the runtime cannot initialize.
    fn init(&self, mount: &dyn MountPoint) -> Result<Box<dyn ChartInstance>, RenderError>;
}

/// Live chart bound to one container
pub trait ChartInstance: Send {
    /// Apply an option object
    ///
    /// # Errors
    /// Returns [`RenderError::Engine`] when the runtime rejects the option.
    fn set_option(&mut self, option: &Value) -> Result<(), RenderError>;

    /// Re-flow to a new container size
    fn resize(&mut self, size: Size);

    /// Export the current rendering as a `data:image/png;base64,...` URL
    ///
    /// # Errors
    /// Returns [`RenderError::Engine`] if the runtime cannot rasterize.
    fn export_png(&self, pixel_ratio: f64, background: &str) -> Result<String, RenderError>;

    /// Release the instance; further calls are not expected
    fn dispose(&mut self);
}

/// Tree layout and drawing engine
pub trait GraphLayoutEngine: Send + Sync {
    /// Draw a laid-out tree into `mount`
    ///
    /// # Errors
    /// Returns [`RenderError::Engine`] if drawing fails.
    fn draw(&self, mount: &dyn MountPoint, scene: &TreeScene) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_config_values() {
        assert_eq!(DiagramLook::Classic.as_str(), "classic");
        assert_eq!(DiagramLook::HandDrawn.to_string(), "handDrawn");
        assert_eq!(DiagramLook::Classic.toggled(), DiagramLook::HandDrawn);
    }

    #[test]
    fn look_serde() {
        let look: DiagramLook = serde_json::from_str("\"handdrawn\"").unwrap();
        assert_eq!(look, DiagramLook::HandDrawn);
    }
}
