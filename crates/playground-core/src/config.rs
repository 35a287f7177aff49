//! Playground configuration
//!
//! One TOML file with a section per concern. Every field has a default, so
//! an empty file is a valid configuration.
//!
//! ```toml
//! [console]
//! max_entries = 200
//!
//! [hierarchy]
//! node_spacing = 32.0
//!
//! [sandbox.import_map]
//! lodash = "https://esm.sh/lodash-es@4"
//! ```

use crate::error::ConfigError;
use playground_render::console::DEFAULT_MAX_ENTRIES;
use playground_render::{
    DiagramConfig, DiagramLook, DrawioConfig, ExportConfig, HierarchyConfig, SandboxConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Console panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Retained entries; the oldest are evicted first
    pub max_entries: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// HTML frame policy and head injection
    pub sandbox: SandboxConfig,
    pub drawio: DrawioConfig,
    pub console: ConsoleConfig,
    /// Mind-map layout and zoom extent
    pub hierarchy: HierarchyConfig,
    pub export: ExportConfig,
    pub diagram: DiagramConfig,
}

impl PlaygroundConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown shapes.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// With console retention
    #[inline]
    #[must_use]
    pub fn with_max_console_entries(mut self, max: usize) -> Self {
        self.console.max_entries = max;
        self
    }

    /// With default diagram look
    #[inline]
    #[must_use]
    pub fn with_diagram_look(mut self, look: DiagramLook) -> Self {
        self.diagram.look = look;
        self
    }

    /// With Draw.io editor URL
    #[inline]
    #[must_use]
    pub fn with_editor_url(mut self, url: impl Into<String>) -> Self {
        self.drawio.editor_url = url.into();
        self
    }

    /// With sandbox settings
    #[inline]
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: SandboxConfig) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// With export settings
    #[inline]
    #[must_use]
    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }
}
