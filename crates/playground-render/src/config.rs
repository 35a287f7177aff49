//! Renderer configuration
//!
//! Each renderer takes its own section; `playground-core` aggregates them
//! into the top-level configuration file.

use crate::engine::DiagramLook;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permissions granted to sandboxed frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxPermission {
    AllowScripts,
    AllowSameOrigin,
    AllowForms,
    AllowPopups,
    AllowModals,
}

impl SandboxPermission {
    /// Attribute token
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllowScripts => "allow-scripts",
            Self::AllowSameOrigin => "allow-same-origin",
            Self::AllowForms => "allow-forms",
            Self::AllowPopups => "allow-popups",
            Self::AllowModals => "allow-modals",
        }
    }
}

/// Set of sandbox permissions
///
/// Top navigation and downloads are not representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SandboxPolicy(Vec<SandboxPermission>);

impl SandboxPolicy {
    /// Policy from explicit permissions
    #[must_use]
    pub fn new(permissions: impl IntoIterator<Item = SandboxPermission>) -> Self {
        let mut list: Vec<SandboxPermission> = Vec::new();
        for permission in permissions {
            if !list.contains(&permission) {
                list.push(permission);
            }
        }
        Self(list)
    }

    /// `sandbox` attribute value
    #[must_use]
    pub fn attribute(&self) -> String {
        self.0
            .iter()
            .map(SandboxPermission::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether a permission is granted
    #[inline]
    #[must_use]
    pub fn allows(&self, permission: SandboxPermission) -> bool {
        self.0.contains(&permission)
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::new([
            SandboxPermission::AllowScripts,
            SandboxPermission::AllowSameOrigin,
            SandboxPermission::AllowForms,
            SandboxPermission::AllowPopups,
            SandboxPermission::AllowModals,
        ])
    }
}

/// Script injected when a document references one of its markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTag {
    pub name: String,
    pub src: String,
    /// Case-sensitive substrings that opt a document in
    pub markers: Vec<String>,
}

/// HTML sandbox settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub policy: SandboxPolicy,
    /// Inject the full-viewport reset stylesheet
    pub reset_styles: bool,
    /// Bare module specifiers resolved through the injected import map
    pub import_map: BTreeMap<String, String>,
    pub libraries: Vec<LibraryTag>,
    /// Rewrite bare inline `<script>` tags to modules
    pub module_scripts: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let import_map = [
            ("react", "https://esm.sh/react@18.3.1"),
            ("react-dom", "https://esm.sh/react-dom@18.3.1"),
            ("react-dom/client", "https://esm.sh/react-dom@18.3.1/client"),
            ("three", "https://esm.sh/three@0.160.0"),
            ("three/addons/", "https://esm.sh/three@0.160.0/examples/jsm/"),
            ("d3", "https://esm.sh/d3@7"),
            ("vue", "https://esm.sh/vue@3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        Self {
            policy: SandboxPolicy::default(),
            reset_styles: true,
            import_map,
            libraries: vec![
                LibraryTag {
                    name: "tailwindcss".to_owned(),
                    src: "https://cdn.tailwindcss.com".to_owned(),
                    markers: vec!["tailwind".to_owned()],
                },
                LibraryTag {
                    name: "chart.js".to_owned(),
                    src: "https://cdn.jsdelivr.net/npm/chart.js".to_owned(),
                    markers: vec!["new Chart(".to_owned()],
                },
            ],
            module_scripts: true,
        }
    }
}

/// Draw.io editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawioConfig {
    pub editor_url: String,
}

impl Default for DrawioConfig {
    fn default() -> Self {
        Self {
            editor_url: "https://embed.diagrams.net/?embed=1&proto=json&spin=1&ui=min&libraries=1"
                .to_owned(),
        }
    }
}

/// Mind-map layout settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Vertical distance between sibling leaves
    pub node_spacing: f64,
    /// Left margin of the root in the initial viewport
    pub left_margin: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            left_margin: 80.0,
            min_scale: 0.1,
            max_scale: 4.0,
        }
    }
}

/// Rasterized export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub pixel_ratio: f64,
    pub background: String,
    /// File name stem for downloads
    pub file_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            background: "#ffffff".to_owned(),
            file_stem: "artifact".to_owned(),
        }
    }
}

/// Diagram settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub look: DiagramLook,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_attribute() {
        assert_eq!(
            SandboxPolicy::default().attribute(),
            "allow-scripts allow-same-origin allow-forms allow-popups allow-modals"
        );
    }

    #[test]
    fn policy_deduplicates() {
        let policy = SandboxPolicy::new([
            SandboxPermission::AllowScripts,
            SandboxPermission::AllowScripts,
        ]);
        assert_eq!(policy.attribute(), "allow-scripts");
        assert!(!policy.allows(SandboxPermission::AllowSameOrigin));
    }

    #[test]
    fn policy_deserializes_from_tokens() {
        let policy: SandboxPolicy =
            serde_json::from_str(r#"["allow-scripts","allow-forms"]"#).unwrap();
        assert_eq!(policy.attribute(), "allow-scripts allow-forms");
    }

    #[test]
    fn partial_sections_use_defaults() {
        let config: HierarchyConfig = serde_json::from_str(r#"{"node_spacing": 30.0}"#).unwrap();
        assert!((config.node_spacing - 30.0).abs() < f64::EPSILON);
        assert!((config.max_scale - 4.0).abs() < f64::EPSILON);
    }
}
