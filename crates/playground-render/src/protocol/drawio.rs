//! Draw.io embed protocol
//!
//! The embedded editor speaks JSON strings over `postMessage`. It announces
//! readiness with `init`, reports edits with `autosave` and `save`, and is
//! driven by `load` commands from the host.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Host to editor commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DrawioCommand {
    /// Replace the diagram
    Load {
        xml: String,
        /// `1` enables autosave events
        autosave: u8,
    },
}

impl DrawioCommand {
    /// Load command with autosave enabled
    #[must_use]
    pub fn load(xml: impl Into<String>) -> Self {
        Self::Load {
            xml: xml.into(),
            autosave: 1,
        }
    }

    /// Serialized command
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_value(self).map_or_else(|_| String::new(), |v| v.to_string())
    }
}

/// Editor to host events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum DrawioEvent {
    /// Editor is ready for a `load`
    Init,
    /// Diagram changed
    Autosave { xml: String },
    /// User pressed save
    Save { xml: String },
    /// User closed the editor
    Exit,
}

impl DrawioEvent {
    /// Decode an editor event
    ///
    /// # Errors
    /// Returns [`ProtocolError::Malformed`] for anything that is not a known
    /// event.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Updated diagram XML, if the event carries one
    #[must_use]
    pub fn xml(&self) -> Option<&str> {
        match self {
            Self::Autosave { xml } | Self::Save { xml } => Some(xml),
            Self::Init | Self::Exit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_command_shape() {
        let raw = DrawioCommand::load("<mxfile/>").to_json();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({"action": "load", "xml": "<mxfile/>", "autosave": 1}));
    }

    #[test]
    fn decodes_events() {
        assert_eq!(DrawioEvent::decode(r#"{"event":"init"}"#).unwrap(), DrawioEvent::Init);
        let event = DrawioEvent::decode(r#"{"event":"autosave","xml":"<a/>","modified":true}"#)
            .unwrap();
        assert_eq!(event.xml(), Some("<a/>"));
        assert_eq!(DrawioEvent::decode(r#"{"event":"exit","modified":false}"#).unwrap(), DrawioEvent::Exit);
    }

    #[test]
    fn rejects_unknown_events() {
        assert!(DrawioEvent::decode(r#"{"event":"configure"}"#).is_err());
        assert!(DrawioEvent::decode(r#"{"event":"save"}"#).is_err());
        assert!(DrawioEvent::decode("[]").is_err());
    }
}
