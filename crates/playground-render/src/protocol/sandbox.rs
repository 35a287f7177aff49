//! Sandbox console protocol
//!
//! The interceptor injected into every sandboxed document posts
//! `{"type":"iframe-log","v":1,"frame":<token>,"level":..,"message":..}` to the
//! host. The frame token ties a message to the frame instance that sent it.

use crate::console::ConsoleLevel;
use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SANDBOX_PROTOCOL_VERSION: u32 = 1;

const fn current_version() -> u32 {
    SANDBOX_PROTOCOL_VERSION
}

/// Messages a sandboxed frame may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SandboxMessage {
    /// Console line or uncaught error
    #[serde(rename = "iframe-log")]
    Log(SandboxLog),
}

/// Console payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxLog {
    #[serde(default = "current_version")]
    pub v: u32,
    /// Token of the sending frame
    #[serde(default)]
    pub frame: Option<String>,
    pub level: ConsoleLevel,
    pub message: String,
}

impl SandboxMessage {
    /// Decode and validate a message
    ///
    /// # Errors
    /// [`ProtocolError::Malformed`] for unknown shapes and
    /// [`ProtocolError::UnsupportedVersion`] for newer schemas.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let message: Self =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        let Self::Log(log) = &message;
        if log.v > SANDBOX_PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(log.v));
        }
        Ok(message)
    }

    /// Decode a message and check it came from the frame holding `token`
    ///
    /// # Errors
    /// As [`Self::decode`], plus [`ProtocolError::StaleFrame`] when the token
    /// does not match.
    pub fn decode_from(raw: &str, token: &str) -> Result<SandboxLog, ProtocolError> {
        let Self::Log(log) = Self::decode(raw)?;
        if log.frame.as_deref() != Some(token) {
            return Err(ProtocolError::StaleFrame);
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_log_message() {
        let raw = r#"{"type":"iframe-log","v":1,"frame":"t1","level":"warn","message":"careful"}"#;
        let log = SandboxMessage::decode_from(raw, "t1").unwrap();
        assert_eq!(log.level, ConsoleLevel::Warn);
        assert_eq!(log.message, "careful");
    }

    #[test]
    fn version_defaults_to_current() {
        let raw = r#"{"type":"iframe-log","frame":"t","level":"log","message":"m"}"#;
        let SandboxMessage::Log(log) = SandboxMessage::decode(raw).unwrap();
        assert_eq!(log.v, SANDBOX_PROTOCOL_VERSION);
    }

    #[test]
    fn rejects_foreign_and_future_messages() {
        assert!(matches!(
            SandboxMessage::decode(r#"{"type":"resize","height":10}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            SandboxMessage::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert_eq!(
            SandboxMessage::decode(
                r#"{"type":"iframe-log","v":9,"frame":"t","level":"log","message":"m"}"#
            ),
            Err(ProtocolError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn rejects_other_frames() {
        let raw = r#"{"type":"iframe-log","v":1,"frame":"old","level":"error","message":"x"}"#;
        assert_eq!(
            SandboxMessage::decode_from(raw, "new"),
            Err(ProtocolError::StaleFrame)
        );
    }
}
