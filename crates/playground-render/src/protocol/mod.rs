//! Cross-context message protocols
//!
//! Both directions carry JSON. Inbound messages are untrusted: anything that
//! fails to decode is rejected with a [`crate::ProtocolError`] and the caller
//! ignores it.

pub mod drawio;
pub mod sandbox;

pub use drawio::{DrawioCommand, DrawioEvent};
pub use sandbox::{SandboxLog, SandboxMessage, SANDBOX_PROTOCOL_VERSION};
