//! External diagram editor renderer
//!
//! Hosts the Draw.io embed page in a frame and keeps it in sync with the
//! artifact over the embed protocol. Edits made in the editor flow back as
//! updated XML.

use super::{FormatRenderer, MountContext, RenderOutcome};
use crate::config::DrawioConfig;
use crate::protocol::drawio::{DrawioCommand, DrawioEvent};
use crate::surface::{FrameHost, FrameId, FrameSource, FrameSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use playground_artifact::ArtifactKind;
use std::sync::Arc;

#[derive(Debug)]
struct EditorSession {
    frame: FrameId,
    xml: String,
    ready: bool,
}

/// What the host should do after an editor message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorUpdate {
    /// Nothing changed for the host
    None,
    /// Editor produced new XML
    Changed(String),
    /// User asked to close the editor
    Closed,
}

/// Renders Draw.io artifacts in the embedded editor
pub struct DrawioRenderer {
    frames: Arc<dyn FrameHost>,
    config: DrawioConfig,
    session: Mutex<Option<EditorSession>>,
}

impl DrawioRenderer {
    /// Create renderer
    #[must_use]
    pub fn new(frames: Arc<dyn FrameHost>, config: DrawioConfig) -> Self {
        Self {
            frames,
            config,
            session: Mutex::new(None),
        }
    }

    /// Handle a raw message from the editor frame
    ///
    /// Malformed messages and messages without a session are ignored.
    pub fn handle_message(&self, raw: &str) -> EditorUpdate {
        let event = match DrawioEvent::decode(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring editor message");
                return EditorUpdate::None;
            }
        };

        let mut session = self.session.lock();
        let Some(session) = session.as_mut() else {
            return EditorUpdate::None;
        };

        match event {
            DrawioEvent::Init => {
                session.ready = true;
                self.send_load(session);
                EditorUpdate::None
            }
            DrawioEvent::Autosave { xml } | DrawioEvent::Save { xml } => {
                if xml == session.xml {
                    return EditorUpdate::None;
                }
                session.xml.clone_from(&xml);
                EditorUpdate::Changed(xml)
            }
            DrawioEvent::Exit => EditorUpdate::Closed,
        }
    }

    /// Push the current XML to the editor again
    ///
    /// Returns `false` when the editor is not ready yet; it receives the XML
    /// on `init`.
    pub fn reload(&self) -> bool {
        let mut session = self.session.lock();
        match session.as_mut() {
            Some(session) if session.ready => {
                self.send_load(session);
                true
            }
            _ => false,
        }
    }

    /// XML last loaded or received
    #[must_use]
    pub fn current_xml(&self) -> Option<String> {
        self.session.lock().as_ref().map(|s| s.xml.clone())
    }

    /// Live editor frame
    #[must_use]
    pub fn frame(&self) -> Option<FrameId> {
        self.session.lock().as_ref().map(|s| s.frame)
    }

    fn send_load(&self, session: &EditorSession) {
        let command = DrawioCommand::load(session.xml.clone());
        self.frames.post_message(session.frame, &command.to_json());
        tracing::debug!(frame = %session.frame, bytes = session.xml.len(), "diagram loaded into editor");
    }
}

#[async_trait]
impl FormatRenderer for DrawioRenderer {
    fn name(&self) -> &'static str {
        "drawio"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        kind == ArtifactKind::Drawio
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }

        let mut session = self.session.lock();
        if let Some(session) = session.as_mut() {
            // Same editor, new diagram: no need to reload the page.
            session.xml = content.to_owned();
            if session.ready {
                self.send_load(session);
            }
            return RenderOutcome::Rendered;
        }

        let frame = self.frames.create_frame(
            ctx.mount.as_ref(),
            FrameSpec {
                source: FrameSource::Url(self.config.editor_url.clone()),
                sandbox: None,
            },
        );
        *session = Some(EditorSession {
            frame,
            xml: content.to_owned(),
            ready: false,
        });
        RenderOutcome::Rendered
    }

    fn unmount(&self) {
        if let Some(session) = self.session.lock().take() {
            self.frames.destroy_frame(session.frame);
        }
    }
}

impl std::fmt::Debug for DrawioRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawioRenderer")
            .field("session", &*self.session.lock())
            .finish_non_exhaustive()
    }
}
