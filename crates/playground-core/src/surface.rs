//! Preview surface
//!
//! Owns the adopted artifact and its editable copy, the view state and the
//! console, and routes every artifact to exactly one renderer through a
//! fixed dispatch table.
//!
//! # Lifecycle
//!
//! ```text
//! adopt(artifact) ──► clear console ─► reset editable copy ─► render
//! edit_code(text) ──────────────────► update editable copy ─► render
//! render: advance generation ─► unmount previous renderer if it changes
//!         ─► mount matching renderer with the new ticket
//! ```
//!
//! A render whose ticket went stale while it awaited a library leaves both
//! the mount point and the recorded outcome untouched.

use crate::config::PlaygroundConfig;
use crate::error::{ClipboardError, ExportError};
use crate::export::{decode_data_url, ExportPayload};
use crate::host::{Clipboard, NoticeLevel, Notifier};
use parking_lot::Mutex;
use playground_artifact::{Artifact, ArtifactKind, ExportFormat, ExportSource};
use playground_render::{
    ChartRenderer, ConsoleLogAggregator, DiagramLook, DiagramRenderer,
    DrawioRenderer, EditorUpdate, FormatRenderer, FrameHost, Generation, HierarchyRenderer,
    HtmlSandboxRenderer, LibraryRegistry, MountContext, MountPoint, RenderError, RenderOutcome,
    VectorDocRenderer,
};
use std::fmt;
use std::sync::Arc;

/// Services the host page provides to a surface
pub struct HostServices {
    /// Preview container
    pub mount: Arc<dyn MountPoint>,
    /// Creates sandbox and editor frames
    pub frames: Arc<dyn FrameHost>,
    /// Engine loaders, shared across surfaces
    pub libraries: LibraryRegistry,
    pub clipboard: Arc<dyn Clipboard>,
    /// Toast sink
    pub notifier: Arc<dyn Notifier>,
}

/// Selected view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    /// Rendered artifact
    #[default]
    Preview,
    /// Editable source
    Code,
}

/// What a frame message turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// Sandbox console line, now in the console
    Logged,
    /// Editor changed the diagram; the editable copy was updated
    DiagramEdited,
    /// Editor asked to close
    EditorClosed,
    /// Not for the active renderer, stale or malformed
    Ignored,
}

/// One renderer per artifact family
struct Renderers {
    html: HtmlSandboxRenderer,
    vector: VectorDocRenderer,
    diagram: DiagramRenderer,
    chart: ChartRenderer,
    hierarchy: HierarchyRenderer,
    drawio: DrawioRenderer,
}

impl Renderers {
    fn new(config: &PlaygroundConfig, frames: &Arc<dyn FrameHost>, libraries: &LibraryRegistry) -> Self {
        Self {
            html: HtmlSandboxRenderer::new(Arc::clone(frames), config.sandbox.clone()),
            vector: VectorDocRenderer::new(),
            diagram: DiagramRenderer::new(libraries.clone(), config.diagram.look),
            chart: ChartRenderer::new(libraries.clone(), config.export.clone()),
            hierarchy: HierarchyRenderer::new(libraries.clone(), config.hierarchy),
            drawio: DrawioRenderer::new(Arc::clone(frames), config.drawio.clone()),
        }
    }

    fn for_kind(&self, kind: ArtifactKind) -> &dyn FormatRenderer {
        match kind {
            ArtifactKind::Html => &self.html,
            ArtifactKind::Svg | ArtifactKind::Markdown | ArtifactKind::Json => &self.vector,
            ArtifactKind::Mermaid => &self.diagram,
            ArtifactKind::Echarts => &self.chart,
            ArtifactKind::Mindmap => &self.hierarchy,
            ArtifactKind::Drawio => &self.drawio,
        }
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    artifact: Option<Artifact>,
    code: String,
    tab: ViewTab,
    fullscreen: bool,
    console_open: bool,
    /// Kind whose renderer currently holds the mount point
    mounted: Option<ArtifactKind>,
    outcome: Option<RenderOutcome>,
}

/// Preview pane for one conversation
pub struct PreviewSurface {
    config: PlaygroundConfig,
    mount: Arc<dyn MountPoint>,
    console: ConsoleLogAggregator,
    generation: Generation,
    renderers: Renderers,
    state: Mutex<SurfaceState>,
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
}

impl PreviewSurface {
    /// Create an empty surface
    #[must_use]
    pub fn new(config: PlaygroundConfig, host: HostServices) -> Self {
        let renderers = Renderers::new(&config, &host.frames, &host.libraries);
        Self {
            console: ConsoleLogAggregator::new(config.console.max_entries),
            config,
            mount: host.mount,
            generation: Generation::new(),
            renderers,
            state: Mutex::new(SurfaceState::default()),
            clipboard: host.clipboard,
            notifier: host.notifier,
        }
    }

    /// Adopt the latest extraction result
    ///
    /// `None` and artifacts identical to the current one are ignored and
    /// return `None`. Anything else clears the console, resets the editable
    /// copy and renders.
    pub async fn adopt(&self, artifact: Option<Artifact>) -> Option<RenderOutcome> {
        let artifact = artifact?;
        {
            let mut state = self.state.lock();
            if state
                .artifact
                .as_ref()
                .is_some_and(|current| !current.differs_from(&artifact))
            {
                return None;
            }
            tracing::info!(
                kind = %artifact.kind(),
                hash = %artifact.hash().short(),
                "artifact adopted"
            );
            state.code = artifact.content().to_owned();
            state.artifact = Some(artifact);
        }
        self.console.clear();
        Some(self.render().await)
    }

    /// Replace the editable copy and re-render from it
    ///
    /// Returns `None` without an artifact or when the text is unchanged.
    pub async fn edit_code(&self, code: impl Into<String>) -> Option<RenderOutcome> {
        let code = code.into();
        {
            let mut state = self.state.lock();
            if state.artifact.is_none() || state.code == code {
                return None;
            }
            state.code = code;
        }
        Some(self.render().await)
    }

    /// Discard and recreate the rendering
    ///
    /// HTML gets a brand new sandbox frame; a ready Draw.io editor is sent
    /// the diagram again; everything else renders from scratch.
    pub async fn reload(&self) -> Option<RenderOutcome> {
        let mounted = self.state.lock().mounted?;
        match mounted {
            ArtifactKind::Html => {
                self.generation.advance();
                let reloaded = self.renderers.html.reload(self.mount.as_ref());
                Some(if reloaded {
                    RenderOutcome::Rendered
                } else {
                    self.render().await
                })
            }
            ArtifactKind::Drawio => {
                if self.renderers.drawio.reload() {
                    Some(RenderOutcome::Rendered)
                } else {
                    Some(self.render().await)
                }
            }
            _ => Some(self.render().await),
        }
    }

    /// Route a raw message from a frame
    ///
    /// Sandbox console lines go to the console; Draw.io edits update the
    /// editable copy without re-rendering. Everything else is ignored.
    pub fn handle_frame_message(&self, raw: &str) -> FrameEvent {
        let mounted = self.state.lock().mounted;
        match mounted {
            Some(ArtifactKind::Html) => match self.renderers.html.accept_message(raw) {
                Ok(log) => {
                    self.console.push(log.level, log.message);
                    FrameEvent::Logged
                }
                Err(e) => {
                    tracing::debug!(error = %e, "sandbox message ignored");
                    FrameEvent::Ignored
                }
            },
            Some(kind) if kind.is_live_editable() => match self.renderers.drawio.handle_message(raw) {
                EditorUpdate::Changed(xml) => {
                    self.state.lock().code = xml;
                    FrameEvent::DiagramEdited
                }
                EditorUpdate::Closed => FrameEvent::EditorClosed,
                EditorUpdate::None => FrameEvent::Ignored,
            },
            _ => FrameEvent::Ignored,
        }
    }

    /// Switch diagram look; re-renders a mounted diagram with the cached engine
    pub async fn set_diagram_look(&self, look: DiagramLook) -> Option<RenderOutcome> {
        if self.renderers.diagram.look() == look {
            return None;
        }
        self.renderers.diagram.set_look(look);
        let mounted = self.state.lock().mounted;
        if mounted == Some(ArtifactKind::Mermaid) {
            Some(self.render().await)
        } else {
            None
        }
    }

    /// Pan the mind map
    ///
    /// # Errors
    /// [`RenderError::NotMounted`] unless a mind map is on screen.
    pub fn pan(&self, dx: f64, dy: f64) -> Result<(), RenderError> {
        self.require_mounted(ArtifactKind::Mindmap)?;
        self.renderers.hierarchy.pan(dx, dy)
    }

    /// Zoom the mind map around a screen point
    ///
    /// # Errors
    /// [`RenderError::NotMounted`] unless a mind map is on screen.
    pub fn zoom(&self, factor: f64, fx: f64, fy: f64) -> Result<(), RenderError> {
        self.require_mounted(ArtifactKind::Mindmap)?;
        self.renderers.hierarchy.zoom_at(factor, fx, fy)
    }

    /// Build the download for the current artifact
    ///
    /// Failures are also sent to the notifier.
    ///
    /// # Errors
    /// See [`ExportError`].
    pub fn export(&self) -> Result<ExportPayload, ExportError> {
        let result = self.build_export();
        match &result {
            Ok(payload) => {
                tracing::info!(file = %payload.file_name, bytes = payload.bytes.len(), "export ready");
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.notifier.notify(NoticeLevel::Error, &format!("Export failed: {e}"));
            }
        }
        result
    }

    /// Copy the editable copy to the clipboard
    ///
    /// # Errors
    /// Returns the host's [`ClipboardError`]; the notifier is told either way.
    pub fn copy_to_clipboard(&self) -> Result<(), ClipboardError> {
        let code = self.state.lock().code.clone();
        match self.clipboard.write_text(&code) {
            Ok(()) => {
                self.notifier.notify(NoticeLevel::Success, "Copied to clipboard");
                Ok(())
            }
            Err(e) => {
                self.notifier.notify(NoticeLevel::Error, &format!("Copy failed: {e}"));
                Err(e)
            }
        }
    }

    /// Select a view tab
    pub fn set_tab(&self, tab: ViewTab) {
        self.state.lock().tab = tab;
    }

    /// Selected view tab
    #[must_use]
    pub fn tab(&self) -> ViewTab {
        self.state.lock().tab
    }

    /// Toggle fullscreen; returns the new state
    pub fn toggle_fullscreen(&self) -> bool {
        let mut state = self.state.lock();
        state.fullscreen = !state.fullscreen;
        state.fullscreen
    }

    /// Whether the surface is fullscreen
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.state.lock().fullscreen
    }

    /// Toggle the console panel; returns the new state
    pub fn toggle_console(&self) -> bool {
        let mut state = self.state.lock();
        state.console_open = !state.console_open;
        state.console_open
    }

    /// Whether the console panel is open
    #[must_use]
    pub fn is_console_open(&self) -> bool {
        self.state.lock().console_open
    }

    /// Token the live sandbox frame stamps on its messages
    #[must_use]
    pub fn sandbox_token(&self) -> Option<String> {
        self.renderers.html.frame_token()
    }

    /// Console log
    #[inline]
    #[must_use]
    pub fn console(&self) -> &ConsoleLogAggregator {
        &self.console
    }

    /// Clear the console on user request
    pub fn clear_console(&self) {
        self.console.clear();
    }

    /// Adopted artifact
    #[must_use]
    pub fn artifact(&self) -> Option<Artifact> {
        self.state.lock().artifact.clone()
    }

    /// Editable copy
    #[must_use]
    pub fn code(&self) -> String {
        self.state.lock().code.clone()
    }

    /// Whether the editable copy diverged from the artifact
    #[must_use]
    pub fn is_modified(&self) -> bool {
        let state = self.state.lock();
        state
            .artifact
            .as_ref()
            .is_some_and(|a| a.content() != state.code)
    }

    /// Outcome of the latest current render
    #[must_use]
    pub fn last_outcome(&self) -> Option<RenderOutcome> {
        self.state.lock().outcome.clone()
    }

    /// Kind whose renderer holds the mount point
    #[must_use]
    pub fn mounted_kind(&self) -> Option<ArtifactKind> {
        self.state.lock().mounted
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// Unmount whatever is on screen and forget the artifact
    pub fn clear(&self) {
        self.generation.advance();
        let mounted = {
            let mut state = self.state.lock();
            let fresh = SurfaceState {
                tab: state.tab,
                fullscreen: state.fullscreen,
                console_open: state.console_open,
                ..SurfaceState::default()
            };
            std::mem::replace(&mut *state, fresh).mounted
        };
        if let Some(kind) = mounted {
            self.renderers.for_kind(kind).unmount();
        }
        self.console.clear();
    }

    async fn render(&self) -> RenderOutcome {
        let ticket = self.generation.advance();
        let (kind, code, previous) = {
            let mut state = self.state.lock();
            let Some(kind) = state.artifact.as_ref().map(Artifact::kind) else {
                return RenderOutcome::Stale;
            };
            let previous = state.mounted.replace(kind);
            (kind, state.code.clone(), previous)
        };

        let renderer = self.renderers.for_kind(kind);
        if let Some(previous) = previous {
            let old = self.renderers.for_kind(previous);
            if old.name() != renderer.name() {
                old.unmount();
            }
        }

        let ctx = MountContext {
            mount: Arc::clone(&self.mount),
            kind,
            ticket: ticket.clone(),
            console: self.console.clone(),
        };
        let outcome = renderer.mount(&ctx, &code).await;

        if ticket.is_current() {
            self.state.lock().outcome = Some(outcome.clone());
        }
        tracing::debug!(%kind, renderer = renderer.name(), ?outcome, "render pass");
        outcome
    }

    fn build_export(&self) -> Result<ExportPayload, ExportError> {
        let (kind, code) = {
            let state = self.state.lock();
            let artifact = state.artifact.as_ref().ok_or(ExportError::NoArtifact)?;
            (artifact.kind(), state.code.clone())
        };
        let stem = &self.config.export.file_stem;

        let bytes = match ExportFormat::for_kind(kind).source {
            ExportSource::Source => code.into_bytes(),
            ExportSource::RenderedSvg => self
                .renderers
                .diagram
                .rendered_svg()
                .ok_or(ExportError::NotRendered(kind))?
                .into_bytes(),
            ExportSource::RenderedPng => {
                let url = self.renderers.chart.export_png().map_err(|e| match e {
                    RenderError::NotMounted => ExportError::NotRendered(kind),
                    other => ExportError::Failed {
                        kind,
                        reason: other.to_string(),
                    },
                })?;
                decode_data_url(&url)?
            }
        };
        Ok(ExportPayload::new(kind, stem, bytes))
    }

    fn require_mounted(&self, kind: ArtifactKind) -> Result<(), RenderError> {
        if self.state.lock().mounted == Some(kind) {
            Ok(())
        } else {
            Err(RenderError::NotMounted)
        }
    }
}

impl fmt::Debug for PreviewSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewSurface")
            .field("state", &*self.state.lock())
            .field("generation", &self.generation.value())
            .finish_non_exhaustive()
    }
}

impl Drop for PreviewSurface {
    fn drop(&mut self) {
        let mounted = self.state.get_mut().mounted.take();
        if let Some(kind) = mounted {
            self.renderers.for_kind(kind).unmount();
        }
    }
}
