//! Diagram renderer
//!
//! Renders diagram source to SVG through the lazily loaded diagram engine.
//! The last successful SVG is kept for export.

use super::{FormatRenderer, MountContext, RenderOutcome};
use crate::engine::DiagramLook;
use crate::library::{LibraryId, LibraryRegistry};
use crate::surface::{MountPoint, ResizeGuard, Size};
use async_trait::async_trait;
use parking_lot::Mutex;
use playground_artifact::ArtifactKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// SVG wrapped to fill the container
fn fitted(svg: &str, size: Size) -> String {
    format!(
        "<div class=\"diagram-fit\" style=\"width:{}px;height:{}px;overflow:auto\">{svg}</div>",
        size.width, size.height
    )
}

#[derive(Default)]
struct DiagramState {
    svg: Option<String>,
    resize: Option<ResizeGuard>,
}

/// Renders diagram grammar artifacts
pub struct DiagramRenderer {
    registry: LibraryRegistry,
    look: Mutex<DiagramLook>,
    state: Arc<Mutex<DiagramState>>,
    renders: AtomicU64,
}

impl DiagramRenderer {
    /// Create renderer drawing with `look`
    #[must_use]
    pub fn new(registry: LibraryRegistry, look: DiagramLook) -> Self {
        Self {
            registry,
            look: Mutex::new(look),
            state: Arc::new(Mutex::new(DiagramState::default())),
            renders: AtomicU64::new(0),
        }
    }

    /// Current look
    #[inline]
    #[must_use]
    pub fn look(&self) -> DiagramLook {
        *self.look.lock()
    }

    /// Change the look used by subsequent renders
    pub fn set_look(&self, look: DiagramLook) {
        *self.look.lock() = look;
    }

    /// SVG of the last successful render
    #[must_use]
    pub fn rendered_svg(&self) -> Option<String> {
        self.state.lock().svg.clone()
    }

    fn next_render_id(&self) -> String {
        format!("diagram-{}", self.renders.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn attach_resize(&self, mount: &Arc<dyn MountPoint>) -> ResizeGuard {
        let state = Arc::downgrade(&self.state);
        let target = Arc::clone(mount);
        ResizeGuard::observe(
            mount.as_ref(),
            Arc::new(move |size| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let svg = state.lock().svg.clone();
                if let Some(svg) = svg {
                    target.set_markup(&fitted(&svg, size));
                }
            }),
        )
    }
}

#[async_trait]
impl FormatRenderer for DiagramRenderer {
    fn name(&self) -> &'static str {
        "diagram"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        kind == ArtifactKind::Mermaid
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        self.unmount();

        if !self.registry.is_loaded(LibraryId::Diagram) {
            ctx.mount.show_loading("Loading diagram engine...");
        }
        let engine = self.registry.diagram().await;
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => return ctx.fail(format!("Failed to load diagram engine: {e}")),
        };

        let render_id = self.next_render_id();
        match engine.render(&render_id, content, self.look()) {
            Ok(svg) => {
                ctx.mount.set_markup(&fitted(&svg, ctx.mount.size()));
                let guard = self.attach_resize(&ctx.mount);
                let mut state = self.state.lock();
                state.svg = Some(svg);
                state.resize = Some(guard);
                tracing::debug!(%render_id, "diagram rendered");
                RenderOutcome::Rendered
            }
            Err(e) => ctx.fail(format!("Diagram syntax error: {e}")),
        }
    }

    fn unmount(&self) {
        let mut state = self.state.lock();
        state.resize = None;
        state.svg = None;
    }
}

impl std::fmt::Debug for DiagramRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramRenderer")
            .field("look", &self.look())
            .field("rendered", &self.state.lock().svg.is_some())
            .finish_non_exhaustive()
    }
}
