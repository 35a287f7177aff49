//! Hierarchy (mind-map) renderer
//!
//! Parses the payload into a tree, lays it out left to right and hands the
//! scene to the lazily loaded layout engine. Pan and zoom state survives
//! container resizes; a new artifact starts from the initial viewport.

pub mod layout;
pub mod model;
pub mod svg;

pub use layout::{layout_tree, LaidOutNode, TreeLayout, TreeScene, Viewport, ZoomBehavior};
pub use model::{parse_hierarchy, HierarchyNode, PLACEHOLDER_LABEL};
pub use svg::SvgTreeEngine;

use super::{FormatRenderer, MountContext, RenderOutcome};
use crate::config::HierarchyConfig;
use crate::engine::GraphLayoutEngine;
use crate::error::RenderError;
use crate::library::{LibraryId, LibraryRegistry};
use crate::surface::{MountPoint, ResizeGuard, Size};
use async_trait::async_trait;
use parking_lot::Mutex;
use playground_artifact::ArtifactKind;
use std::sync::Arc;

struct HierarchyView {
    tree: HierarchyNode,
    engine: Arc<dyn GraphLayoutEngine>,
    mount: Arc<dyn MountPoint>,
    viewport: Viewport,
    size: Size,
}

impl HierarchyView {
    fn scene(&self, config: &HierarchyConfig) -> TreeScene {
        TreeScene {
            layout: layout_tree(&self.tree, self.size.width, config.node_spacing),
            viewport: self.viewport,
            size: self.size,
            zoom: ZoomBehavior::from(config),
        }
    }

    fn draw(&self, config: &HierarchyConfig) -> Result<(), RenderError> {
        self.frame(config).draw()
    }

    fn frame(&self, config: &HierarchyConfig) -> Frame {
        Frame {
            engine: Arc::clone(&self.engine),
            mount: Arc::clone(&self.mount),
            scene: self.scene(config),
        }
    }
}

/// A scene detached from the view, drawn without holding the view lock
///
/// Engines call back into the host, and a host may answer with a resize
/// that needs the lock again.
struct Frame {
    engine: Arc<dyn GraphLayoutEngine>,
    mount: Arc<dyn MountPoint>,
    scene: TreeScene,
}

impl Frame {
    fn draw(&self) -> Result<(), RenderError> {
        self.engine.draw(self.mount.as_ref(), &self.scene)
    }
}

/// Renders mind-map artifacts
pub struct HierarchyRenderer {
    registry: LibraryRegistry,
    config: HierarchyConfig,
    view: Arc<Mutex<Option<HierarchyView>>>,
    resize: Mutex<Option<ResizeGuard>>,
}

impl HierarchyRenderer {
    /// Create renderer
    #[must_use]
    pub fn new(registry: LibraryRegistry, config: HierarchyConfig) -> Self {
        Self {
            registry,
            config,
            view: Arc::new(Mutex::new(None)),
            resize: Mutex::new(None),
        }
    }

    /// Pan by a screen-space delta and redraw
    ///
    /// # Errors
    /// [`RenderError::NotMounted`] without a tree, otherwise engine errors.
    pub fn pan(&self, dx: f64, dy: f64) -> Result<(), RenderError> {
        self.update(|viewport, _| viewport.pan(dx, dy))
    }

    /// Zoom around a screen point and redraw
    ///
    /// # Errors
    /// [`RenderError::NotMounted`] without a tree, otherwise engine errors.
    pub fn zoom_at(&self, factor: f64, fx: f64, fy: f64) -> Result<(), RenderError> {
        self.update(|viewport, config| viewport.zoom_at(factor, fx, fy, config))
    }

    /// Scene currently on screen
    #[must_use]
    pub fn scene(&self) -> Option<TreeScene> {
        self.view.lock().as_ref().map(|v| v.scene(&self.config))
    }

    /// Layout settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    fn update(&self, f: impl FnOnce(&mut Viewport, &HierarchyConfig)) -> Result<(), RenderError> {
        let frame = {
            let mut view = self.view.lock();
            let view = view.as_mut().ok_or(RenderError::NotMounted)?;
            f(&mut view.viewport, &self.config);
            view.frame(&self.config)
        };
        frame.draw()
    }

    fn attach_resize(&self, mount: &dyn MountPoint) -> ResizeGuard {
        let view = Arc::downgrade(&self.view);
        let config = self.config;
        ResizeGuard::observe(
            mount,
            Arc::new(move |size| {
                let Some(view) = view.upgrade() else {
                    return;
                };
                let frame = view.lock().as_mut().map(|view| {
                    view.size = size;
                    view.frame(&config)
                });
                if let Some(Err(e)) = frame.map(|frame| frame.draw()) {
                    tracing::warn!(error = %e, "tree redraw after resize failed");
                }
            }),
        )
    }
}

#[async_trait]
impl FormatRenderer for HierarchyRenderer {
    fn name(&self) -> &'static str {
        "hierarchy"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        kind == ArtifactKind::Mindmap
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        self.unmount();

        let tree = match parse_hierarchy(content) {
            Ok(tree) => tree,
            Err(e) => {
                if !ctx.ticket.is_current() {
                    return RenderOutcome::Stale;
                }
                return ctx.fail(format!("Invalid data: {e}"));
            }
        };

        if !self.registry.is_loaded(LibraryId::GraphLayout) {
            ctx.mount.show_loading("Loading layout engine...");
        }
        let engine = self.registry.graph_layout().await;
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => return ctx.fail(format!("Failed to load layout engine: {e}")),
        };

        let size = ctx.mount.size();
        let view = HierarchyView {
            tree,
            engine,
            mount: Arc::clone(&ctx.mount),
            viewport: Viewport::initial(size, &self.config),
            size,
        };
        if let Err(e) = view.draw(&self.config) {
            return ctx.fail(format!("Mind map rendering failed: {e}"));
        }
        tracing::debug!(nodes = view.tree.len(), "mind map drawn");

        *self.view.lock() = Some(view);
        *self.resize.lock() = Some(self.attach_resize(ctx.mount.as_ref()));
        RenderOutcome::Rendered
    }

    fn unmount(&self) {
        self.resize.lock().take();
        self.view.lock().take();
    }
}

impl std::fmt::Debug for HierarchyRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyRenderer")
            .field("config", &self.config)
            .field("mounted", &self.view.lock().is_some())
            .finish_non_exhaustive()
    }
}
