//! Chart renderer
//!
//! Chart instances hold engine resources bound to a container, so each one
//! lives in a [`ChartLease`] that disposes it on drop. A mount point has at
//! most one live instance: the previous lease is dropped before a new
//! instance is created.

use super::{FormatRenderer, MountContext, RenderOutcome};
use crate::config::ExportConfig;
use crate::engine::ChartInstance;
use crate::error::RenderError;
use crate::library::{LibraryId, LibraryRegistry};
use crate::surface::{ResizeGuard, Size};
use async_trait::async_trait;
use parking_lot::Mutex;
use playground_artifact::ArtifactKind;
use playground_extract::parse_loose_literal;
use serde_json::{json, Value};
use std::sync::Arc;

/// Option rendered in place of an unparseable configuration
#[must_use]
pub fn error_option(message: &str) -> Value {
    json!({
        "title": {
            "text": "Chart configuration error",
            "subtext": message,
            "left": "center",
            "top": "middle",
            "textStyle": { "color": "#d32f2f" },
            "subtextStyle": { "color": "#666666" }
        },
        "series": []
    })
}

/// Owned chart instance, disposed on drop
pub struct ChartLease {
    instance: Box<dyn ChartInstance>,
}

impl ChartLease {
    /// Take ownership of an instance
    #[must_use]
    pub fn new(instance: Box<dyn ChartInstance>) -> Self {
        Self { instance }
    }

    /// Apply an option
    ///
    /// # Errors
    /// Propagates engine rejection.
    pub fn set_option(&mut self, option: &Value) -> Result<(), RenderError> {
        self.instance.set_option(option)
    }

    /// Re-flow to `size`
    pub fn resize(&mut self, size: Size) {
        self.instance.resize(size);
    }

    /// Rasterize to a PNG data URL
    ///
    /// # Errors
    /// Propagates engine failure.
    pub fn export_png(&self, pixel_ratio: f64, background: &str) -> Result<String, RenderError> {
        self.instance.export_png(pixel_ratio, background)
    }
}

impl Drop for ChartLease {
    fn drop(&mut self) {
        self.instance.dispose();
    }
}

impl std::fmt::Debug for ChartLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartLease").finish_non_exhaustive()
    }
}

/// Live chart plus its resize subscription
///
/// Field order matters: the observer disconnects before the chart is
/// disposed.
struct MountedChart {
    resize: Option<ResizeGuard>,
    lease: Arc<Mutex<ChartLease>>,
    /// Whether the artifact's own option is on screen
    valid: bool,
}

/// Renders chart option artifacts
pub struct ChartRenderer {
    registry: LibraryRegistry,
    export: ExportConfig,
    mounted: Mutex<Option<MountedChart>>,
}

impl ChartRenderer {
    /// Create renderer
    #[must_use]
    pub fn new(registry: LibraryRegistry, export: ExportConfig) -> Self {
        Self {
            registry,
            export,
            mounted: Mutex::new(None),
        }
    }

    /// Rasterize the current chart to a PNG data URL
    ///
    /// # Errors
    /// [`RenderError::NotMounted`] without a successfully rendered chart,
    /// otherwise engine errors.
    pub fn export_png(&self) -> Result<String, RenderError> {
        let mounted = self.mounted.lock();
        let chart = mounted
            .as_ref()
            .filter(|c| c.valid)
            .ok_or(RenderError::NotMounted)?;
        let lease = chart.lease.lock();
        lease.export_png(self.export.pixel_ratio, &self.export.background)
    }

    /// Whether a chart instance is live
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.lock().is_some()
    }
}

#[async_trait]
impl FormatRenderer for ChartRenderer {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        kind == ArtifactKind::Echarts
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        self.unmount();

        if !self.registry.is_loaded(LibraryId::Chart) {
            ctx.mount.show_loading("Loading chart engine...");
        }
        let engine = self.registry.chart().await;
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => return ctx.fail(format!("Failed to load chart engine: {e}")),
        };

        // A concurrent pass may have mounted while this one awaited.
        self.unmount();
        let mut lease = match engine.init(ctx.mount.as_ref()) {
            Ok(instance) => ChartLease::new(instance),
            Err(e) => return ctx.fail(format!("Chart initialization failed: {e}")),
        };

        let (valid, outcome) = match parse_loose_literal(content) {
            Ok(option) => match lease.set_option(&option) {
                Ok(()) => (true, RenderOutcome::Rendered),
                Err(e) => {
                    let message = format!("Chart rendering failed: {e}");
                    show_error(&mut lease, &e.to_string());
                    (false, report(ctx, message))
                }
            },
            Err(e) => {
                let message = format!("Invalid chart configuration: {e}");
                show_error(&mut lease, &e.to_string());
                (false, report(ctx, message))
            }
        };

        let lease = Arc::new(Mutex::new(lease));
        let weak = Arc::downgrade(&lease);
        let resize = ResizeGuard::observe(
            ctx.mount.as_ref(),
            Arc::new(move |size| {
                if let Some(lease) = weak.upgrade() {
                    lease.lock().resize(size);
                }
            }),
        );

        *self.mounted.lock() = Some(MountedChart {
            resize: Some(resize),
            lease,
            valid,
        });
        outcome
    }

    fn unmount(&self) {
        if let Some(mut chart) = self.mounted.lock().take() {
            chart.resize = None;
            tracing::debug!("chart instance disposed");
        }
    }
}

/// Error shown inside the chart itself; the console still gets the message
fn show_error(lease: &mut ChartLease, message: &str) {
    if let Err(e) = lease.set_option(&error_option(message)) {
        tracing::warn!(error = %e, "chart error placeholder could not be drawn");
    }
}

fn report(ctx: &MountContext, message: String) -> RenderOutcome {
    tracing::warn!(error = %message, "chart option rejected");
    ctx.console
        .push(crate::console::ConsoleLevel::Error, message.clone());
    RenderOutcome::Failed(message)
}

impl std::fmt::Debug for ChartRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRenderer")
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_option_carries_message() {
        let option = error_option("expected value at line 1 column 7");
        assert_eq!(option["title"]["subtext"], "expected value at line 1 column 7");
        assert_eq!(option["series"], json!([]));
    }
}
