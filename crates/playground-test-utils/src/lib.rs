//! Testing utilities for the playground workspace
//!
//! In-memory stand-ins for the host page (mount points, frames, resize
//! observation) and for the rendering engines, with counters for lifecycle
//! assertions.

#![allow(missing_docs)]

use async_trait::async_trait;
use base64::Engine as _;
use parking_lot::Mutex;
use playground_artifact::{Artifact, ArtifactKind};
use playground_render::{
    ChartEngine, ChartInstance, ConsoleLogAggregator, DiagramEngine, DiagramLook, FrameHost,
    FrameId, FrameSpec, Generation, GraphLayoutEngine, LibraryError, LibraryHandle, LibraryId,
    LibraryLoader, LibraryRegistry, MountContext, MountPoint, RenderError, ResizeCallback,
    ResizeObserver, Size, TreeScene,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Bytes behind every fake PNG export
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

pub fn artifact(kind: ArtifactKind, content: &str) -> Artifact {
    Artifact::new(kind, content).unwrap()
}

// ---------------------------------------------------------------------------
// Mount point
// ---------------------------------------------------------------------------

struct ObserverSlot {
    callback: ResizeCallback,
    connected: Arc<AtomicBool>,
}

#[derive(Default)]
struct MountLog {
    markup: Vec<String>,
    loading: Vec<String>,
    errors: Vec<String>,
    observers: Vec<ObserverSlot>,
}

/// Records everything drawn into it
pub struct FakeMount {
    size: Mutex<Size>,
    log: Mutex<MountLog>,
    observed: AtomicUsize,
    disconnected: Arc<AtomicUsize>,
}

impl FakeMount {
    pub fn new(size: Size) -> Arc<Self> {
        Arc::new(Self {
            size: Mutex::new(size),
            log: Mutex::new(MountLog::default()),
            observed: AtomicUsize::new(0),
            disconnected: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn markup(&self) -> Option<String> {
        self.log.lock().markup.last().cloned()
    }

    pub fn markup_history(&self) -> Vec<String> {
        self.log.lock().markup.clone()
    }

    pub fn loading(&self) -> Vec<String> {
        self.log.lock().loading.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.log.lock().errors.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.log.lock().errors.last().cloned()
    }

    pub fn observers_created(&self) -> usize {
        self.observed.load(Ordering::SeqCst)
    }

    pub fn observers_disconnected(&self) -> usize {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub fn live_observers(&self) -> usize {
        self.log
            .lock()
            .observers
            .iter()
            .filter(|o| o.connected.load(Ordering::SeqCst))
            .count()
    }

    /// Change size and notify connected observers
    pub fn resize(&self, size: Size) {
        *self.size.lock() = size;
        let callbacks: Vec<ResizeCallback> = self
            .log
            .lock()
            .observers
            .iter()
            .filter(|o| o.connected.load(Ordering::SeqCst))
            .map(|o| Arc::clone(&o.callback))
            .collect();
        for callback in callbacks {
            callback(size);
        }
    }
}

impl MountPoint for FakeMount {
    fn size(&self) -> Size {
        *self.size.lock()
    }

    fn set_markup(&self, markup: &str) {
        self.log.lock().markup.push(markup.to_owned());
    }

    fn show_loading(&self, label: &str) {
        self.log.lock().loading.push(label.to_owned());
    }

    fn show_error(&self, message: &str) {
        self.log.lock().errors.push(message.to_owned());
    }

    fn observe_resize(&self, callback: ResizeCallback) -> Box<dyn ResizeObserver> {
        self.observed.fetch_add(1, Ordering::SeqCst);
        let connected = Arc::new(AtomicBool::new(true));
        self.log.lock().observers.push(ObserverSlot {
            callback,
            connected: Arc::clone(&connected),
        });
        Box::new(FakeObserver {
            connected,
            disconnected: Arc::clone(&self.disconnected),
        })
    }
}

struct FakeObserver {
    connected: Arc<AtomicBool>,
    disconnected: Arc<AtomicUsize>,
}

impl ResizeObserver for FakeObserver {
    fn disconnect(&mut self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.disconnected.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FrameLog {
    next: u64,
    created: Vec<(FrameId, FrameSpec)>,
    live: Vec<FrameId>,
    posted: Vec<(FrameId, String)>,
}

/// Records frame lifecycle and posted messages
#[derive(Default)]
pub struct FakeFrameHost {
    log: Mutex<FrameLog>,
}

impl FakeFrameHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> Vec<(FrameId, FrameSpec)> {
        self.log.lock().created.clone()
    }

    pub fn last_spec(&self) -> Option<FrameSpec> {
        self.log.lock().created.last().map(|(_, spec)| spec.clone())
    }

    pub fn live_frames(&self) -> Vec<FrameId> {
        self.log.lock().live.clone()
    }

    pub fn posted(&self) -> Vec<(FrameId, String)> {
        self.log.lock().posted.clone()
    }

    pub fn posted_json(&self) -> Vec<Value> {
        self.log
            .lock()
            .posted
            .iter()
            .filter_map(|(_, raw)| serde_json::from_str(raw).ok())
            .collect()
    }
}

impl FrameHost for FakeFrameHost {
    fn create_frame(&self, _mount: &dyn MountPoint, spec: FrameSpec) -> FrameId {
        let mut log = self.log.lock();
        log.next += 1;
        let id = FrameId(log.next);
        log.created.push((id, spec));
        log.live.push(id);
        id
    }

    fn destroy_frame(&self, frame: FrameId) {
        self.log.lock().live.retain(|f| *f != frame);
    }

    fn post_message(&self, frame: FrameId, payload: &str) {
        self.log.lock().posted.push((frame, payload.to_owned()));
    }
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// Echoes source into an SVG; sources starting with `invalid` fail
#[derive(Default)]
pub struct FakeDiagramEngine {
    renders: Mutex<Vec<(String, DiagramLook)>>,
}

impl FakeDiagramEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn renders(&self) -> Vec<(String, DiagramLook)> {
        self.renders.lock().clone()
    }
}

impl DiagramEngine for FakeDiagramEngine {
    fn render(&self, render_id: &str, source: &str, look: DiagramLook) -> Result<String, RenderError> {
        self.renders.lock().push((render_id.to_owned(), look));
        if source.trim_start().starts_with("invalid") {
            return Err(RenderError::Engine("Parse error on line 1".to_owned()));
        }
        Ok(format!(
            "<svg id=\"{render_id}\" data-look=\"{look}\"><text>{}</text></svg>",
            source.len()
        ))
    }
}

#[derive(Default)]
pub struct ChartCounters {
    pub created: AtomicUsize,
    pub disposed: AtomicUsize,
    pub resized: AtomicUsize,
    pub options: Mutex<Vec<Value>>,
    /// Reject every option, the error placeholder included
    pub rejecting: AtomicBool,
}

impl ChartCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.created() - self.disposed()
    }

    pub fn last_option(&self) -> Option<Value> {
        self.options.lock().last().cloned()
    }
}

/// Chart runtime that records instances
#[derive(Default)]
pub struct FakeChartEngine {
    pub counters: Arc<ChartCounters>,
}

impl FakeChartEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ChartEngine for FakeChartEngine {
    fn init(&self, _mount: &dyn MountPoint) -> Result<Box<dyn ChartInstance>, RenderError> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeChart {
            counters: Arc::clone(&self.counters),
            disposed: false,
        }))
    }
}

struct FakeChart {
    counters: Arc<ChartCounters>,
    disposed: bool,
}

impl ChartInstance for FakeChart {
    fn set_option(&mut self, option: &Value) -> Result<(), RenderError> {
        self.counters.options.lock().push(option.clone());
        if self.counters.rejecting.load(Ordering::SeqCst) {
            return Err(RenderError::Engine("renderer lost its context".to_owned()));
        }
        if option.get("series").is_some_and(|s| !s.is_array()) {
            return Err(RenderError::Engine("series must be an array".to_owned()));
        }
        Ok(())
    }

    fn resize(&mut self, _size: Size) {
        self.counters.resized.fetch_add(1, Ordering::SeqCst);
    }

    fn export_png(&self, _pixel_ratio: f64, _background: &str) -> Result<String, RenderError> {
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(FAKE_PNG)
        ))
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.counters.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Layout engine that records every scene it draws
#[derive(Default)]
pub struct RecordingLayoutEngine {
    scenes: Mutex<Vec<TreeScene>>,
}

impl RecordingLayoutEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scenes(&self) -> Vec<TreeScene> {
        self.scenes.lock().clone()
    }

    pub fn last_scene(&self) -> Option<TreeScene> {
        self.scenes.lock().last().cloned()
    }
}

impl GraphLayoutEngine for RecordingLayoutEngine {
    fn draw(&self, mount: &dyn MountPoint, scene: &TreeScene) -> Result<(), RenderError> {
        self.scenes.lock().push(scene.clone());
        mount.set_markup(&format!("<svg data-nodes=\"{}\"></svg>", scene.layout.nodes.len()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Loader returning a fixed handle, optionally gated and failing
pub struct FakeLoader {
    handle: LibraryHandle,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeLoader {
    pub fn new(handle: LibraryHandle) -> Arc<Self> {
        Arc::new(Self {
            handle,
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            gate: None,
        })
    }

    /// Loads wait for `gate` to be notified
    pub fn gated(handle: LibraryHandle, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            handle,
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            gate: Some(gate),
        })
    }

    /// First `failures` loads fail
    pub fn failing(handle: LibraryHandle, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            handle,
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(failures),
            gate: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LibraryLoader for FakeLoader {
    async fn load(&self, id: LibraryId) -> Result<LibraryHandle, LibraryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(LibraryError::load_failed(id, "network error"));
        }
        Ok(self.handle.clone())
    }
}

/// Fake engines plus a registry wired to them
pub struct FakeLibraries {
    pub registry: LibraryRegistry,
    pub diagram: Arc<FakeDiagramEngine>,
    pub chart: Arc<FakeChartEngine>,
    pub layout: Arc<RecordingLayoutEngine>,
    pub diagram_loader: Arc<FakeLoader>,
    pub chart_loader: Arc<FakeLoader>,
    pub layout_loader: Arc<FakeLoader>,
}

impl FakeLibraries {
    pub fn new() -> Self {
        let diagram = FakeDiagramEngine::new();
        let chart = FakeChartEngine::new();
        let layout = RecordingLayoutEngine::new();
        let diagram_loader = FakeLoader::new(LibraryHandle::Diagram(diagram.clone()));
        let chart_loader = FakeLoader::new(LibraryHandle::Chart(chart.clone()));
        let layout_loader = FakeLoader::new(LibraryHandle::GraphLayout(layout.clone()));
        let registry = LibraryRegistry::new()
            .with_loader(LibraryId::Diagram, diagram_loader.clone())
            .with_loader(LibraryId::Chart, chart_loader.clone())
            .with_loader(LibraryId::GraphLayout, layout_loader.clone());
        Self {
            registry,
            diagram,
            chart,
            layout,
            diagram_loader,
            chart_loader,
            layout_loader,
        }
    }
}

impl Default for FakeLibraries {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Mount context on a fresh generation
pub fn mount_context(
    mount: &Arc<FakeMount>,
    kind: ArtifactKind,
    generation: &Generation,
    console: &ConsoleLogAggregator,
) -> MountContext {
    MountContext {
        mount: mount.clone(),
        kind,
        ticket: generation.advance(),
        console: console.clone(),
    }
}
