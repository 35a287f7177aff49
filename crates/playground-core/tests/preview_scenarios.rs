//! End-to-end scenarios: a response streams in chunk by chunk, the extractor
//! re-runs after each chunk and the surface adopts whatever it reports.

use playground_core::{
    ArtifactKind, FrameEvent, HostServices, NoClipboard, PlaygroundConfig, PreviewSurface,
    StreamingExtractor, TracingNotifier,
};
use playground_render::{RenderOutcome, Size};
use playground_test_utils::{FakeFrameHost, FakeLibraries, FakeMount};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;

struct Session {
    mount: Arc<FakeMount>,
    frames: Arc<FakeFrameHost>,
    libs: FakeLibraries,
    surface: PreviewSurface,
    extractor: StreamingExtractor,
}

impl Session {
    fn new(config: PlaygroundConfig) -> Self {
        let mount = FakeMount::new(Size::new(1024.0, 768.0));
        let frames = FakeFrameHost::new();
        let libs = FakeLibraries::new();
        let surface = PreviewSurface::new(
            config,
            HostServices {
                mount: mount.clone(),
                frames: frames.clone(),
                libraries: libs.registry.clone(),
                clipboard: Arc::new(NoClipboard),
                notifier: Arc::new(TracingNotifier),
            },
        );
        Self {
            mount,
            frames,
            libs,
            surface,
            extractor: StreamingExtractor::new(),
        }
    }

    /// Stream `response` in fixed-size chunks; returns the number of renders
    async fn stream(&mut self, response: &str, chunk_len: usize) -> usize {
        let chars: Vec<char> = response.chars().collect();
        let mut renders = 0;
        for chunk in chars.chunks(chunk_len) {
            let chunk: String = chunk.iter().collect();
            let found = self.extractor.push(&chunk).cloned();
            if self.surface.adopt(found).await.is_some() {
                renders += 1;
            }
        }
        if self.surface.adopt(self.extractor.finish()).await.is_some() {
            renders += 1;
        }
        renders
    }
}

#[tokio::test]
async fn streamed_diagram_loads_engine_once() {
    let mut session = Session::new(PlaygroundConfig::default());
    let response = "Here is the flow:\n\n```mermaid\ngraph TD\n  A[Start] --> B{Ok?}\n  B -->|yes| C[Done]\n```\n\nLet me know.";

    let renders = session.stream(response, 7).await;

    assert!(renders >= 1);
    assert_eq!(session.libs.diagram_loader.calls(), 1);
    assert_eq!(session.surface.artifact().unwrap().kind(), ArtifactKind::Mermaid);
    assert!(session.surface.code().ends_with("C[Done]"));
    assert_eq!(session.surface.last_outcome(), Some(RenderOutcome::Rendered));
    assert!(session.surface.export().unwrap().as_text().unwrap().starts_with("<svg"));
}

#[tokio::test]
async fn later_block_replaces_earlier_one() {
    let mut session = Session::new(PlaygroundConfig::default());
    let response = concat!(
        "First a page:\n```html\n<!DOCTYPE html><html><body><p>v1</p></body></html>\n```\n",
        "And the numbers:\n```json\n{\"xAxis\":{\"type\":\"category\"},\"series\":[{\"type\":\"bar\",\"data\":[4,2]}]}\n```\n"
    );

    session.stream(response, 16).await;

    assert_eq!(session.surface.mounted_kind(), Some(ArtifactKind::Echarts));
    assert!(session.frames.live_frames().is_empty());
    assert_eq!(session.libs.chart.counters.live(), 1);
    assert_eq!(session.mount.live_observers(), 1);
    assert_eq!(session.surface.export().unwrap().file_name, "artifact.png");
}

#[tokio::test]
async fn sandbox_console_respects_configured_retention() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[console]\nmax_entries = 3").unwrap();
    let config = PlaygroundConfig::load(file.path()).unwrap();

    let mut session = Session::new(config);
    session
        .stream("```html\n<div id=\"app\"></div>\n```", 64)
        .await;
    let token = session.surface.sandbox_token().unwrap();

    for i in 0..5 {
        let raw = format!(
            r#"{{"type":"iframe-log","v":1,"frame":"{token}","level":"log","message":"tick {i}"}}"#
        );
        assert_eq!(session.surface.handle_frame_message(&raw), FrameEvent::Logged);
    }

    let messages: Vec<String> = session
        .surface
        .console()
        .entries()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(messages, vec!["tick 2", "tick 3", "tick 4"]);
}

#[tokio::test]
async fn unrenderable_stream_leaves_surface_empty() {
    let mut session = Session::new(PlaygroundConfig::default());
    let renders = session
        .stream("Just prose, with `inline code` and no blocks at all.", 5)
        .await;

    assert_eq!(renders, 0);
    assert_eq!(session.surface.artifact(), None);
    assert!(session.mount.markup_history().is_empty());
}

#[tokio::test]
async fn cleared_conversation_starts_over() {
    let mut session = Session::new(PlaygroundConfig::default());
    session
        .stream("```markdown\n# Plan\n\n- [x] one\n- [ ] two\n```", 10)
        .await;
    assert_eq!(session.surface.mounted_kind(), Some(ArtifactKind::Markdown));

    session.extractor.reset();
    session.surface.clear();
    assert_eq!(session.surface.mounted_kind(), None);

    session
        .stream("```mindmap\n{\"name\":\"Trip\",\"children\":[\"Pack\",\"Go\"]}\n```", 12)
        .await;
    let scene = session.libs.layout.last_scene().unwrap();
    assert_eq!(scene.layout.nodes.len(), 3);
}
