//! HTML sandbox renderer
//!
//! Runs an HTML artifact in an isolated frame. Before the document is handed
//! to the frame it is enriched:
//!
//! 1. bare inline `<script>` tags become modules so `import` works
//! 2. fragments are wrapped in a full document shell
//! 3. the head receives a reset stylesheet, the console interceptor, the
//!    import map and any opted-in library scripts
//!
//! Each frame instance gets a fresh token. Console messages carrying any other
//! token come from a discarded frame and are dropped.

use super::{FormatRenderer, MountContext, RenderOutcome};
use crate::config::SandboxConfig;
use crate::error::ProtocolError;
use crate::protocol::sandbox::{SandboxLog, SandboxMessage, SANDBOX_PROTOCOL_VERSION};
use crate::surface::{FrameHost, FrameId, FrameSource, FrameSpec, MountPoint};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use playground_artifact::ArtifactKind;
use playground_extract::sniff::sniff_markup;
use regex::{Captures, Regex};
use std::sync::Arc;

/// Attribute marking the injected interceptor
const INTERCEPTOR_MARKER: &str = "data-playground=\"console\"";

const RESET_STYLE: &str = "<style data-playground=\"reset\">\
html,body{margin:0;padding:0;width:100%;height:100%;}\
*,*::before,*::after{box-sizing:border-box;}\
</style>";

static SCRIPT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script\b([^>]*)>").expect("script tag pattern is valid"));
static SRC_OR_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:src|type)\s*=").expect("script attribute pattern is valid")
});
static HEAD_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head\b[^>]*>").expect("head tag pattern is valid"));
static HTML_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<html\b[^>]*>").expect("html tag pattern is valid"));
static DOCTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!doctype[^>]*>").expect("doctype pattern is valid"));

/// Enrich an HTML artifact for the sandbox
///
/// Input that already opens its head with the interceptor for `token` is
/// returned unchanged. A marker anywhere else is artifact text and does not
/// count.
#[must_use]
pub fn enrich_document(content: &str, token: &str, config: &SandboxConfig) -> String {
    if is_enriched(content, token) {
        return content.to_owned();
    }

    let body = if config.module_scripts {
        rewrite_bare_scripts(content)
    } else {
        content.to_owned()
    };

    let mut head = String::new();
    if config.reset_styles {
        head.push_str(RESET_STYLE);
    }
    head.push_str(&console_interceptor(token));
    if let Some(map) = import_map_tag(config, &body) {
        head.push_str(&map);
    }
    for library in &config.libraries {
        let wanted = library.markers.iter().any(|m| body.contains(m.as_str()));
        if wanted && !body.contains(&library.src) {
            head.push_str(&format!(
                "<script src=\"{}\" data-playground=\"library\"></script>",
                library.src
            ));
        }
    }

    let document = if sniff_markup(&body) == Some(ArtifactKind::Html) {
        body
    } else {
        wrap_fragment(&body)
    };
    inject_into_head(&document, &head)
}

fn is_enriched(content: &str, token: &str) -> bool {
    let Some(open) = HEAD_OPEN.find(content) else {
        return false;
    };
    let head = &content[open.end()..];
    let head = head.strip_prefix(RESET_STYLE).unwrap_or(head);
    head.starts_with(&console_interceptor(token))
}

/// Give bare inline scripts `type="module"`
///
/// Scripts with a `src` or an explicit `type` are left alone.
#[must_use]
pub fn rewrite_bare_scripts(html: &str) -> String {
    SCRIPT_OPEN
        .replace_all(html, |caps: &Captures<'_>| {
            let attrs = &caps[1];
            if SRC_OR_TYPE.is_match(attrs) {
                caps[0].to_owned()
            } else {
                format!("<script type=\"module\"{attrs}>")
            }
        })
        .into_owned()
}

fn console_interceptor(token: &str) -> String {
    let token = serde_json::Value::from(token).to_string();
    format!(
        r#"<script {INTERCEPTOR_MARKER}>(function () {{
  var FRAME = {token};
  function fmt(a) {{
    if (a instanceof Error) return a.stack || a.message;
    if (a !== null && typeof a === 'object') {{ try {{ return JSON.stringify(a); }} catch (e) {{ return String(a); }} }}
    return String(a);
  }}
  function send(level, args) {{
    try {{
      var message = Array.prototype.map.call(args, fmt).join(' ');
      parent.postMessage({{ type: 'iframe-log', v: {SANDBOX_PROTOCOL_VERSION}, frame: FRAME, level: level, message: message }}, '*');
    }} catch (e) {{}}
  }}
  ['log', 'info', 'warn', 'error'].forEach(function (level) {{
    var original = console[level];
    console[level] = function () {{
      send(level, arguments);
      if (original) return original.apply(console, arguments);
    }};
  }});
  window.addEventListener('error', function (ev) {{
    send('error', ['Uncaught Error: ' + ev.message + ' (Line ' + ev.lineno + ')']);
  }});
  window.addEventListener('unhandledrejection', function (ev) {{
    var r = ev.reason;
    send('error', ['Unhandled Promise Rejection: ' + (r && r.message ? r.message : fmt(r))]);
  }});
}})();</script>"#
    )
}

fn import_map_tag(config: &SandboxConfig, body: &str) -> Option<String> {
    if config.import_map.is_empty() || body.contains("type=\"importmap\"") {
        return None;
    }
    let map = serde_json::json!({ "imports": config.import_map });
    Some(format!("<script type=\"importmap\">{map}</script>"))
}

fn wrap_fragment(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         </head>\n<body>\n{fragment}\n</body>\n</html>"
    )
}

fn inject_into_head(document: &str, head: &str) -> String {
    let (at, insert) = if let Some(m) = HEAD_OPEN.find(document) {
        (m.end(), head.to_owned())
    } else if let Some(m) = HTML_OPEN.find(document) {
        (m.end(), format!("<head>{head}</head>"))
    } else if let Some(m) = DOCTYPE.find(document) {
        (m.end(), format!("<head>{head}</head>"))
    } else {
        (0, format!("<head>{head}</head>"))
    };

    let mut out = String::with_capacity(document.len() + insert.len());
    out.push_str(&document[..at]);
    out.push_str(&insert);
    out.push_str(&document[at..]);
    out
}

#[derive(Debug)]
struct ActiveFrame {
    id: FrameId,
    token: String,
    content: String,
}

/// Renders HTML artifacts into sandboxed frames
pub struct HtmlSandboxRenderer {
    frames: Arc<dyn FrameHost>,
    config: SandboxConfig,
    active: Mutex<Option<ActiveFrame>>,
}

impl HtmlSandboxRenderer {
    /// Create renderer using `frames` to host documents
    #[must_use]
    pub fn new(frames: Arc<dyn FrameHost>, config: SandboxConfig) -> Self {
        Self {
            frames,
            config,
            active: Mutex::new(None),
        }
    }

    /// Recreate the frame from scratch with a new token
    ///
    /// Returns `false` when nothing is mounted.
    pub fn reload(&self, mount: &dyn MountPoint) -> bool {
        let content = match self.active.lock().as_ref() {
            Some(active) => active.content.clone(),
            None => return false,
        };
        self.open_frame(mount, content);
        true
    }

    /// Validate a console message from the current frame
    ///
    /// # Errors
    /// Returns [`ProtocolError::StaleFrame`] when nothing is mounted or the
    /// message comes from a discarded frame, and decoding errors otherwise.
    pub fn accept_message(&self, raw: &str) -> Result<SandboxLog, ProtocolError> {
        let token = self
            .active
            .lock()
            .as_ref()
            .map(|a| a.token.clone())
            .ok_or(ProtocolError::StaleFrame)?;
        SandboxMessage::decode_from(raw, &token)
    }

    /// Token of the live frame
    #[must_use]
    pub fn frame_token(&self) -> Option<String> {
        self.active.lock().as_ref().map(|a| a.token.clone())
    }

    /// Live frame handle
    #[must_use]
    pub fn frame(&self) -> Option<FrameId> {
        self.active.lock().as_ref().map(|a| a.id)
    }

    /// Sandbox settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    fn open_frame(&self, mount: &dyn MountPoint, content: String) {
        let mut active = self.active.lock();
        if let Some(old) = active.take() {
            self.frames.destroy_frame(old.id);
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let document = enrich_document(&content, &token, &self.config);
        let id = self.frames.create_frame(
            mount,
            FrameSpec {
                source: FrameSource::Document(document),
                sandbox: Some(self.config.policy.attribute()),
            },
        );
        tracing::debug!(frame = %id, token = %token, "sandbox frame created");
        *active = Some(ActiveFrame { id, token, content });
    }
}

#[async_trait]
impl FormatRenderer for HtmlSandboxRenderer {
    fn name(&self) -> &'static str {
        "html-sandbox"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        kind == ArtifactKind::Html
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }
        self.open_frame(ctx.mount.as_ref(), content.to_owned());
        RenderOutcome::Rendered
    }

    fn unmount(&self) {
        if let Some(old) = self.active.lock().take() {
            self.frames.destroy_frame(old.id);
        }
    }
}

impl std::fmt::Debug for HtmlSandboxRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlSandboxRenderer")
            .field("active", &*self.active.lock())
            .finish_non_exhaustive()
    }
}
