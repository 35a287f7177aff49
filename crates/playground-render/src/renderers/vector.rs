//! Inline document renderer
//!
//! SVG, Markdown and JSON need no library and no frame: they become markup
//! inserted straight into the mount point.

use super::{escape_html, FormatRenderer, MountContext, RenderOutcome};
use crate::console::ConsoleLevel;
use async_trait::async_trait;
use playground_artifact::ArtifactKind;
use playground_extract::parse_loose_literal;
use playground_extract::sniff::sniff_markup;
use pulldown_cmark::{html, Options, Parser};

/// Markdown to HTML with tables, strikethrough, task lists and footnotes
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Pretty-printed, escaped JSON viewer markup
///
/// # Errors
/// Returns the parser message when `text` is not valid JSON.
pub fn json_viewer(text: &str) -> Result<String, String> {
    let value = parse_loose_literal(text).map_err(|e| e.to_string())?;
    let pretty = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
    Ok(format!(
        "<pre class=\"json-viewer\"><code>{}</code></pre>",
        escape_html(&pretty)
    ))
}

/// Renders SVG, Markdown and JSON inline
#[derive(Debug, Default)]
pub struct VectorDocRenderer;

impl VectorDocRenderer {
    /// Create renderer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render_svg(ctx: &MountContext, content: &str) -> RenderOutcome {
        if sniff_markup(content) != Some(ArtifactKind::Svg) {
            return ctx.fail("Invalid SVG: expected an <svg> root element");
        }
        ctx.mount
            .set_markup(&format!("<div class=\"svg-preview\">{content}</div>"));
        RenderOutcome::Rendered
    }

    fn render_markdown(ctx: &MountContext, content: &str) -> RenderOutcome {
        let body = markdown_to_html(content);
        ctx.mount
            .set_markup(&format!("<article class=\"markdown-body\">{body}</article>"));
        RenderOutcome::Rendered
    }

    fn render_json(ctx: &MountContext, content: &str) -> RenderOutcome {
        match json_viewer(content) {
            Ok(markup) => {
                ctx.mount.set_markup(&markup);
                RenderOutcome::Rendered
            }
            Err(message) => ctx.fail(format!("Invalid data: {message}")),
        }
    }
}

#[async_trait]
impl FormatRenderer for VectorDocRenderer {
    fn name(&self) -> &'static str {
        "vector-doc"
    }

    fn handles(&self, kind: ArtifactKind) -> bool {
        matches!(
            kind,
            ArtifactKind::Svg | ArtifactKind::Markdown | ArtifactKind::Json
        )
    }

    async fn mount(&self, ctx: &MountContext, content: &str) -> RenderOutcome {
        if !ctx.ticket.is_current() {
            return RenderOutcome::Stale;
        }
        match ctx.kind {
            ArtifactKind::Svg => Self::render_svg(ctx, content),
            ArtifactKind::Markdown => Self::render_markdown(ctx, content),
            ArtifactKind::Json => Self::render_json(ctx, content),
            other => {
                ctx.console.push(
                    ConsoleLevel::Warn,
                    format!("{other} is not an inline document"),
                );
                ctx.fail(format!("Cannot render {other} inline"))
            }
        }
    }

    fn unmount(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gfm_extensions_are_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn json_is_pretty_and_escaped() {
        let markup = json_viewer(r#"{"tag":"<b>"}"#).unwrap();
        assert!(markup.contains("&quot;tag&quot;: &quot;&lt;b&gt;&quot;"));
        assert!(markup.starts_with("<pre class=\"json-viewer\">"));
    }

    #[test]
    fn invalid_json_reports_parser_message() {
        let err = json_viewer("{\"a\": }").unwrap_err();
        assert!(err.contains("line 1"));
    }
}
