//! Static SVG tree engine
//!
//! A [`GraphLayoutEngine`] that draws the scene as plain SVG markup. Used
//! where no interactive layout library is available (command line export,
//! server-side previews) and as the reference drawing in tests.

use super::layout::TreeScene;
use crate::engine::GraphLayoutEngine;
use crate::error::RenderError;
use crate::renderers::escape_html;
use crate::surface::MountPoint;
use std::fmt::Write;

const NODE_RADIUS: f64 = 4.5;

/// Draws trees as static SVG
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgTreeEngine;

impl SvgTreeEngine {
    /// Render a scene to SVG markup
    #[must_use]
    pub fn to_svg(scene: &TreeScene) -> String {
        let layout = &scene.layout;
        let vp = &scene.viewport;
        let mut out = String::new();

        let _ = write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\" font-size=\"12\">",
            w = scene.size.width,
            h = scene.size.height,
        );
        let _ = write!(
            out,
            "<g transform=\"translate({},{}) scale({})\">",
            vp.translate_x, vp.translate_y, vp.scale
        );

        out.push_str("<g fill=\"none\" stroke=\"#555\" stroke-opacity=\"0.4\" stroke-width=\"1.5\">");
        for (parent, child) in layout.links() {
            let (s, t) = (&layout.nodes[parent], &layout.nodes[child]);
            let mid = (s.x + t.x) / 2.0;
            let _ = write!(
                out,
                "<path d=\"M{},{}C{},{} {},{} {},{}\"/>",
                s.x, s.y, mid, s.y, mid, t.y, t.x, t.y
            );
        }
        out.push_str("</g>");

        for node in &layout.nodes {
            let fill = if node.has_children { "#555" } else { "#999" };
            let (dx, anchor) = if node.has_children {
                (-8, "end")
            } else {
                (8, "start")
            };
            let _ = write!(
                out,
                "<g transform=\"translate({},{})\"><circle r=\"{NODE_RADIUS}\" fill=\"{fill}\"/>\
                 <text dy=\"0.31em\" x=\"{dx}\" text-anchor=\"{anchor}\">{}</text></g>",
                node.x,
                node.y,
                escape_html(&node.name)
            );
        }

        out.push_str("</g></svg>");
        out
    }
}

impl GraphLayoutEngine for SvgTreeEngine {
    fn draw(&self, mount: &dyn MountPoint, scene: &TreeScene) -> Result<(), RenderError> {
        mount.set_markup(&Self::to_svg(scene));
        Ok(())
    }
}
