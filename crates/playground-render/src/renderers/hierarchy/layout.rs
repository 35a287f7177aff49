//! Left-to-right tree layout and viewport
//!
//! Depth runs along x, one column per level, columns sharing the container
//! width. Leaves are stacked along y at a fixed spacing and every parent is
//! centered on its children. Coordinates are relative to the root at (0, 0).

use super::model::HierarchyNode;
use crate::config::HierarchyConfig;
use crate::surface::Size;
use serde::{Deserialize, Serialize};

/// Node with layout coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutNode {
    pub name: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    /// Index of the parent in [`TreeLayout::nodes`]
    pub parent: Option<usize>,
    pub has_children: bool,
}

/// Laid-out tree in pre-order; index 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub nodes: Vec<LaidOutNode>,
    /// Horizontal distance between levels
    pub column_width: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl TreeLayout {
    /// Parent/child index pairs
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.parent.map(|p| (p, i)))
    }

    /// The root node
    #[must_use]
    pub fn root(&self) -> &LaidOutNode {
        &self.nodes[0]
    }
}

/// Lay out `root` for a container `width` wide
#[must_use]
pub fn layout_tree(root: &HierarchyNode, width: f64, node_spacing: f64) -> TreeLayout {
    let levels = root.depth() + 1;
    let column_width = width.max(1.0) / levels as f64;

    let mut nodes = Vec::with_capacity(root.len());
    let mut next_leaf = 0usize;
    place(root, 0, None, column_width, node_spacing, &mut next_leaf, &mut nodes);

    let root_y = nodes[0].y;
    let mut min_y = 0.0f64;
    let mut max_y = 0.0f64;
    for node in &mut nodes {
        node.y -= root_y;
        min_y = min_y.min(node.y);
        max_y = max_y.max(node.y);
    }

    TreeLayout {
        nodes,
        column_width,
        min_y,
        max_y,
    }
}

fn place(
    node: &HierarchyNode,
    depth: usize,
    parent: Option<usize>,
    column_width: f64,
    spacing: f64,
    next_leaf: &mut usize,
    out: &mut Vec<LaidOutNode>,
) -> f64 {
    let index = out.len();
    out.push(LaidOutNode {
        name: node.name.clone(),
        depth,
        x: depth as f64 * column_width,
        y: 0.0,
        parent,
        has_children: !node.children.is_empty(),
    });

    let y = if node.children.is_empty() {
        let y = *next_leaf as f64 * spacing;
        *next_leaf += 1;
        y
    } else {
        let ys: Vec<f64> = node
            .children
            .iter()
            .map(|child| place(child, depth + 1, Some(index), column_width, spacing, next_leaf, out))
            .collect();
        let first = ys.first().copied().unwrap_or_default();
        let last = ys.last().copied().unwrap_or_default();
        (first + last) / 2.0
    };
    out[index].y = y;
    y
}

/// Pan and zoom state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Viewport {
    /// Root near the left edge, vertically centered
    #[must_use]
    pub fn initial(size: Size, config: &HierarchyConfig) -> Self {
        Self {
            translate_x: config.left_margin,
            translate_y: size.height / 2.0,
            scale: 1.0,
        }
    }

    /// Zoom by `factor` keeping the screen point (`fx`, `fy`) fixed
    ///
    /// The resulting scale is clamped to the configured limits.
    pub fn zoom_at(&mut self, factor: f64, fx: f64, fy: f64, config: &HierarchyConfig) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let scale = (self.scale * factor).clamp(config.min_scale, config.max_scale);
        let k = scale / self.scale;
        self.translate_x = fx - (fx - self.translate_x) * k;
        self.translate_y = fy - (fy - self.translate_y) * k;
        self.scale = scale;
    }

    /// Pan by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Map layout coordinates to screen coordinates
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }
}

/// Interaction settings handed to the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBehavior {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Double-click zoom; always off so double-clicks stay free for the page
    pub double_click_zoom: bool,
}

impl From<&HierarchyConfig> for ZoomBehavior {
    fn from(config: &HierarchyConfig) -> Self {
        Self {
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            double_click_zoom: false,
        }
    }
}

/// Everything a layout engine needs to draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeScene {
    pub layout: TreeLayout,
    pub viewport: Viewport,
    pub size: Size,
    pub zoom: ZoomBehavior,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HierarchyNode {
        HierarchyNode {
            name: "root".into(),
            children: vec![
                HierarchyNode {
                    name: "a".into(),
                    children: vec![HierarchyNode::leaf("a1"), HierarchyNode::leaf("a2")],
                },
                HierarchyNode::leaf("b"),
            ],
        }
    }

    #[test]
    fn columns_share_the_width() {
        let layout = layout_tree(&sample(), 900.0, 40.0);
        assert!((layout.column_width - 300.0).abs() < 1e-9);
        let a1 = layout.nodes.iter().find(|n| n.name == "a1").unwrap();
        assert!((a1.x - 600.0).abs() < 1e-9);
    }

    #[test]
    fn parents_center_on_children() {
        let layout = layout_tree(&sample(), 900.0, 40.0);
        let y = |name: &str| layout.nodes.iter().find(|n| n.name == name).unwrap().y;
        assert!((y("a") - (y("a1") + y("a2")) / 2.0).abs() < 1e-9);
        assert!((y("a2") - y("a1") - 40.0).abs() < 1e-9);
        assert!(layout.root().y.abs() < 1e-9);
    }

    #[test]
    fn links_follow_parents() {
        let layout = layout_tree(&sample(), 900.0, 40.0);
        assert_eq!(layout.links().count(), layout.nodes.len() - 1);
    }

    #[test]
    fn single_node_tree() {
        let layout = layout_tree(&HierarchyNode::leaf("only"), 500.0, 40.0);
        assert_eq!(layout.nodes.len(), 1);
        assert!((layout.column_width - 500.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_and_anchored() {
        let config = HierarchyConfig::default();
        let mut viewport = Viewport::initial(Size::new(800.0, 600.0), &config);
        let before = viewport.apply(100.0, 50.0);

        viewport.zoom_at(1000.0, before.0, before.1, &config);
        assert!((viewport.scale - config.max_scale).abs() < 1e-9);
        let after = viewport.apply(100.0, 50.0);
        assert!((after.0 - before.0).abs() < 1e-9);
        assert!((after.1 - before.1).abs() < 1e-9);

        viewport.zoom_at(0.0001, 0.0, 0.0, &config);
        assert!((viewport.scale - config.min_scale).abs() < 1e-9);
    }

    #[test]
    fn initial_viewport_centers_root() {
        let viewport = Viewport::initial(Size::new(800.0, 600.0), &HierarchyConfig::default());
        assert_eq!(viewport.apply(0.0, 0.0), (80.0, 300.0));
    }
}
