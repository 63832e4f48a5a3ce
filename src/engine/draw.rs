//! Painter's-order flattening of the canvas tree for the host renderer.

use super::{CanvasId, Viewer};
use crate::camera::{Projection, Rect, View};

/// One canvas as the renderer should draw it this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Canvas being drawn.
    pub canvas: CanvasId,
    /// Tree depth; the root is 0.
    pub depth: u32,
    /// Screen region in CSS pixels.
    pub region: Rect,
    /// Opacity multiplied down from every ancestor.
    pub opacity: f64,
    /// Draw-order hint among siblings.
    pub z_index: i32,
    /// Current view.
    pub view: View,
    /// Projection of the canvas's image.
    pub projection: Projection,
    /// False for pure containers.
    pub has_image: bool,
}

/// Everything to draw, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPlan {
    /// Items in painter's order: parents before children, siblings by
    /// ascending z-index then insertion order.
    pub items: Vec<DrawItem>,
}

impl DrawPlan {
    /// Items that actually put pixels on screen.
    pub fn images(&self) -> impl Iterator<Item = &DrawItem> + '_ {
        self.items
            .iter()
            .filter(|item| item.has_image && item.opacity > 0.0)
    }
}

impl Viewer {
    /// Flatten the canvas tree for drawing. Canvases without a screen
    /// region are skipped along with their subtrees.
    #[must_use]
    pub fn draw_plan(&self) -> DrawPlan {
        let mut items = Vec::with_capacity(self.canvases.len());
        self.collect(self.root, 0, 1.0, &mut items);
        DrawPlan { items }
    }

    fn collect(&self, id: CanvasId, depth: u32, inherited: f64, items: &mut Vec<DrawItem>) {
        let Some(canvas) = self.canvases.get(id) else {
            return;
        };
        if !canvas.is_laid_out() {
            return;
        }
        let opacity = inherited * canvas.opacity();
        items.push(DrawItem {
            canvas: id,
            depth,
            region: canvas.region(),
            opacity,
            z_index: canvas.z_index(),
            view: canvas.view(),
            projection: canvas.projection(),
            has_image: canvas.descriptor().has_image(),
        });
        let mut children = canvas.children().to_vec();
        // stable: equal z-indices keep insertion order
        children.sort_by_key(|&c| self.canvases.get(c).map_or(0, |c| c.z_index()));
        for child in children {
            self.collect(child, depth + 1, opacity, items);
        }
    }
}
