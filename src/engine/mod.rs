//! The viewer: owner of every canvas, tree layout and frame driving.
//!
//! A [`Viewer`] holds all canvases of one embedded widget in a slotmap
//! arena. There is exactly one implicit root canvas covering the element;
//! every other canvas descends from it and is placed by its area rect
//! inside its parent's region. The host drives everything:
//!
//! 1. call camera or compositing operations (directly through
//!    [`Viewer::canvas_mut`] or via [`Viewer::execute`]),
//! 2. call [`Viewer::tick`] once per frame with its timestamp,
//! 3. if the report says so, render [`Viewer::draw_plan`] and fetch
//!    [`Viewer::tile_plans`], then [`Viewer::confirm_draw`].

mod command;
mod draw;
mod tree;

pub use command::{CommandOutcome, ViewerCommand};
pub use draw::{DrawItem, DrawPlan};

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::animation::{AnimationStatus, AnimationTicket, TicketLog};
use crate::camera::Rect;
use crate::canvas::{Canvas, ImageDescriptor, Relayout};
use crate::error::ViewerError;
use crate::options::Options;
use crate::tiles::{plan_tiles, TilePlan};

/// Destroyed canvases whose ticket outcomes stay queryable.
const RETIRED_CAPACITY: usize = 32;

new_key_type! {
    /// Generational handle of a canvas; stale after the canvas is destroyed.
    pub struct CanvasId;
}

/// Outcome of one [`Viewer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Some timeline is still running; keep ticking.
    pub animating: bool,
    /// The last confirmed draw is stale.
    pub needs_draw: bool,
}

/// One embedded viewer widget.
#[derive(Debug)]
pub struct Viewer {
    options: Options,
    canvases: SlotMap<CanvasId, Canvas>,
    root: CanvasId,
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
    /// Tree shape or order changed since the last confirmed draw.
    structure_dirty: bool,
    /// Last planned tile layer per canvas, for layer-switch logging.
    planned_layers: FxHashMap<CanvasId, u32>,
    /// Ticket history of recently destroyed canvases.
    retired: VecDeque<(CanvasId, TicketLog)>,
}

impl Viewer {
    /// Viewer for an element of `width`×`height` CSS pixels.
    #[must_use]
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, options: Options) -> Self {
        let mut canvases = SlotMap::with_key();
        let root = canvases.insert(Canvas::new(
            ImageDescriptor::container(),
            options.camera.clone(),
            options.transitions.clone(),
        ));
        let mut viewer = Self {
            options,
            canvases,
            root,
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            device_pixel_ratio: sanitize_dpr(device_pixel_ratio),
            structure_dirty: true,
            planned_layers: FxHashMap::default(),
            retired: VecDeque::new(),
        };
        viewer.layout(Relayout::KeepScale);
        log::info!(
            "viewer created: {}x{} @{}x",
            viewer.width,
            viewer.height,
            viewer.device_pixel_ratio
        );
        viewer
    }

    /// Options the viewer was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The implicit root canvas.
    #[must_use]
    pub fn root(&self) -> CanvasId {
        self.root
    }

    /// Element size in CSS pixels.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Device pixel ratio.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Number of live canvases, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    /// Always false: the root canvas exists for the viewer's lifetime.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    /// Whether `id` names a live canvas.
    #[must_use]
    pub fn contains(&self, id: CanvasId) -> bool {
        self.canvases.contains_key(id)
    }

    /// Shared access to a canvas.
    #[must_use]
    pub fn canvas(&self, id: CanvasId) -> Option<&Canvas> {
        self.canvases.get(id)
    }

    /// Mutable access to a canvas for camera instructions.
    pub fn canvas_mut(&mut self, id: CanvasId) -> Option<&mut Canvas> {
        self.canvases.get_mut(id)
    }

    pub(crate) fn try_canvas_mut(&mut self, id: CanvasId) -> Result<&mut Canvas, ViewerError> {
        self.canvases.get_mut(id).ok_or(ViewerError::UnknownCanvas(id))
    }

    /// Status of a ticket issued by `id`. Tickets of a destroyed canvas
    /// keep their final status until the canvas falls out of the retired
    /// history.
    #[must_use]
    pub fn status(&self, id: CanvasId, ticket: AnimationTicket) -> AnimationStatus {
        if let Some(canvas) = self.canvases.get(id) {
            return canvas.status(ticket);
        }
        self.retired
            .iter()
            .find(|(retired, _)| *retired == id)
            .map_or(AnimationStatus::Unknown, |(_, log)| log.lookup(ticket))
    }

    fn retire(&mut self, id: CanvasId, tickets: TicketLog) {
        if self.retired.len() == RETIRED_CAPACITY {
            let _ = self.retired.pop_front();
        }
        self.retired.push_back((id, tickets));
    }

    /// Change the element size or pixel ratio. Every canvas keeps its
    /// center and scale.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        self.width = sanitize_extent(width);
        self.height = sanitize_extent(height);
        self.device_pixel_ratio = sanitize_dpr(device_pixel_ratio);
        self.structure_dirty = true;
        self.layout(Relayout::KeepScale);
        log::info!(
            "viewer resized: {}x{} @{}x",
            self.width,
            self.height,
            self.device_pixel_ratio
        );
    }

    /// Advance every canvas to host time `now` (milliseconds).
    pub fn tick(&mut self, now: f64) -> TickReport {
        let mut animating = false;
        for canvas in self.canvases.values_mut() {
            animating |= canvas.tick(now);
        }
        // area transitions move child regions
        self.layout(Relayout::KeepView);
        TickReport {
            animating,
            needs_draw: self.needs_draw(),
        }
    }

    /// Whether anything changed since the last confirmed draw or is still
    /// animating.
    #[must_use]
    pub fn needs_draw(&self) -> bool {
        self.structure_dirty || self.canvases.values().any(Canvas::needs_draw)
    }

    /// Acknowledge that the current state has been drawn.
    pub fn confirm_draw(&mut self) {
        self.structure_dirty = false;
        for canvas in self.canvases.values_mut() {
            canvas.confirm_draw();
        }
    }

    /// Tiles one canvas needs.
    pub fn tile_plan(&mut self, id: CanvasId) -> Option<TilePlan> {
        let canvas = self.canvases.get(id)?;
        let plan = plan_tiles(id, canvas, self.device_pixel_ratio, &self.options.tiles);
        if !plan.tiles.is_empty() {
            let previous = self.planned_layers.insert(id, plan.layer);
            if previous != Some(plan.layer) {
                log::debug!(
                    "canvas {:?} tile layer {:?} -> {} of {}",
                    id,
                    previous,
                    plan.layer,
                    plan.max_layer
                );
            }
        }
        Some(plan)
    }

    /// Tile plans of every drawn canvas, in painter's order.
    pub fn tile_plans(&mut self) -> Vec<TilePlan> {
        let order: Vec<CanvasId> = self.draw_plan().items.iter().map(|i| i.canvas).collect();
        order
            .into_iter()
            .filter_map(|id| self.tile_plan(id))
            .filter(|plan| !plan.tiles.is_empty())
            .collect()
    }

    /// Region of the root canvas.
    fn element_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

fn sanitize_dpr(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Projection, View};
    use crate::canvas::{CanvasState, FlyToOptions, SetViewOptions};

    fn viewer() -> Viewer {
        Viewer::new(1024.0, 768.0, 1.0, Options::default())
    }

    #[test]
    fn test_root_covers_element() {
        let v = viewer();
        let root = v.canvas(v.root()).map(Canvas::region);
        assert_eq!(root, Some(Rect::new(0.0, 0.0, 1024.0, 768.0)));
        assert_eq!(v.len(), 1);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_fly_to_completes_through_ticks() {
        let mut v = viewer();
        let id = v
            .create_canvas(ImageDescriptor::image(4096.0, 3072.0, Projection::Flat), None)
            .unwrap();
        let target = View::new(0.4, 0.4, 0.25, 0.25);
        let ticket = v
            .canvas_mut(id)
            .unwrap()
            .fly_to(&target, &FlyToOptions::with_duration(200.0), 0.0);
        assert_eq!(v.status(id, ticket), AnimationStatus::Pending);
        let report = v.tick(100.0);
        assert!(report.animating && report.needs_draw);
        let report = v.tick(250.0);
        assert!(!report.animating);
        assert_eq!(v.status(id, ticket), AnimationStatus::Completed);
        assert_eq!(v.canvas(id).map(Canvas::state), Some(CanvasState::Idle));
        v.confirm_draw();
        assert!(!v.tick(300.0).needs_draw);
    }

    #[test]
    fn test_resize_preserves_scale() {
        let mut v = viewer();
        let id = v
            .create_canvas(ImageDescriptor::image(8000.0, 8000.0, Projection::Flat), None)
            .unwrap();
        v.canvas_mut(id)
            .unwrap()
            .set_view(&View::new(0.5, 0.5, 0.1, 0.1), &SetViewOptions::default());
        let scale = v.canvas(id).unwrap().scale();
        v.resize(800.0, 600.0, 2.0);
        let c = v.canvas(id).unwrap();
        assert!(crate::util::scale_approx_eq(c.scale(), scale));
        assert_eq!(c.region(), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(v.device_pixel_ratio(), 2.0);
    }

    #[test]
    fn test_destroyed_canvas_reports_interrupted() {
        let mut v = viewer();
        let image = ImageDescriptor::image(100.0, 100.0, Projection::Flat);
        let id = v.create_canvas(image, None).unwrap();
        let ticket = v.canvas_mut(id).unwrap().fade_out(false, 0.0);
        assert_eq!(v.status(id, ticket), AnimationStatus::Pending);
        v.destroy(id).unwrap();
        assert!(v.canvas(id).is_none());
        assert_eq!(v.status(id, ticket), AnimationStatus::Interrupted);
        assert_eq!(v.status(id, AnimationTicket(ticket.0 + 1)), AnimationStatus::Unknown);

        // the retired history is bounded
        for _ in 0..RETIRED_CAPACITY {
            let other = v.create_canvas(image, None).unwrap();
            v.destroy(other).unwrap();
        }
        assert_eq!(v.status(id, ticket), AnimationStatus::Unknown);
    }

    #[test]
    fn test_tile_plans_follow_draw_order() {
        let mut v = viewer();
        let a = v
            .create_canvas(ImageDescriptor::image(2048.0, 2048.0, Projection::Flat), None)
            .unwrap();
        let _container = v.create_canvas(ImageDescriptor::container(), None).unwrap();
        let plans = v.tile_plans();
        assert_eq!(plans.len(), 1);
        assert!(plans[0].tiles.iter().all(|t| t.id.canvas == a));
    }
}
