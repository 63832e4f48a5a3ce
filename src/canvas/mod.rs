//! Per-image-surface camera state.
//!
//! A [`Canvas`] owns its [`View`], its scale and position limits, and the
//! two animation timelines (camera and opacity). Navigation instructions
//! live in `navigation.rs`, pointer gestures in `gesture.rs`; this file
//! holds the state itself, the limit rules and the per-tick update.
//!
//! Lifecycle: `Uninitialized` until the first non-empty screen region,
//! then `Ready`, `Animating` while any timeline runs, `Idle` once it
//! settles, and `Destroyed` when removed from its viewer.

mod gesture;
pub mod instructions;
mod navigation;

use glam::{DMat4, DVec2};

pub use instructions::{
    FlyToOptions, ImageDescriptor, PanOptions, SetViewOptions, ZoomOptions,
};

use crate::animation::{
    AnimationStatus, AnimationTicket, CameraAnimation, CameraAnimationKind,
    Fade, TicketLog, Tween,
};
use crate::camera::projection::{pitch, with_pitch, with_yaw, yaw};
use crate::camera::{
    compute_transform_matrix, Placement, Projection, Rect, ScreenPoint, View,
    ViewGeometry,
};
use crate::engine::CanvasId;
use crate::options::{CameraOptions, TransitionOptions};
use crate::util::easing::Easing;
use crate::util::{scale_approx_eq, wrap_unit};
use gesture::GestureState;

/// Lifecycle of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    /// No screen region yet.
    Uninitialized,
    /// Laid out, no instruction issued yet.
    Ready,
    /// A camera, opacity or area transition is running.
    Animating,
    /// Laid out and at rest.
    Idle,
    /// Removed from its viewer.
    Destroyed,
}

/// How a canvas's view follows a change of its screen region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relayout {
    /// The element was resized: keep center and scale.
    KeepScale,
    /// The canvas was placed or re-parented: keep the shown image part.
    KeepView,
}

/// One renderable image surface.
#[derive(Debug)]
pub struct Canvas {
    descriptor: ImageDescriptor,
    camera_options: CameraOptions,
    transitions: TransitionOptions,
    state: CanvasState,
    view: View,
    last_view: Option<View>,
    has_explicit_view: bool,
    region: Rect,
    opacity: f64,
    fade: Option<Fade>,
    z_index: i32,
    area: Rect,
    area_transition: Option<Tween<Rect>>,
    embedded: bool,
    pub(crate) parent: Option<CanvasId>,
    pub(crate) children: Vec<CanvasId>,
    camera: Option<CameraAnimation>,
    tickets: TicketLog,
    gesture: GestureState,
    revision: u64,
    drawn_revision: u64,
}

impl Canvas {
    pub(crate) fn new(
        descriptor: ImageDescriptor,
        camera_options: CameraOptions,
        transitions: TransitionOptions,
    ) -> Self {
        Self {
            descriptor,
            camera_options,
            transitions,
            state: CanvasState::Uninitialized,
            view: View::FULL,
            last_view: None,
            has_explicit_view: false,
            region: Rect::default(),
            opacity: 1.0,
            fade: None,
            z_index: 0,
            area: Rect::UNIT,
            area_transition: None,
            embedded: false,
            parent: None,
            children: Vec::new(),
            camera: None,
            tickets: TicketLog::default(),
            gesture: GestureState::default(),
            revision: 1,
            drawn_revision: 0,
        }
    }

    // -- Accessors --

    /// Image this canvas was created from.
    #[must_use]
    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    /// Coordinate system.
    #[must_use]
    pub fn projection(&self) -> Projection {
        self.descriptor.projection
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    /// View recorded before the last navigation, if any.
    #[must_use]
    pub fn last_view(&self) -> Option<View> {
        self.last_view
    }

    /// Screen region in CSS pixels.
    #[must_use]
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Current opacity.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Draw-order hint among siblings.
    #[must_use]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Current (possibly mid-transition) placement within the parent.
    #[must_use]
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Parent canvas, `None` only for the root.
    #[must_use]
    pub fn parent(&self) -> Option<CanvasId> {
        self.parent
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[CanvasId] {
        &self.children
    }

    /// Whether the canvas has a drawable screen region.
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.region.is_drawable()
    }

    /// Whether any timeline is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.camera.is_some() || self.fade.is_some() || self.area_transition.is_some()
    }

    /// Kind of the live camera animation.
    #[must_use]
    pub fn camera_animation(&self) -> Option<CameraAnimationKind> {
        self.camera.map(|a| a.kind())
    }

    /// Geometry for the current region, image and projection.
    #[must_use]
    pub fn geometry(&self) -> ViewGeometry {
        ViewGeometry::new(
            self.region,
            self.descriptor.width,
            self.descriptor.height,
            self.descriptor.projection,
        )
    }

    /// Status of a ticket issued by this canvas.
    #[must_use]
    pub fn status(&self, ticket: AnimationTicket) -> AnimationStatus {
        let live_camera = self.camera.is_some_and(|a| a.ticket() == ticket);
        let live_fade = self.fade.is_some_and(|f| f.ticket == ticket);
        if live_camera || live_fade {
            AnimationStatus::Pending
        } else {
            self.tickets.lookup(ticket)
        }
    }

    // -- Projection helpers over the current view --

    /// Project an image point with the current view.
    #[must_use]
    pub fn project(&self, x: f64, y: f64, absolute: bool) -> ScreenPoint {
        self.geometry().project(&self.view, x, y, absolute)
    }

    /// Unproject a screen point with the current view.
    #[must_use]
    pub fn unproject(&self, sx: f64, sy: f64, allow_out_of_bounds: bool) -> DVec2 {
        self.geometry().unproject(&self.view, sx, sy, allow_out_of_bounds)
    }

    /// Placement matrix for an embed or marker over the current view.
    #[must_use]
    pub fn transform_matrix(&self, placement: &Placement) -> DMat4 {
        compute_transform_matrix(&self.geometry(), &self.view, placement)
    }

    /// 360 yaw in radians with true north applied.
    #[must_use]
    pub fn yaw(&self) -> Option<f64> {
        match self.descriptor.projection {
            Projection::Spherical { true_north } => Some(yaw(&self.view, true_north)),
            _ => None,
        }
    }

    /// 360 pitch in radians.
    #[must_use]
    pub fn pitch(&self) -> Option<f64> {
        match self.descriptor.projection {
            Projection::Spherical { .. } => Some(pitch(&self.view)),
            _ => None,
        }
    }

    /// Point a 360 view at `radians` of yaw. False for other projections.
    pub fn set_yaw(&mut self, radians: f64) -> bool {
        let Projection::Spherical { true_north } = self.descriptor.projection else {
            return false;
        };
        if !radians.is_finite() {
            return false;
        }
        self.interrupt_camera();
        let next = self.constrain(&with_yaw(&self.view, radians, true_north));
        self.apply_view(next);
        self.settle_state();
        true
    }

    /// Tilt a 360 view to `radians` of pitch. False for other projections.
    pub fn set_pitch(&mut self, radians: f64) -> bool {
        if !matches!(self.descriptor.projection, Projection::Spherical { .. })
            || !radians.is_finite()
        {
            return false;
        }
        self.interrupt_camera();
        let next = self.constrain(&with_pitch(&self.view, radians));
        self.apply_view(next);
        self.settle_state();
        true
    }

    /// Displayed omni frame and ring for the current view.
    #[must_use]
    pub fn omni_frame(&self) -> Option<(u32, u32)> {
        match self.descriptor.projection {
            Projection::Omni(params) => Some((
                params.frame_for(self.view.center_x),
                params.layer_for(self.view.center_y),
            )),
            _ => None,
        }
    }

    // -- Scale bounds --

    /// Widest view width that fits (or covers, with `cover_limit`) the
    /// limit rect or the whole image.
    fn fit_width(&self) -> f64 {
        match self.descriptor.projection {
            Projection::Flat => {
                let g = self.geometry();
                let limit = self.descriptor.limit.unwrap_or(Rect::UNIT);
                let height_bound = limit.height * g.screen_aspect() / g.image_aspect();
                if self.descriptor.cover_limit {
                    limit.width.min(height_bound)
                } else {
                    limit.width.max(height_bound)
                }
            }
            Projection::Spherical { .. } => self.camera_options.max_fov_deg / 360.0,
            Projection::Omni(_) => 1.0,
        }
    }

    /// Allowed view widths `(narrowest, widest)`; narrowest is the max scale.
    #[must_use]
    pub fn width_bounds(&self) -> (f64, f64) {
        let g = self.geometry();
        let widest = match self.descriptor.min_scale {
            Some(s) if s.is_finite() && s > 0.0 => g.width_for_scale(s),
            _ => self.fit_width(),
        };
        let max_scale = self
            .descriptor
            .max_scale
            .unwrap_or(self.camera_options.max_scale);
        let mut narrowest = g.width_for_scale(max_scale);
        if matches!(self.descriptor.projection, Projection::Spherical { .. }) {
            narrowest = narrowest.max(self.camera_options.min_fov_deg / 360.0);
        }
        (narrowest.min(widest), widest)
    }

    fn scale_for_width(&self, width: f64) -> f64 {
        let g = self.geometry();
        g.scale(&View::new(0.5, 0.5, width, g.height_for_width(width)))
    }

    /// Current screen pixels per image pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.geometry().scale(&self.view)
    }

    /// Smallest allowed scale.
    #[must_use]
    pub fn min_scale(&self) -> f64 {
        self.scale_for_width(self.width_bounds().1)
    }

    /// Largest allowed scale.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        self.scale_for_width(self.width_bounds().0)
    }

    /// Scale at which the image fits (or covers) the region.
    #[must_use]
    pub fn fit_scale(&self) -> f64 {
        self.scale_for_width(self.fit_width())
    }

    /// Whether the canvas sits at its maximum scale.
    #[must_use]
    pub fn is_zoomed_in(&self) -> bool {
        let max = self.max_scale();
        let scale = self.scale();
        scale >= max || scale_approx_eq(scale, max)
    }

    /// Whether the canvas sits at its minimum scale, or with `strict`,
    /// exactly at the fit scale.
    #[must_use]
    pub fn is_zoomed_out(&self, strict: bool) -> bool {
        let scale = self.scale();
        if strict {
            return scale_approx_eq(scale, self.fit_scale());
        }
        let min = self.min_scale();
        scale <= min || scale_approx_eq(scale, min)
    }

    // -- Limits --

    /// Default view on first layout.
    fn home_view(&self) -> View {
        let g = self.geometry();
        let width = self.width_bounds().1;
        let center_x = match self.descriptor.projection {
            Projection::Omni(_) => 0.0,
            _ => 0.5,
        };
        self.clamp_position(&View::new(center_x, 0.5, width, g.height_for_width(width)))
    }

    /// Sanitize, match the region aspect and wrap periodic axes.
    fn normalize(&self, view: &View) -> View {
        let mut v = view.sanitized(&self.view);
        if self.is_laid_out() {
            v = self.geometry().fit_view(&v);
        }
        if self.descriptor.projection.wraps_horizontally() {
            v.center_x = wrap_unit(v.center_x);
            v.center_y = v.center_y.clamp(0.0, 1.0);
        }
        v
    }

    /// Clamp the width to the allowed scale range.
    fn clamp_scale(&self, view: &View) -> View {
        if !self.is_laid_out() {
            return *view;
        }
        let (narrowest, widest) = self.width_bounds();
        let width = view.width.max(narrowest).min(widest);
        if width == view.width {
            return *view;
        }
        View::new(
            view.center_x,
            view.center_y,
            width,
            self.geometry().height_for_width(width),
        )
    }

    /// Keep the view's position inside the limit rect (flat), within
    /// latitude (360) or within the rings (omni).
    fn clamp_position(&self, view: &View) -> View {
        let mut v = *view;
        match self.descriptor.projection {
            Projection::Flat => {
                let limit = match (self.descriptor.limit, self.descriptor.free_move) {
                    (Some(limit), _) => Some(limit),
                    (None, false) => Some(Rect::UNIT),
                    (None, true) => None,
                };
                match limit {
                    Some(limit) => {
                        v.center_x = clamp_axis(v.center_x, v.width, limit.x, limit.right());
                        v.center_y = clamp_axis(v.center_y, v.height, limit.y, limit.bottom());
                    }
                    None => {
                        v.center_x = v.center_x.clamp(0.0, 1.0);
                        v.center_y = v.center_y.clamp(0.0, 1.0);
                    }
                }
            }
            Projection::Spherical { .. } => {
                v.center_x = wrap_unit(v.center_x);
                v.center_y = clamp_axis(v.center_y, v.height, 0.0, 1.0);
            }
            Projection::Omni(_) => {
                v.center_x = wrap_unit(v.center_x);
                v.center_y = v.center_y.clamp(0.0, 1.0);
            }
        }
        v
    }

    /// Scale then position limits.
    pub(crate) fn constrain(&self, view: &View) -> View {
        self.clamp_position(&self.clamp_scale(view))
    }

    // -- Mutation plumbing --

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn apply_view(&mut self, view: View) {
        if view != self.view {
            self.view = view;
            self.bump();
        }
    }

    fn set_opacity_value(&mut self, opacity: f64) {
        if opacity != self.opacity {
            self.opacity = opacity;
            self.bump();
        }
    }

    /// Move into `Animating` or `Idle` after an instruction.
    fn settle_state(&mut self) {
        if matches!(
            self.state,
            CanvasState::Uninitialized | CanvasState::Destroyed
        ) {
            return;
        }
        self.state = if self.is_animating() {
            CanvasState::Animating
        } else {
            CanvasState::Idle
        };
    }

    /// Assign a new screen region. With [`Relayout::KeepScale`] the
    /// center and scale survive; with [`Relayout::KeepView`] the view
    /// survives, widened only as far as the new aspect ratio requires.
    pub(crate) fn set_region(&mut self, region: Rect, mode: Relayout) {
        if self.state == CanvasState::Destroyed || region == self.region {
            return;
        }
        let previous_scale = self.is_laid_out().then(|| self.scale());
        self.region = region;
        self.bump();
        if !self.is_laid_out() {
            return;
        }
        let next = match (self.state, mode, previous_scale) {
            (CanvasState::Uninitialized, ..) => {
                self.state = CanvasState::Ready;
                if self.has_explicit_view {
                    self.constrain(&self.normalize(&self.view))
                } else {
                    self.home_view()
                }
            }
            (_, Relayout::KeepScale, Some(scale)) => {
                let g = self.geometry();
                let width = g.width_for_scale(scale);
                let kept = View::new(
                    self.view.center_x,
                    self.view.center_y,
                    width,
                    g.height_for_width(width),
                );
                self.constrain(&kept)
            }
            _ => self.constrain(&self.normalize(&self.view)),
        };
        self.apply_view(next);
    }

    /// Mark the canvas as an overlay on an image canvas; its fades then
    /// use the embed fade duration.
    pub(crate) fn set_embedded(&mut self, embedded: bool) {
        self.embedded = embedded;
    }

    /// Default opacity transition length.
    pub(crate) fn fade_duration(&self) -> f64 {
        if self.embedded {
            self.transitions.embed_fade_ms
        } else {
            self.transitions.cross_fade_ms
        }
    }

    /// Set the draw-order hint.
    pub fn set_z_index(&mut self, z_index: i32) {
        if z_index != self.z_index {
            self.z_index = z_index;
            self.bump();
        }
    }

    /// Place the canvas within its parent, optionally easing over the grid
    /// transition duration. Rejects empty rects.
    pub fn set_area(&mut self, area: Rect, animate: bool, now: f64) -> bool {
        if !area.is_drawable() {
            return false;
        }
        self.area_transition = None;
        let duration = self.transitions.grid_ms;
        if animate && duration > 0.0 && area != self.area {
            self.area_transition = Some(Tween::new(
                self.area,
                area,
                now,
                duration,
                Easing::Ease,
            ));
        } else if area != self.area {
            self.area = area;
            self.bump();
        }
        self.settle_state();
        true
    }

    /// Advance every timeline to `now`. Returns whether any is still live.
    pub(crate) fn tick(&mut self, now: f64) -> bool {
        if self.state == CanvasState::Destroyed {
            return false;
        }
        if let Some(anim) = self.camera {
            let mut view = anim.sample(now);
            if anim.kind() == CameraAnimationKind::Kinetic {
                view = self.clamp_position(&view);
            }
            self.apply_view(view);
            if anim.is_complete(now) {
                self.camera = None;
                self.tickets.settle(anim.ticket(), AnimationStatus::Completed);
                log::debug!("{:?} animation {} completed", anim.kind(), anim.ticket().raw());
            }
        }
        if let Some(fade) = self.fade {
            self.set_opacity_value(fade.tween.sample(now));
            if fade.tween.is_complete(now) {
                self.fade = None;
                self.tickets.settle(fade.ticket, AnimationStatus::Completed);
            }
        }
        if let Some(transition) = self.area_transition {
            let area = transition.sample(now);
            if area != self.area {
                self.area = area;
                self.bump();
            }
            if transition.is_complete(now) {
                self.area_transition = None;
            }
        }
        let animating = self.is_animating();
        if self.state == CanvasState::Animating && !animating {
            self.state = CanvasState::Idle;
        }
        animating
    }

    /// Whether the canvas must be redrawn.
    #[must_use]
    pub fn needs_draw(&self) -> bool {
        self.revision != self.drawn_revision || self.is_animating()
    }

    pub(crate) fn confirm_draw(&mut self) {
        self.drawn_revision = self.revision;
    }

    /// Interrupt every timeline and enter `Destroyed`.
    pub(crate) fn destroy(&mut self) {
        self.interrupt_camera();
        if let Some(fade) = self.fade.take() {
            self.tickets.settle(fade.ticket, AnimationStatus::Interrupted);
        }
        self.area_transition = None;
        self.state = CanvasState::Destroyed;
    }

    /// Settled-ticket history, kept by the viewer after the canvas is gone.
    pub(crate) fn into_tickets(self) -> TicketLog {
        self.tickets
    }
}

/// Center an extent inside `[lo, hi]`, or center it on the range when it
/// is wider than the range.
fn clamp_axis(center: f64, extent: f64, lo: f64, hi: f64) -> f64 {
    if extent >= hi - lo {
        0.5 * (lo + hi)
    } else {
        center.max(lo + 0.5 * extent).min(hi - 0.5 * extent)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::options::Options;

    pub(crate) fn canvas(width: f64, height: f64, projection: Projection) -> Canvas {
        let options = Options::default();
        Canvas::new(
            ImageDescriptor::image(width, height, projection),
            options.camera,
            options.transitions,
        )
    }

    pub(crate) fn laid_out(
        width: f64,
        height: f64,
        projection: Projection,
        region: Rect,
    ) -> Canvas {
        let mut c = canvas(width, height, projection);
        c.set_region(region, Relayout::KeepScale);
        c
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_layout_moves_to_ready_with_fitted_view() {
        let mut c = canvas(2000.0, 1000.0, Projection::Flat);
        assert_eq!(c.state(), CanvasState::Uninitialized);
        c.set_region(Rect::new(0.0, 0.0, 0.0, 0.0), Relayout::KeepScale);
        assert_eq!(c.state(), CanvasState::Uninitialized);
        c.set_region(Rect::new(0.0, 0.0, 800.0, 800.0), Relayout::KeepScale);
        assert_eq!(c.state(), CanvasState::Ready);
        // contain: full width shown, letterboxed vertically
        let v = c.view();
        assert!(close(v.width, 1.0) && close(v.height, 2.0));
        assert!(close(v.center_y, 0.5));
        assert!(c.is_zoomed_out(true) && c.is_zoomed_out(false));
    }

    #[test]
    fn test_cover_limit_fills_region() {
        let mut c = canvas(2000.0, 1000.0, Projection::Flat);
        c.descriptor.cover_limit = true;
        c.set_region(Rect::new(0.0, 0.0, 800.0, 800.0), Relayout::KeepScale);
        let v = c.view();
        assert!(close(v.height, 1.0) && close(v.width, 0.5));
    }

    #[test]
    fn test_zoom_bounds() {
        let c = laid_out(4000.0, 4000.0, Projection::Flat, Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert!(close(c.min_scale(), 0.25));
        assert!(close(c.max_scale(), 1.0));
        assert!(!c.is_zoomed_in());
        let (narrowest, widest) = c.width_bounds();
        assert!(close(narrowest, 0.25) && close(widest, 1.0));
    }

    #[test]
    fn test_limit_rect_strictly_contains_view() {
        let mut c = canvas(1000.0, 1000.0, Projection::Flat);
        c.descriptor.limit = Some(Rect::new(0.2, 0.2, 0.5, 0.5));
        c.descriptor.max_scale = Some(4.0);
        c.set_region(Rect::new(0.0, 0.0, 500.0, 500.0), Relayout::KeepScale);
        let v = c.constrain(&View::new(0.0, 0.9, 0.2, 0.2));
        assert!(close(v.center_x, 0.3) && close(v.center_y, 0.6));
        // fit is relative to the limit rect
        assert!(close(c.view().width, 0.5));
    }

    #[test]
    fn test_free_move_only_keeps_center_on_image() {
        let mut c = canvas(1000.0, 1000.0, Projection::Flat);
        c.descriptor.free_move = true;
        c.set_region(Rect::new(0.0, 0.0, 500.0, 500.0), Relayout::KeepScale);
        let v = c.constrain(&View::new(0.95, -0.3, 0.5, 0.5));
        assert!(close(v.center_x, 0.95) && close(v.center_y, 0.0));
    }

    #[test]
    fn test_spherical_wraps_and_clamps_latitude() {
        let c = laid_out(
            8192.0,
            4096.0,
            Projection::Spherical { true_north: 0.0 },
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        let v = c.constrain(&View::new(1.2, -0.4, 0.2, 0.2));
        assert!(close(v.center_x, 0.2));
        assert!(close(v.center_y, 0.1));
        assert!(close(c.width_bounds().1, 1.0 / 3.0));
    }

    #[test]
    fn test_resize_keeps_center_and_scale() {
        let mut c = laid_out(8000.0, 8000.0, Projection::Flat, Rect::new(0.0, 0.0, 800.0, 800.0));
        c.set_view(&View::new(0.3, 0.4, 0.2, 0.2), &SetViewOptions::default());
        let scale = c.scale();
        c.set_region(Rect::new(0.0, 0.0, 400.0, 600.0), Relayout::KeepScale);
        assert!(scale_approx_eq(c.scale(), scale));
        assert!(close(c.view().center_x, 0.3) && close(c.view().center_y, 0.4));
    }

    #[test]
    fn test_placement_keeps_shown_part() {
        let mut c = laid_out(8000.0, 4000.0, Projection::Flat, Rect::new(0.0, 0.0, 800.0, 400.0));
        let view = View::new(0.3, 0.4, 0.2, 0.2);
        c.set_view(&view, &SetViewOptions::default());
        c.set_region(Rect::new(0.0, 0.0, 400.0, 200.0), Relayout::KeepView);
        assert_eq!(c.view(), view);
        // a narrower cell widens the view vertically only
        c.set_region(Rect::new(0.0, 0.0, 200.0, 200.0), Relayout::KeepView);
        let v = c.view();
        assert!(close(v.center_x, 0.3) && close(v.center_y, 0.4));
        assert!(close(v.width, 0.2) && close(v.height, 0.4));
    }

    #[test]
    fn test_yaw_and_pitch_accessors() {
        let mut c = laid_out(
            8192.0,
            4096.0,
            Projection::Spherical { true_north: 0.5 },
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        assert!(c.set_yaw(1.0));
        assert!(c.yaw().is_some_and(|y| (y - 1.0).abs() < 1e-9));
        assert!(c.set_pitch(0.2));
        assert!(c.pitch().is_some_and(|p| (p - 0.2).abs() < 1e-9));
        assert!(!c.set_yaw(f64::NAN));

        let mut flat = laid_out(100.0, 100.0, Projection::Flat, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(flat.yaw().is_none());
        assert!(!flat.set_pitch(0.1));
    }

    #[test]
    fn test_draw_tracking() {
        let mut c = laid_out(100.0, 100.0, Projection::Flat, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(c.needs_draw());
        c.confirm_draw();
        assert!(!c.needs_draw());
        c.set_z_index(3);
        assert!(c.needs_draw());
        c.confirm_draw();
        c.set_z_index(3);
        assert!(!c.needs_draw());
    }

    #[test]
    fn test_animated_area() {
        let mut c = laid_out(100.0, 100.0, Projection::Flat, Rect::new(0.0, 0.0, 10.0, 10.0));
        let target = Rect::new(0.5, 0.0, 0.5, 1.0);
        assert!(c.set_area(target, true, 0.0));
        assert_eq!(c.state(), CanvasState::Animating);
        assert!(c.tick(100.0));
        assert!(c.area().x > 0.0 && c.area().x < 0.5);
        assert!(!c.tick(10_000.0));
        assert_eq!(c.area(), target);
        assert_eq!(c.state(), CanvasState::Idle);
        assert!(!c.set_area(Rect::new(0.0, 0.0, 0.0, 1.0), false, 0.0));
    }

    #[test]
    fn test_omni_home_and_frame() {
        let c = laid_out(
            1000.0,
            1000.0,
            Projection::Omni(crate::camera::OmniParams::default()),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        );
        assert!(close(c.view().center_x, 0.0));
        assert_eq!(c.omni_frame(), Some((0, 0)));
    }
}
