//! Camera instructions: set_view, fly_to, zoom, go_back and fades.
//!
//! Every instruction takes effect before it returns. A new camera
//! instruction first advances the live camera animation to `now`, then
//! replaces it; the replaced ticket reports `Interrupted`.

use super::{Canvas, CanvasState, FlyToOptions, SetViewOptions, ZoomOptions};
use crate::animation::{
    AnimationStatus, AnimationTicket, CameraAnimation, CameraAnimationKind, Fade, Tween,
};
use crate::camera::{Projection, View};
use crate::util::easing::Easing;
use crate::util::wrapped_delta;

/// Below this travel a fly with derived duration snaps.
const MIN_TRAVEL: f64 = 1e-9;

impl Canvas {
    /// Bring the view up to date with the live camera animation.
    pub(super) fn sync_camera(&mut self, now: f64) {
        if let Some(anim) = self.camera {
            let mut view = anim.sample(now);
            if anim.kind() == CameraAnimationKind::Kinetic {
                view = self.clamp_position(&view);
            }
            self.apply_view(view);
        }
    }

    /// Drop the live camera animation, reporting it interrupted.
    pub(super) fn interrupt_camera(&mut self) {
        if let Some(anim) = self.camera.take() {
            self.tickets.settle(anim.ticket(), AnimationStatus::Interrupted);
            log::debug!(
                "{:?} animation {} superseded",
                anim.kind(),
                anim.ticket().raw()
            );
        }
    }

    /// Install a camera animation, or apply it at once when it has no
    /// duration or the canvas is not laid out yet.
    pub(super) fn launch(&mut self, anim: CameraAnimation) -> AnimationTicket {
        self.interrupt_camera();
        let ticket = anim.ticket();
        if anim.duration() <= 0.0 || !self.is_laid_out() {
            self.apply_view(anim.target());
            self.tickets.settle(ticket, AnimationStatus::Completed);
        } else {
            log::debug!(
                "{:?} animation {} started ({:.0} ms)",
                anim.kind(),
                ticket.raw(),
                anim.duration()
            );
            self.camera = Some(anim);
        }
        self.settle_state();
        ticket
    }

    fn record_last_view(&mut self) {
        self.last_view = Some(self.view);
    }

    pub(super) fn horizontal_delta(&self, from: f64, to: f64) -> f64 {
        if self.descriptor.projection.wraps_horizontally() {
            wrapped_delta(from, to)
        } else {
            to - from
        }
    }

    /// Jump immediately to `view`.
    pub fn set_view(&mut self, view: &View, options: &SetViewOptions) {
        self.interrupt_camera();
        let normalized = self.normalize(view);
        let next = if options.no_limit {
            normalized
        } else {
            self.constrain(&normalized)
        };
        if !options.no_last_view {
            self.record_last_view();
        }
        self.has_explicit_view = true;
        self.apply_view(next);
        self.settle_state();
    }

    /// Restore the view recorded before the last navigation.
    pub fn go_back(&mut self) -> bool {
        let Some(previous) = self.last_view.take() else {
            return false;
        };
        self.interrupt_camera();
        let next = self.constrain(&self.normalize(&previous));
        self.apply_view(next);
        self.settle_state();
        true
    }

    /// Milliseconds a fly from `from` to `to` takes at `speed`.
    ///
    /// Travel counts panned view widths plus zoom doublings.
    #[must_use]
    pub fn fly_duration(&self, from: &View, to: &View, speed: f64) -> f64 {
        let dx = self.horizontal_delta(from.center_x, to.center_x);
        let dy = to.center_y - from.center_y;
        let span = from.width.max(to.width);
        let travel = dx.hypot(dy) / span + (to.width / from.width).log2().abs();
        if travel.is_nan() || travel <= MIN_TRAVEL {
            return 0.0;
        }
        let opts = &self.camera_options;
        let speed = (speed * self.descriptor.camera_speed * opts.speed).max(f64::EPSILON);
        (opts.fly_ms_per_unit * travel / speed)
            .max(opts.fly_min_ms)
            .min(opts.fly_max_ms)
    }

    /// Animate to `target`.
    ///
    /// The target position is always kept within limits; its scale is
    /// clamped only with `limit_zoom`, which also bounds every frame.
    pub fn fly_to(&mut self, target: &View, options: &FlyToOptions, now: f64) -> AnimationTicket {
        self.sync_camera(now);
        self.interrupt_camera();
        let normalized = self.normalize(target);
        let to = if options.limit_zoom {
            self.constrain(&normalized)
        } else {
            self.clamp_position(&normalized)
        };
        let from = self.view;
        let duration = options
            .duration
            .unwrap_or_else(|| self.fly_duration(&from, &to, options.speed));
        let (narrowest, widest) = self.width_bounds();

        let ticket = self.tickets.issue();
        let mut anim = CameraAnimation::path(
            CameraAnimationKind::Fly,
            ticket,
            from,
            to,
            now,
            duration,
            options.easing,
        )
        .wrapping(self.descriptor.projection.wraps_horizontally());
        if options.is_jump {
            let span = from.width.max(to.width);
            let dx = self.horizontal_delta(from.center_x, to.center_x);
            let apex = (span + dx.hypot(to.center_y - from.center_y)).min(widest.max(span));
            anim = anim.jumping(apex);
        }
        if options.limit_zoom {
            anim = anim.limited_to(Some(narrowest));
        }
        self.record_last_view();
        self.has_explicit_view = true;
        self.launch(anim)
    }

    /// View after zooming `base` by `delta` doublings around a screen point.
    ///
    /// The image point under the focus stays put (omni zooms about the
    /// center since its horizontal axis is a rotation).
    pub(super) fn zoom_target(&self, base: &View, delta: f64, focus_x: f64, focus_y: f64) -> View {
        let g = self.geometry();
        let delta = if delta.is_finite() { delta } else { 0.0 };
        let (narrowest, widest) = self.width_bounds();
        let width = g
            .width_for_scale(g.scale(base) * delta.exp2())
            .max(narrowest)
            .min(widest);
        let ratio = width / base.width;
        let mut view = View::new(base.center_x, base.center_y, width, g.height_for_width(width));
        let has_focus = focus_x.is_finite() && focus_y.is_finite();
        if has_focus && !matches!(self.descriptor.projection, Projection::Omni(_)) {
            let p = g.unproject(base, focus_x, focus_y, true);
            let dx = self.horizontal_delta(base.center_x, p.x);
            view.center_x = base.center_x + dx * (1.0 - ratio);
            view.center_y = base.center_y + (p.y - base.center_y) * (1.0 - ratio);
        }
        self.clamp_position(&self.normalize(&view))
    }

    /// Zoom by `delta` doublings around a screen focus point.
    ///
    /// A zoom issued while another zoom runs starts from that zoom's
    /// target, so wheel bursts accumulate.
    pub fn zoom(
        &mut self,
        delta: f64,
        focus_x: f64,
        focus_y: f64,
        options: &ZoomOptions,
        now: f64,
    ) -> AnimationTicket {
        self.sync_camera(now);
        let base = match self.camera {
            Some(anim) if anim.kind() == CameraAnimationKind::Zoom => anim.target(),
            _ => self.view,
        };
        let target = self.zoom_target(&base, delta, focus_x, focus_y);
        self.interrupt_camera();
        let duration = options
            .duration
            .unwrap_or(self.camera_options.zoom_duration_ms);
        let ticket = self.tickets.issue();
        let anim = CameraAnimation::path(
            CameraAnimationKind::Zoom,
            ticket,
            self.view,
            target,
            now,
            duration,
            options.easing,
        )
        .wrapping(self.descriptor.projection.wraps_horizontally());
        self.launch(anim)
    }

    /// Ease opacity to `target`, or snap with `direct`.
    pub fn fade_to(&mut self, target: f64, direct: bool, now: f64) -> AnimationTicket {
        if let Some(fade) = self.fade.take() {
            self.set_opacity_value(fade.tween.sample(now));
            let status = if fade.tween.is_complete(now) {
                AnimationStatus::Completed
            } else {
                AnimationStatus::Interrupted
            };
            self.tickets.settle(fade.ticket, status);
        }
        let target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            self.opacity
        };
        let duration = self.fade_duration();
        let ticket = if direct || duration <= 0.0 || target == self.opacity {
            self.set_opacity_value(target);
            self.tickets.issue_completed()
        } else {
            let ticket = self.tickets.issue();
            self.fade = Some(Fade {
                ticket,
                tween: Tween::new(self.opacity, target, now, duration, Easing::Ease),
            });
            ticket
        };
        self.settle_state();
        ticket
    }

    /// Fade to fully opaque.
    pub fn fade_in(&mut self, direct: bool, now: f64) -> AnimationTicket {
        self.fade_to(1.0, direct, now)
    }

    /// Fade to fully transparent.
    pub fn fade_out(&mut self, direct: bool, now: f64) -> AnimationTicket {
        self.fade_to(0.0, direct, now)
    }

    /// Whether the canvas is `Idle` or `Ready` with nothing running.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        matches!(self.state, CanvasState::Ready | CanvasState::Idle)
    }
}
