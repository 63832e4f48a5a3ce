//! Pointer gestures: drag panning with kinetic release, and two-finger
//! pinch.

use std::collections::VecDeque;

use glam::DVec2;

use super::{Canvas, PanOptions};
use crate::animation::{AnimationTicket, CameraAnimation};

/// Shortest span a release velocity is averaged over.
const MIN_SAMPLE_SPAN_MS: f64 = 16.0;

#[derive(Debug, Clone, Copy)]
struct PanSample {
    at: f64,
    delta: DVec2,
}

#[derive(Debug, Clone, Copy)]
struct PinchAnchor {
    centroid: DVec2,
    distance: f64,
}

/// Recent drag samples and the previous pinch reading.
#[derive(Debug, Default)]
pub(crate) struct GestureState {
    samples: VecDeque<PanSample>,
    pinch: Option<PinchAnchor>,
}

impl GestureState {
    fn prune(&mut self, now: f64, window: f64) {
        while self
            .samples
            .front()
            .is_some_and(|s| now - s.at > window)
        {
            let _ = self.samples.pop_front();
        }
    }

    /// Average drag velocity in screen pixels per ms over the window.
    fn velocity(&mut self, now: f64, window: f64) -> Option<DVec2> {
        self.prune(now, window);
        let oldest = self.samples.front()?.at;
        let total = self
            .samples
            .iter()
            .fold(DVec2::ZERO, |acc, s| acc + s.delta);
        let span = (now - oldest).max(MIN_SAMPLE_SPAN_MS);
        Some(total / span)
    }
}

impl Canvas {
    /// Drag the content by a screen-pixel delta.
    pub fn pan(&mut self, dx: f64, dy: f64, options: &PanOptions, now: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.sync_camera(now);
        self.interrupt_camera();
        let moved = self.geometry().pan_view(&self.view, dx, dy);
        let next = if options.no_limit {
            moved
        } else {
            self.clamp_position(&moved)
        };
        self.apply_view(next);
        if !options.no_kinetic {
            let window = self.camera_options.pan_velocity_window_ms;
            self.gesture.samples.push_back(PanSample {
                at: now,
                delta: DVec2::new(dx, dy),
            });
            self.gesture.prune(now, window);
        }
        self.settle_state();
    }

    /// End a drag. With `kinetic`, glide on with the recent drag velocity
    /// scaled by the elasticity constant.
    pub fn release_pan(&mut self, kinetic: bool, now: f64) -> AnimationTicket {
        self.sync_camera(now);
        let opts = self.camera_options.clone();
        let velocity = self
            .gesture
            .velocity(now, opts.pan_velocity_window_ms)
            .map(|v| v * opts.elasticity);
        self.gesture.samples.clear();

        let ticket = self.tickets.issue();
        let glide = match velocity {
            Some(px) if kinetic && px.length() > opts.kinetic_min_speed => {
                // Convert one millisecond of screen motion to view units.
                let moved = self.geometry().pan_view(&self.view, px.x, px.y);
                let per_ms = DVec2::new(
                    self.horizontal_delta(self.view.center_x, moved.center_x),
                    moved.center_y - self.view.center_y,
                );
                let stop = per_ms.length() * opts.kinetic_min_speed / px.length();
                CameraAnimation::kinetic(
                    ticket,
                    self.view,
                    per_ms,
                    now,
                    opts.kinetic_time_constant_ms,
                    stop,
                )
            }
            _ => CameraAnimation::kinetic(ticket, self.view, DVec2::ZERO, now, 1.0, 1.0),
        };
        self.launch(glide.wrapping(self.descriptor.projection.wraps_horizontally()))
    }

    /// Track a two-finger gesture: the centroid pans, the finger distance
    /// zooms around the centroid.
    pub fn pinch(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, now: f64) {
        let a = DVec2::new(x0, y0);
        let b = DVec2::new(x1, y1);
        if !a.is_finite() || !b.is_finite() {
            return;
        }
        let centroid = (a + b) * 0.5;
        let distance = a.distance(b);
        self.sync_camera(now);
        self.interrupt_camera();
        if let Some(previous) = self.gesture.pinch {
            let shift = centroid - previous.centroid;
            let panned = self.geometry().pan_view(&self.view, shift.x, shift.y);
            let mut next = self.clamp_position(&panned);
            if previous.distance > f64::EPSILON
                && distance > f64::EPSILON
                && (distance - previous.distance).abs() > f64::EPSILON
            {
                let delta = (distance / previous.distance).log2();
                next = self.zoom_target(&next, delta, centroid.x, centroid.y);
            }
            self.apply_view(next);
        }
        self.gesture.pinch = Some(PinchAnchor { centroid, distance });
        self.settle_state();
    }

    /// Forget the pinch anchor.
    pub fn end_pinch(&mut self) {
        self.gesture.pinch = None;
    }
}

#[cfg(test)]
mod tests {
    use crate::animation::{AnimationStatus, CameraAnimationKind};
    use crate::camera::{Projection, Rect, View};
    use crate::canvas::tests::laid_out;
    use crate::canvas::{CanvasState, PanOptions, SetViewOptions};
    use crate::util::scale_approx_eq;

    fn zoomed_flat() -> crate::canvas::Canvas {
        let mut c = laid_out(4096.0, 4096.0, Projection::Flat, Rect::new(0.0, 0.0, 512.0, 512.0));
        c.set_view(&View::new(0.5, 0.5, 0.25, 0.25), &SetViewOptions::default());
        c
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut c = zoomed_flat();
        // dragging right by a quarter region moves the center left
        c.pan(128.0, 0.0, &PanOptions::default(), 0.0);
        assert!((c.view().center_x - (0.5 - 0.0625)).abs() < 1e-12);
        // pans stop at the image edge
        c.pan(100_000.0, 0.0, &PanOptions::default(), 10.0);
        assert!((c.view().center_x - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_release_starts_kinetic_glide() {
        let mut c = zoomed_flat();
        for i in 0..5 {
            c.pan(-20.0, 0.0, &PanOptions::default(), f64::from(i) * 16.0);
        }
        let before = c.view().center_x;
        let ticket = c.release_pan(true, 64.0);
        assert_eq!(c.camera_animation(), Some(CameraAnimationKind::Kinetic));
        assert_eq!(c.status(ticket), AnimationStatus::Pending);
        let _ = c.tick(164.0);
        let mid = c.view().center_x;
        assert!(mid > before);
        let _ = c.tick(100_000.0);
        assert!(c.view().center_x >= mid);
        assert_eq!(c.status(ticket), AnimationStatus::Completed);
        assert_eq!(c.state(), CanvasState::Idle);
    }

    #[test]
    fn test_release_without_motion_completes_immediately() {
        let mut c = zoomed_flat();
        c.pan(5.0, 0.0, &PanOptions::default(), 0.0);
        // samples fall out of the velocity window
        let ticket = c.release_pan(true, 10_000.0);
        assert_eq!(c.status(ticket), AnimationStatus::Completed);
        assert!(c.camera_animation().is_none());

        c.pan(-50.0, 0.0, &PanOptions::default(), 20_000.0);
        let ticket = c.release_pan(false, 20_016.0);
        assert_eq!(c.status(ticket), AnimationStatus::Completed);
    }

    #[test]
    fn test_pinch_spread_zooms_in_around_centroid() {
        let mut c = zoomed_flat();
        let scale = c.scale();
        let anchor = c.unproject(256.0, 256.0, false);
        c.pinch(206.0, 256.0, 306.0, 256.0, 0.0);
        c.pinch(156.0, 256.0, 356.0, 256.0, 16.0);
        assert!(scale_approx_eq(c.scale(), scale * 2.0));
        let still = c.unproject(256.0, 256.0, false);
        assert!((still - anchor).length() < 1e-9);
        c.end_pinch();
        // a fresh pinch only records its anchor
        c.pinch(0.0, 0.0, 10.0, 10.0, 32.0);
        assert!(scale_approx_eq(c.scale(), scale * 2.0));
    }

    #[test]
    fn test_pinch_centroid_pans() {
        let mut c = zoomed_flat();
        c.pinch(200.0, 200.0, 300.0, 300.0, 0.0);
        c.pinch(200.0, 264.0, 300.0, 364.0, 16.0);
        // content dragged down by 64 px at 0.5 scale
        assert!((c.view().center_y - (0.5 - 64.0 / 512.0 * 0.25)).abs() < 1e-12);
    }
}
