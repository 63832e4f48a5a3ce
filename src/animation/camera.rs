//! Camera timeline: fly, zoom and kinetic-pan motions.
//!
//! A canvas owns at most one [`CameraAnimation`]. All three kinds are
//! sampled purely from the host timestamp, so they can be replaced at any
//! tick without leftover state.

use glam::DVec2;

use super::ticket::AnimationTicket;
use crate::camera::View;
use crate::util::easing::Easing;
use crate::util::{lerp, wrap_unit, wrapped_delta};

/// What started a camera animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAnimationKind {
    /// `fly_to` and animated `set_area` follow-ups.
    Fly,
    /// Wheel or button zoom around a focus point.
    Zoom,
    /// Inertial glide after a pan release.
    Kinetic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Path {
        from: View,
        to: View,
        /// Extra log-width added at the middle of the path.
        bump: f64,
        min_width: Option<f64>,
    },
    Kinetic {
        origin: View,
        /// View units per millisecond.
        velocity: DVec2,
        time_constant: f64,
    },
}

/// One live camera animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    kind: CameraAnimationKind,
    ticket: AnimationTicket,
    start: f64,
    duration: f64,
    easing: Easing,
    wraps: bool,
    motion: Motion,
}

impl CameraAnimation {
    /// Eased path from `from` to `to`.
    ///
    /// Centers move linearly, sizes move in log space so zooming feels
    /// uniform at every scale.
    #[must_use]
    pub fn path(
        kind: CameraAnimationKind,
        ticket: AnimationTicket,
        from: View,
        to: View,
        start: f64,
        duration: f64,
        easing: Easing,
    ) -> Self {
        Self {
            kind,
            ticket,
            start,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            easing,
            wraps: false,
            motion: Motion::Path {
                from,
                to,
                bump: 0.0,
                min_width: None,
            },
        }
    }

    /// Exponentially decaying glide from `origin`.
    ///
    /// The glide ends once speed drops below `stop_speed` (view units per
    /// millisecond); a slower release yields a zero-length animation.
    #[must_use]
    pub fn kinetic(
        ticket: AnimationTicket,
        origin: View,
        velocity: DVec2,
        start: f64,
        time_constant: f64,
        stop_speed: f64,
    ) -> Self {
        let time_constant = time_constant.max(1.0);
        let speed = velocity.length();
        let duration = if speed.is_finite() && speed > stop_speed && stop_speed > 0.0 {
            time_constant * (speed / stop_speed).ln()
        } else {
            0.0
        };
        let velocity = if speed.is_finite() { velocity } else { DVec2::ZERO };
        Self {
            kind: CameraAnimationKind::Kinetic,
            ticket,
            start,
            duration,
            easing: Easing::Linear,
            wraps: false,
            motion: Motion::Kinetic {
                origin,
                velocity,
                time_constant,
            },
        }
    }

    /// Treat horizontal coordinates as periodic (360 and omni).
    #[must_use]
    pub fn wrapping(mut self, wraps: bool) -> Self {
        self.wraps = wraps;
        self
    }

    /// Zoom out toward `apex_width` halfway through, then back in.
    #[must_use]
    pub fn jumping(mut self, apex_width: f64) -> Self {
        if let Motion::Path { from, to, bump, .. } = &mut self.motion {
            let mid = 0.5 * (from.width.ln() + to.width.ln());
            *bump = (apex_width.ln() - mid).max(0.0);
        }
        self
    }

    /// Never let the sampled width fall below `min_width`.
    #[must_use]
    pub fn limited_to(mut self, min: Option<f64>) -> Self {
        if let Motion::Path { min_width, .. } = &mut self.motion {
            *min_width = min;
        }
        self
    }

    /// Kind tag.
    #[must_use]
    pub fn kind(&self) -> CameraAnimationKind {
        self.kind
    }

    /// Ticket reported to the host.
    #[must_use]
    pub fn ticket(&self) -> AnimationTicket {
        self.ticket
    }

    /// Duration in milliseconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Normalized progress (0.0 to 1.0).
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the animation has reached its end.
    #[must_use]
    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// View the animation settles on.
    #[must_use]
    pub fn target(&self) -> View {
        self.sample_at(1.0)
    }

    /// View at host time `now`.
    #[must_use]
    pub fn sample(&self, now: f64) -> View {
        self.sample_at(self.progress(now))
    }

    fn sample_at(&self, t: f64) -> View {
        match self.motion {
            Motion::Path {
                from,
                to,
                bump,
                min_width,
            } => {
                if t >= 1.0 {
                    return to;
                }
                let e = self.easing.evaluate(t);
                let dx = if self.wraps {
                    wrapped_delta(from.center_x, to.center_x)
                } else {
                    to.center_x - from.center_x
                };
                let mut center_x = from.center_x + dx * e;
                if self.wraps {
                    center_x = wrap_unit(center_x);
                }
                let mut width = (lerp(from.width.ln(), to.width.ln(), e)
                    + 4.0 * e * (1.0 - e) * bump)
                    .exp();
                if let Some(min) = min_width {
                    width = width.max(min);
                }
                let ratio = lerp(from.height / from.width, to.height / to.width, e);
                View::new(
                    center_x,
                    lerp(from.center_y, to.center_y, e),
                    width,
                    width * ratio,
                )
            }
            Motion::Kinetic {
                origin,
                velocity,
                time_constant,
            } => {
                let elapsed = t * self.duration;
                let travel =
                    velocity * time_constant * (1.0 - (-elapsed / time_constant).exp());
                let mut center_x = origin.center_x + travel.x;
                if self.wraps {
                    center_x = wrap_unit(center_x);
                }
                View {
                    center_x,
                    center_y: origin.center_y + travel.y,
                    ..origin
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fly(from: View, to: View) -> CameraAnimation {
        CameraAnimation::path(
            CameraAnimationKind::Fly,
            AnimationTicket(1),
            from,
            to,
            100.0,
            400.0,
            Easing::Linear,
        )
    }

    #[test]
    fn test_path_endpoints_are_exact() {
        let from = View::new(0.2, 0.3, 0.5, 0.5);
        let to = View::new(0.7, 0.6, 0.1, 0.1);
        let anim = fly(from, to);
        assert_eq!(anim.sample(0.0), from);
        assert_eq!(anim.sample(500.0), to);
        assert_eq!(anim.target(), to);
        assert!(anim.is_complete(500.0));
        assert!(!anim.is_complete(499.0));
    }

    #[test]
    fn test_width_moves_in_log_space() {
        let anim = fly(View::new(0.5, 0.5, 1.0, 1.0), View::new(0.5, 0.5, 0.25, 0.25));
        let mid = anim.sample(300.0);
        assert!((mid.width - 0.5).abs() < 1e-12);
        assert!((mid.height - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wrapping_takes_shortest_path() {
        let anim = fly(View::new(0.9, 0.5, 0.2, 0.1), View::new(0.1, 0.5, 0.2, 0.1))
            .wrapping(true);
        let mid = anim.sample(300.0);
        assert!(mid.center_x.abs() < 1e-12 || (mid.center_x - 1.0).abs() < 1e-12);
        let quarter = anim.sample(200.0);
        assert!((quarter.center_x - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_jump_zooms_out_midway() {
        let from = View::new(0.1, 0.5, 0.1, 0.1);
        let to = View::new(0.9, 0.5, 0.1, 0.1);
        let anim = fly(from, to).jumping(0.8);
        let mid = anim.sample(300.0);
        assert!((mid.width - 0.8).abs() < 1e-9);
        assert_eq!(anim.sample(500.0), to);
    }

    #[test]
    fn test_limited_width_never_undershoots() {
        let anim = fly(View::new(0.5, 0.5, 1.0, 1.0), View::new(0.5, 0.5, 0.01, 0.01))
            .limited_to(Some(0.2));
        for step in 0..40 {
            let v = anim.sample(100.0 + f64::from(step) * 10.0);
            assert!(v.width >= 0.2 - 1e-12);
        }
    }

    #[test]
    fn test_kinetic_glide_decays_and_stops() {
        let origin = View::new(0.5, 0.5, 0.2, 0.2);
        let anim = CameraAnimation::kinetic(
            AnimationTicket(3),
            origin,
            DVec2::new(0.001, 0.0),
            0.0,
            325.0,
            0.0001,
        );
        assert!(anim.duration() > 0.0);
        let early = anim.sample(100.0).center_x - 0.5;
        let late = anim.sample(200.0).center_x - 0.5;
        // second 100 ms covers less ground than the first
        assert!(late - early < early);
        let end = anim.target();
        assert!(end.center_x < 0.5 + 0.001 * 325.0);
        assert_eq!(anim.sample(1e9), end);
    }

    #[test]
    fn test_slow_release_has_no_glide() {
        let anim = CameraAnimation::kinetic(
            AnimationTicket(1),
            View::FULL,
            DVec2::new(1e-6, 0.0),
            0.0,
            325.0,
            1e-4,
        );
        assert_eq!(anim.duration(), 0.0);
        assert!(anim.is_complete(0.0));
        assert_eq!(anim.target(), View::FULL);
    }
}
