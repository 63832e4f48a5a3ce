//! Timestamp-driven interpolation between two values.

use crate::camera::Rect;
use crate::util::easing::Easing;
use crate::util::lerp;

/// Values a [`Tween`] can interpolate.
pub trait Interpolate: Copy {
    /// Value at eased progress `t` between `self` (t = 0) and `other`.
    #[must_use]
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        lerp(*self, *other, t)
    }
}

impl Interpolate for Rect {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.lerp(other, t)
    }
}

/// An eased transition from `from` to `to` starting at `start` (ms).
///
/// Progress is always recomputed from absolute elapsed time, so a late or
/// skipped tick lands exactly where an on-time tick would have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    /// Value at the start.
    pub from: T,
    /// Value at the end.
    pub to: T,
    /// Host timestamp of the start, in milliseconds.
    pub start: f64,
    /// Duration in milliseconds (0 completes immediately).
    pub duration: f64,
    /// Easing curve.
    pub easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    /// Tween starting at `start`.
    #[must_use]
    pub fn new(from: T, to: T, start: f64, duration: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            easing,
        }
    }

    /// Normalized progress (0.0 to 1.0).
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the tween has reached its end.
    #[must_use]
    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Interpolated value at `now`; exactly `to` once complete.
    #[must_use]
    pub fn sample(&self, now: f64) -> T {
        let t = self.progress(now);
        if t >= 1.0 {
            self.to
        } else {
            self.from.interpolate(&self.to, self.easing.evaluate(t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_from_absolute_time() {
        let tween = Tween::new(0.0, 1.0, 1000.0, 200.0, Easing::Linear);
        assert_eq!(tween.progress(900.0), 0.0);
        assert_eq!(tween.progress(1100.0), 0.5);
        assert_eq!(tween.progress(5000.0), 1.0);
        assert!(tween.is_complete(1200.0));
    }

    #[test]
    fn test_skipped_ticks_do_not_drift() {
        let tween = Tween::new(0.2, 0.9, 0.0, 300.0, Easing::Ease);
        // sampling at 100 then 150 equals sampling directly at 150
        let _ = tween.sample(100.0);
        assert_eq!(tween.sample(150.0), Tween::new(0.2, 0.9, 0.0, 300.0, Easing::Ease).sample(150.0));
    }

    #[test]
    fn test_zero_and_invalid_durations_complete_immediately() {
        let tween = Tween::new(0.0, 1.0, 50.0, 0.0, Easing::Ease);
        assert_eq!(tween.sample(50.0), 1.0);
        let tween = Tween::new(0.0, 1.0, 50.0, f64::NAN, Easing::Ease);
        assert!(tween.is_complete(50.0));
    }

    #[test]
    fn test_rect_tween() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(0.5, 0.0, 0.5, 1.0);
        let tween = Tween::new(a, b, 0.0, 100.0, Easing::Linear);
        assert_eq!(tween.sample(50.0), Rect::new(0.25, 0.0, 0.75, 1.0));
        assert_eq!(tween.sample(100.0), b);
    }
}
