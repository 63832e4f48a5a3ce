//! Shared numeric helpers and easing curves.

pub mod easing;

/// Tolerance used for scale-bound comparisons.
pub const SCALE_EPSILON: f64 = 1e-6;

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wrap a value into [0, 1).
#[inline]
#[must_use]
pub fn wrap_unit(v: f64) -> f64 {
    let w = v.rem_euclid(1.0);
    // rem_euclid can return exactly 1.0 for tiny negative inputs
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// Signed shortest distance from `from` to `to` on the unit circle,
/// in [-0.5, 0.5).
#[inline]
#[must_use]
pub fn wrapped_delta(from: f64, to: f64) -> f64 {
    (to - from + 0.5).rem_euclid(1.0) - 0.5
}

/// Relative comparison for positive scales.
#[inline]
#[must_use]
pub fn scale_approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= SCALE_EPSILON * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unit_handles_negatives() {
        assert!((wrap_unit(-0.25) - 0.75).abs() < 1e-12);
        assert!((wrap_unit(1.25) - 0.25).abs() < 1e-12);
        assert!(wrap_unit(-1e-18) < 1.0);
    }

    #[test]
    fn wrapped_delta_takes_short_way() {
        assert!((wrapped_delta(0.9, 0.1) - 0.2).abs() < 1e-12);
        assert!((wrapped_delta(0.1, 0.9) + 0.2).abs() < 1e-12);
        assert!((wrapped_delta(0.2, 0.4) - 0.2).abs() < 1e-12);
    }
}
