//! Easing curves for camera and opacity animations.
//!
//! The named variants match the CSS timing keywords so hosts that mix
//! CSS transitions with engine-driven animation get identical motion.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Easing function variants for animation curves.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// CSS `ease`: cubic-bezier(0.25, 0.1, 0.25, 1.0).
    #[default]
    Ease,
    /// CSS `ease-in`: cubic-bezier(0.42, 0.0, 1.0, 1.0).
    EaseIn,
    /// CSS `ease-out`: cubic-bezier(0.0, 0.0, 0.58, 1.0).
    EaseOut,
    /// Linear interpolation (no easing).
    Linear,
    /// Arbitrary cubic bezier with control points (x1, y1) and (x2, y2).
    CubicBezier {
        /// First control point x (clamped to [0, 1]).
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x (clamped to [0, 1]).
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
}

impl Easing {
    /// Decode the boundary representation: 0 ease, 1 ease-in, 2 ease-out,
    /// 3 linear. Anything else falls back to [`Easing::Ease`].
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::EaseIn,
            2 => Self::EaseOut,
            3 => Self::Linear,
            _ => Self::Ease,
        }
    }

    /// Evaluate the easing function at normalized progress `t`.
    ///
    /// Input is clamped to [0.0, 1.0]; the endpoints map exactly to 0 and 1.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match *self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => {
                cubic_bezier(x1.clamp(0.0, 1.0), y1, x2.clamp(0.0, 1.0), y2, t)
            }
        }
    }
}

/// One coordinate of a cubic bezier with endpoints fixed at 0 and 1.
#[inline]
fn bezier_axis(p1: f64, p2: f64, s: f64) -> f64 {
    let oms = 1.0 - s;
    3.0 * p1 * s * oms * oms + 3.0 * p2 * oms * s * s + s * s * s
}

#[inline]
fn bezier_axis_slope(p1: f64, p2: f64, s: f64) -> f64 {
    let oms = 1.0 - s;
    3.0 * p1 * oms * oms + 6.0 * (p2 - p1) * s * oms + 3.0 * (1.0 - p2) * s * s
}

/// Solve the curve's x(s) = x for s, then return y(s).
///
/// Newton iterations first; bisection when the slope is too flat.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    let mut s = x;
    for _ in 0..8 {
        let err = bezier_axis(x1, x2, s) - x;
        if err.abs() < 1e-9 {
            return bezier_axis(y1, y2, s);
        }
        let slope = bezier_axis_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    s = x;
    for _ in 0..64 {
        let v = bezier_axis(x1, x2, s);
        if (v - x).abs() < 1e-9 {
            break;
        }
        if v < x {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    bezier_axis(y1, y2, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] =
        [Easing::Ease, Easing::EaseIn, Easing::EaseOut, Easing::Linear];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.evaluate(0.0), 0.0);
            assert_eq!(easing.evaluate(1.0), 1.0);
        }
    }

    #[test]
    fn test_input_clamping() {
        for easing in ALL {
            assert_eq!(easing.evaluate(-0.5), 0.0);
            assert_eq!(easing.evaluate(1.5), 1.0);
        }
    }

    #[test]
    fn test_linear_is_identity() {
        assert_eq!(Easing::Linear.evaluate(0.25), 0.25);
        assert_eq!(Easing::Linear.evaluate(0.5), 0.5);
    }

    #[test]
    fn test_ease_in_and_out_shapes() {
        // ease-in lags behind linear, ease-out runs ahead of it
        assert!(Easing::EaseIn.evaluate(0.25) < 0.25);
        assert!(Easing::EaseOut.evaluate(0.25) > 0.25);
        // CSS `ease` is well ahead at the midpoint (~0.80)
        let mid = Easing::Ease.evaluate(0.5);
        assert!((mid - 0.8024).abs() < 1e-3, "ease(0.5) = {mid}");
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = easing.evaluate(f64::from(i) / 100.0);
                assert!(v + 1e-12 >= prev, "{easing:?} not monotonic at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_custom_bezier_matches_named_curve() {
        let custom = Easing::CubicBezier {
            x1: 0.42,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        };
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            assert!((custom.evaluate(t) - Easing::EaseIn.evaluate(t)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Easing::from_code(0), Easing::Ease);
        assert_eq!(Easing::from_code(1), Easing::EaseIn);
        assert_eq!(Easing::from_code(2), Easing::EaseOut);
        assert_eq!(Easing::from_code(3), Easing::Linear);
        assert_eq!(Easing::default(), Easing::Ease);
    }
}
