//! Normalized rectangles and the per-canvas [`View`].

use serde::{Deserialize, Serialize};

use crate::util::{lerp, wrap_unit};

/// Smallest view extent kept after sanitizing malformed input.
pub const MIN_VIEW_EXTENT: f64 = 1e-6;

/// Axis-aligned rectangle with a top-left origin.
///
/// Used both for normalized image-space rectangles and for screen regions
/// in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width (never negative for well-formed rects).
    pub width: f64,
    /// Height (never negative for well-formed rects).
    pub height: f64,
}

impl Rect {
    /// The unit square `[0,1]²`.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Rect from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect from its edges.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + 0.5 * self.width
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + 0.5 * self.height
    }

    /// Area (zero for degenerate rects).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Whether the rect has a positive, finite area.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Overlapping part of two rects, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (right > left && bottom > top)
            .then(|| Self::from_edges(left, top, right, bottom))
    }

    /// Map a normalized sub-rect (`area`) into this rect.
    ///
    /// This is how a child's area rect is placed inside its parent region.
    #[must_use]
    pub fn sub_rect(&self, area: &Self) -> Self {
        Self::new(
            self.x + area.x * self.width,
            self.y + area.y * self.height,
            area.width * self.width,
            area.height * self.height,
        )
    }

    /// Component-wise interpolation.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.width, other.width, t),
            lerp(self.height, other.height, t),
        )
    }
}

/// The camera state of one canvas: a normalized center and extent.
///
/// For flat images the coordinates are fractions of the image width and
/// height. For 360 images they are fractions of longitude (wrapping) and
/// latitude (clamped). For omni objects `center_x` is the rotation, as a
/// fraction of a full turn, `center_y` the vertical position across the
/// capture layers, and `width` the visible fraction of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Horizontal center.
    pub center_x: f64,
    /// Vertical center.
    pub center_y: f64,
    /// Horizontal extent (> 0).
    pub width: f64,
    /// Vertical extent (> 0).
    pub height: f64,
}

impl Default for View {
    fn default() -> Self {
        Self::FULL
    }
}

impl View {
    /// The whole image.
    pub const FULL: Self = Self::new(0.5, 0.5, 1.0, 1.0);

    /// View from its center and size.
    #[must_use]
    pub const fn new(
        center_x: f64,
        center_y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
        }
    }

    /// Top-left based bounds (may extend past [0,1]).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center_x - 0.5 * self.width,
            self.center_y - 0.5 * self.height,
            self.width,
            self.height,
        )
    }

    /// Fixed-layout form used at the handle boundary.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.center_x, self.center_y, self.width, self.height]
    }

    /// Whether every component is finite and the extent is positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center_x.is_finite()
            && self.center_y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Replace malformed components with the fallback's.
    ///
    /// Non-finite centers take the fallback center; non-positive or
    /// non-finite extents take the fallback extent. The result is always
    /// drawable.
    #[must_use]
    pub fn sanitized(&self, fallback: &Self) -> Self {
        let pick = |v: f64, fb: f64| if v.is_finite() { v } else { fb };
        let extent = |v: f64, fb: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else if fb.is_finite() && fb > 0.0 {
                fb
            } else {
                1.0
            }
        };
        Self {
            center_x: pick(self.center_x, fallback.center_x),
            center_y: pick(self.center_y, fallback.center_y),
            width: extent(self.width, fallback.width)
                .max(MIN_VIEW_EXTENT),
            height: extent(self.height, fallback.height)
                .max(MIN_VIEW_EXTENT),
        }
    }

    /// Split a longitude-wrapping view into non-wrapping rectangles.
    ///
    /// A view whose horizontal span crosses the 0/1 seam yields two
    /// rectangles, `[x0 + 1, 1]` and `[0, x1]` when the left edge is
    /// negative, or `[x0, 1]` and `[0, x1 - 1]` when the right edge exceeds
    /// one; their widths sum to the view width. Latitude is clamped to
    /// [0,1], never wrapped. Views spanning a full turn or more yield one
    /// rectangle covering every longitude.
    #[must_use]
    pub fn split_wrapped(&self) -> Vec<Rect> {
        let top = (self.center_y - 0.5 * self.height).clamp(0.0, 1.0);
        let bottom = (self.center_y + 0.5 * self.height).clamp(0.0, 1.0);
        if self.width >= 1.0 {
            return vec![Rect::from_edges(0.0, top, 1.0, bottom)];
        }

        // Bring the center into [0,1) so at most one seam is crossed.
        let center = wrap_unit(self.center_x);
        let x0 = center - 0.5 * self.width;
        let x1 = center + 0.5 * self.width;
        if x0 < 0.0 {
            vec![
                Rect::from_edges(x0 + 1.0, top, 1.0, bottom),
                Rect::from_edges(0.0, top, x1, bottom),
            ]
        } else if x1 > 1.0 {
            vec![
                Rect::from_edges(x0, top, 1.0, bottom),
                Rect::from_edges(0.0, top, x1 - 1.0, bottom),
            ]
        } else {
            vec![Rect::from_edges(x0, top, x1, bottom)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_split_across_right_seam() {
        let view = View::new(0.95, 0.5, 0.2, 0.4);
        let parts = view.split_wrapped();
        assert_eq!(parts.len(), 2);
        assert!(close(parts[0].x, 0.85) && close(parts[0].right(), 1.0));
        assert!(close(parts[1].x, 0.0) && close(parts[1].right(), 0.05));
        assert!(close(parts[0].width + parts[1].width, 0.2));
    }

    #[test]
    fn test_split_across_left_seam() {
        let view = View::new(0.05, 0.5, 0.3, 0.4);
        let parts = view.split_wrapped();
        assert_eq!(parts.len(), 2);
        assert!(close(parts[0].x, 0.9) && close(parts[0].right(), 1.0));
        assert!(close(parts[1].x, 0.0) && close(parts[1].right(), 0.2));
        assert!(close(parts[0].width + parts[1].width, 0.3));
    }

    #[test]
    fn test_split_clamps_latitude() {
        let view = View::new(0.5, 0.1, 0.2, 0.6);
        let parts = view.split_wrapped();
        assert_eq!(parts.len(), 1);
        assert!(close(parts[0].y, 0.0));
        assert!(close(parts[0].bottom(), 0.4));
    }

    #[test]
    fn test_split_unwrapped_center_outside_unit() {
        // center 1.5 is the same longitude as 0.5
        let parts = View::new(1.5, 0.5, 0.2, 0.2).split_wrapped();
        assert_eq!(parts.len(), 1);
        assert!(close(parts[0].x, 0.4));
    }

    #[test]
    fn test_sanitized_replaces_bad_components() {
        let fallback = View::new(0.3, 0.4, 0.5, 0.6);
        let bad = View::new(f64::NAN, 0.7, -1.0, f64::INFINITY);
        let fixed = bad.sanitized(&fallback);
        assert_eq!(fixed, View::new(0.3, 0.7, 0.5, 0.6));
        assert!(fixed.is_valid());
    }

    #[test]
    fn test_sanitized_with_bad_fallback_is_still_drawable() {
        let fallback = View::new(0.5, 0.5, 0.0, f64::NAN);
        let fixed = View::new(0.5, 0.5, 0.0, 0.0).sanitized(&fallback);
        assert!(fixed.is_valid());
    }

    #[test]
    fn test_rect_intersection_and_sub_rect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersection(&Rect::new(20.0, 0.0, 1.0, 1.0)), None);

        let region = Rect::new(100.0, 50.0, 400.0, 200.0);
        let half = region.sub_rect(&Rect::new(0.5, 0.0, 0.5, 1.0));
        assert_eq!(half, Rect::new(300.0, 50.0, 200.0, 200.0));
    }

    #[test]
    fn test_view_serializes_for_snapshots() {
        let view = View::new(0.25, 0.75, 0.1, 0.2);
        let json = serde_json::to_string(&view).unwrap();
        let back: View = serde_json::from_str(&json).unwrap();
        assert_eq!(view, back);
    }
}
