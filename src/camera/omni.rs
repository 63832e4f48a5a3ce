//! Rotatable-object ("omni") capture parameters and frame indexing.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// How an omni object was photographed.
///
/// Frames are captured on `layer_count` horizontal rings spread over
/// `vertical_angle_deg`, each ring holding `frame_count` evenly spaced
/// frames. `front_index` is the frame that faces the viewer at rotation 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OmniParams {
    /// Camera-to-object distance at capture time, in object units.
    pub capture_distance: f64,
    /// Horizontal field of view of the capture camera, in degrees.
    pub fov_deg: f64,
    /// Total vertical angle swept by the capture layers, in degrees.
    pub vertical_angle_deg: f64,
    /// Number of vertical capture rings.
    pub layer_count: u32,
    /// Frames per ring.
    pub frame_count: u32,
    /// Frame shown at rotation 0.
    pub front_index: u32,
}

impl Default for OmniParams {
    fn default() -> Self {
        Self {
            capture_distance: 1.0,
            fov_deg: 40.0,
            vertical_angle_deg: 0.0,
            layer_count: 1,
            frame_count: 36,
            front_index: 0,
        }
    }
}

impl OmniParams {
    /// Width of the captured frame plane at the object's center, in object
    /// units.
    #[must_use]
    pub fn frame_plane_width(&self) -> f64 {
        2.0 * self.capture_distance.max(f64::EPSILON)
            * (0.5 * self.fov_deg.to_radians()).tan()
    }

    /// Rotation angle in radians for a view's horizontal center.
    #[must_use]
    pub fn rotation(center_x: f64) -> f64 {
        center_x * TAU
    }

    /// Vertical tilt in radians for a view's vertical center; 0.5 is the
    /// middle ring.
    #[must_use]
    pub fn tilt(&self, center_y: f64) -> f64 {
        (center_y.clamp(0.0, 1.0) - 0.5) * self.vertical_angle_deg.to_radians()
    }

    /// Frame displayed for a view's horizontal center.
    #[must_use]
    pub fn frame_for(&self, center_x: f64) -> u32 {
        omni_frame_index(Self::rotation(center_x), self.frame_count, self.front_index)
    }

    /// Capture ring displayed for a view's vertical center.
    #[must_use]
    pub fn layer_for(&self, center_y: f64) -> u32 {
        if self.layer_count <= 1 {
            return 0;
        }
        let last = f64::from(self.layer_count - 1);
        (center_y.clamp(0.0, 1.0) * last).round() as u32
    }

    /// Signed frame distance on the ring, accounting for wraparound.
    #[must_use]
    pub fn frame_distance(&self, a: u32, b: u32) -> u32 {
        if self.frame_count == 0 {
            return 0;
        }
        let n = self.frame_count;
        let d = (i64::from(a) - i64::from(b)).rem_euclid(i64::from(n)) as u32;
        d.min(n - d)
    }
}

/// Frame index shown at rotation `angle` (radians).
///
/// Periodic in `angle` with period 2π; the result is always in
/// `0..frame_count` (0 when there are no frames).
#[must_use]
pub fn omni_frame_index(angle: f64, frame_count: u32, front_index: u32) -> u32 {
    if frame_count == 0 || !angle.is_finite() {
        return front_index.min(frame_count.saturating_sub(1));
    }
    let n = f64::from(frame_count);
    // Reduce the angle first so huge inputs keep their precision.
    let turns = (angle / TAU).rem_euclid(1.0);
    let step = (turns * n).round() as i64;
    (i64::from(front_index) + step).rem_euclid(i64::from(frame_count)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index_is_periodic() {
        for i in -50..50 {
            let theta = f64::from(i) * 0.37;
            assert_eq!(
                omni_frame_index(theta, 36, 5),
                omni_frame_index(theta + TAU, 36, 5),
                "theta = {theta}"
            );
        }
    }

    #[test]
    fn test_frame_index_wraps_around() {
        // one step short of a full turn lands on the frame before front
        let step = TAU / 24.0;
        assert_eq!(omni_frame_index(0.0, 24, 0), 0);
        assert_eq!(omni_frame_index(step, 24, 0), 1);
        assert_eq!(omni_frame_index(-step, 24, 0), 23);
        assert_eq!(omni_frame_index(23.0 * step, 24, 3), 2);
        // just under a full turn rounds back to the front frame
        assert_eq!(omni_frame_index(TAU - 1e-9, 24, 7), 7);
    }

    #[test]
    fn test_frame_index_without_frames() {
        assert_eq!(omni_frame_index(1.0, 0, 0), 0);
        assert_eq!(omni_frame_index(f64::NAN, 12, 4), 4);
    }

    #[test]
    fn test_frame_distance_wraps() {
        let params = OmniParams {
            frame_count: 36,
            ..OmniParams::default()
        };
        assert_eq!(params.frame_distance(0, 35), 1);
        assert_eq!(params.frame_distance(35, 0), 1);
        assert_eq!(params.frame_distance(10, 28), 18);
    }

    #[test]
    fn test_layer_for_rounds_to_nearest_ring() {
        let params = OmniParams {
            layer_count: 5,
            ..OmniParams::default()
        };
        assert_eq!(params.layer_for(0.0), 0);
        assert_eq!(params.layer_for(0.5), 2);
        assert_eq!(params.layer_for(1.0), 4);
        assert_eq!(params.layer_for(2.0), 4);
    }
}
