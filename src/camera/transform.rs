//! 4×4 placement matrices for CSS-level embeds, markers and waypoints.
//!
//! Matrices are column-major (the `matrix3d()` argument order). For the
//! perspective projections the host must give the container
//! `perspective: focal_px` with the perspective origin at the canvas
//! region center; the matrix then places the element exactly where
//! [`ViewGeometry::project`] puts its anchor.

use glam::{DMat4, DVec3};

use super::omni::OmniParams;
use super::projection::{
    omni_rotation, sphere_direction, spherical_camera, Projection,
    ViewGeometry,
};
use super::view::View;

/// Placement parameters for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Anchor x in normalized image coordinates.
    pub x: f64,
    /// Anchor y in normalized image coordinates.
    pub y: f64,
    /// Element pixels per image pixel (flat, omni) or per CSS pixel (360).
    pub scale: f64,
    /// 360: distance from the camera in CSS pixels. Omni: offset along the
    /// frame normal in image pixels. Ignored for flat images.
    pub radius: f64,
    /// Rotation about the element's x axis, radians.
    pub rot_x: f64,
    /// Rotation about the element's y axis, radians.
    pub rot_y: f64,
    /// Rotation about the element's z axis, radians.
    pub rot_z: f64,
    /// Vertical offset applied after rotation, in image pixels.
    pub translate_y: f64,
    /// Extra horizontal stretch.
    pub scale_x: f64,
    /// Extra vertical stretch.
    pub scale_y: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            scale: 1.0,
            radius: 0.0,
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Placement {
    fn local_rotation(&self) -> DMat4 {
        DMat4::from_rotation_z(self.rot_z)
            * DMat4::from_rotation_y(self.rot_y)
            * DMat4::from_rotation_x(self.rot_x)
    }
}

/// CSS y points down; the 3D math uses y up.
const FLIP_Y: DMat4 = DMat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, -1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
]);

/// Matrix placing an element described by `placement` over `view`.
#[must_use]
pub fn compute_transform_matrix(
    geometry: &ViewGeometry,
    view: &View,
    placement: &Placement,
) -> DMat4 {
    match geometry.projection {
        Projection::Flat => flat_matrix(geometry, view, placement),
        Projection::Spherical { .. } => {
            spherical_matrix(geometry, view, placement)
        }
        Projection::Omni(params) => {
            omni_matrix(geometry, view, &params, placement)
        }
    }
}

fn flat_matrix(
    geometry: &ViewGeometry,
    view: &View,
    placement: &Placement,
) -> DMat4 {
    let anchor = geometry.project(view, placement.x, placement.y, false);
    let s = placement.scale * anchor.scale;
    DMat4::from_translation(DVec3::new(anchor.x, anchor.y, 0.0))
        * placement.local_rotation()
        * DMat4::from_translation(DVec3::new(
            0.0,
            placement.translate_y * anchor.scale,
            0.0,
        ))
        * DMat4::from_scale(DVec3::new(
            s * placement.scale_x,
            s * placement.scale_y,
            1.0,
        ))
}

/// Wrap a y-up camera-space model matrix for CSS: shift the camera plane
/// onto the perspective plane and recenter on the region.
fn to_css(geometry: &ViewGeometry, view: &View, camera_model: DMat4) -> DMat4 {
    let focal = geometry.focal_px(view);
    let region = geometry.region;
    DMat4::from_translation(DVec3::new(
        region.center_x(),
        region.center_y(),
        focal,
    )) * FLIP_Y
        * camera_model
        * FLIP_Y
}

fn spherical_matrix(
    geometry: &ViewGeometry,
    view: &View,
    placement: &Placement,
) -> DMat4 {
    let world_to_camera =
        DMat4::from_mat3(spherical_camera(view).transpose());
    let dir = sphere_direction(placement.x, placement.y);
    // Orient the element to face the camera from its direction.
    let lon = dir.x.atan2(-dir.z);
    let lat = dir.y.clamp(-1.0, 1.0).asin();
    let facing = DMat4::from_rotation_y(-lon) * DMat4::from_rotation_x(lat);
    let model = world_to_camera
        * facing
        * DMat4::from_translation(DVec3::new(0.0, 0.0, -placement.radius))
        * placement.local_rotation()
        * DMat4::from_translation(DVec3::new(0.0, -placement.translate_y, 0.0))
        * DMat4::from_scale(DVec3::new(
            placement.scale * placement.scale_x,
            placement.scale * placement.scale_y,
            1.0,
        ));
    to_css(geometry, view, model)
}

fn omni_matrix(
    geometry: &ViewGeometry,
    view: &View,
    params: &OmniParams,
    placement: &Placement,
) -> DMat4 {
    let plane = params.frame_plane_width();
    let distance = params.capture_distance.max(f64::EPSILON);
    // object units per image pixel
    let unit = plane / geometry.image_width;
    // CSS pixels per object unit on the perspective plane
    let to_px = geometry.focal_px(view) / distance;

    let anchor = DVec3::new(
        (placement.x - 0.5) * plane,
        (0.5 - placement.y) * plane / geometry.image_aspect(),
        0.0,
    );
    let model = DMat4::from_scale(DVec3::splat(to_px))
        * DMat4::from_translation(DVec3::new(0.0, 0.0, -distance))
        * DMat4::from_mat3(omni_rotation(view, params))
        * DMat4::from_translation(anchor)
        * DMat4::from_translation(DVec3::new(
            0.0,
            0.0,
            placement.radius * unit,
        ))
        * placement.local_rotation()
        * DMat4::from_translation(DVec3::new(
            0.0,
            -placement.translate_y * unit,
            0.0,
        ))
        * DMat4::from_scale(DVec3::new(
            placement.scale * placement.scale_x * unit,
            placement.scale * placement.scale_y * unit,
            unit,
        ));
    to_css(geometry, view, model)
}

#[cfg(test)]
mod tests {
    use glam::DVec4;

    use super::*;
    use crate::camera::view::Rect;

    /// Apply the matrix and a CSS `perspective` about the region center.
    fn css_point(geometry: &ViewGeometry, view: &View, m: &DMat4) -> (f64, f64) {
        let p: DVec4 = *m * DVec4::new(0.0, 0.0, 0.0, 1.0);
        let focal = geometry.focal_px(view);
        if focal == 0.0 {
            return (p.x, p.y);
        }
        let cx = geometry.region.center_x();
        let cy = geometry.region.center_y();
        let k = focal / (focal - p.z);
        (cx + (p.x - cx) * k, cy + (p.y - cy) * k)
    }

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 1024.0, 768.0)
    }

    #[test]
    fn test_flat_anchor_lands_on_projected_point() {
        let geometry =
            ViewGeometry::new(region(), 4096.0, 3072.0, Projection::Flat);
        let view = geometry.fit_view(&View::new(0.4, 0.6, 0.25, 0.25));
        let placement = Placement {
            x: 0.45,
            y: 0.55,
            rot_z: 0.7,
            scale: 2.0,
            ..Placement::default()
        };
        let m = compute_transform_matrix(&geometry, &view, &placement);
        let expected = geometry.project(&view, 0.45, 0.55, false);
        let (x, y) = css_point(&geometry, &view, &m);
        assert!((x - expected.x).abs() < 1e-9 && (y - expected.y).abs() < 1e-9);

        // unit x axis is scaled by element scale times view scale
        let axis = m * DVec4::new(1.0, 0.0, 0.0, 0.0);
        let len = axis.truncate().length();
        assert!((len - 2.0 * expected.scale).abs() < 1e-9);
    }

    #[test]
    fn test_spherical_anchor_matches_projection() {
        let geometry = ViewGeometry::new(
            region(),
            8192.0,
            4096.0,
            Projection::Spherical { true_north: 0.0 },
        );
        let view = geometry.fit_view(&View::new(0.45, 0.45, 0.25, 0.1));
        let placement = Placement {
            x: 0.5,
            y: 0.5,
            radius: 500.0,
            ..Placement::default()
        };
        let m = compute_transform_matrix(&geometry, &view, &placement);
        let expected = geometry.project(&view, 0.5, 0.5, false);
        let (x, y) = css_point(&geometry, &view, &m);
        assert!((x - expected.x).abs() < 1e-6, "{x} vs {}", expected.x);
        assert!((y - expected.y).abs() < 1e-6, "{y} vs {}", expected.y);
    }

    #[test]
    fn test_omni_anchor_matches_projection() {
        let params = OmniParams {
            capture_distance: 3.0,
            vertical_angle_deg: 30.0,
            layer_count: 3,
            ..OmniParams::default()
        };
        let geometry =
            ViewGeometry::new(region(), 2000.0, 1500.0, Projection::Omni(params));
        let view = geometry.fit_view(&View::new(0.1, 0.7, 0.6, 0.6));
        let placement = Placement {
            x: 0.3,
            y: 0.4,
            ..Placement::default()
        };
        let m = compute_transform_matrix(&geometry, &view, &placement);
        let expected = geometry.project(&view, 0.3, 0.4, false);
        let (x, y) = css_point(&geometry, &view, &m);
        assert!((x - expected.x).abs() < 1e-6, "{x} vs {}", expected.x);
        assert!((y - expected.y).abs() < 1e-6, "{y} vs {}", expected.y);
    }
}
