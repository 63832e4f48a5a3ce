//! Projection kinds and the shared project/unproject interface.
//!
//! Every canvas maps normalized image coordinates to screen pixels through
//! one of three projections:
//!
//! - [`Projection::Flat`]: an orthographic window onto a flat image.
//! - [`Projection::Spherical`]: a perspective camera at the center of an
//!   equirectangular 360 image.
//! - [`Projection::Omni`]: a perspective camera orbiting an object at its
//!   capture distance; image coordinates live on the frame plane through
//!   the object's center.
//!
//! All functions here are pure. A [`ViewGeometry`] bundles the screen
//! region, image size and projection so callers pass one value around.

use std::f64::consts::{PI, TAU};

use glam::{DMat3, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::omni::OmniParams;
use super::view::{Rect, View};
use crate::util::wrap_unit;

/// Widest horizontal field of view the perspective projections accept.
const MAX_PERSPECTIVE_FOV: f64 = PI * 0.95;

/// Screen-space drag across the full region width rotates an omni object
/// by this many turns.
const OMNI_TURNS_PER_REGION_WIDTH: f64 = 0.5;

/// Vertical omni travel (fraction of all rings) per full region height.
const OMNI_RINGS_PER_REGION_HEIGHT: f64 = 0.5;

/// Coordinate system of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Projection {
    /// Flat deep-zoom image.
    #[default]
    Flat,
    /// Equirectangular 360 panorama.
    Spherical {
        /// Yaw offset (radians) aligning stored orientation with north.
        true_north: f64,
    },
    /// Rotatable object captured from many angles.
    Omni(OmniParams),
}

impl Projection {
    /// Decode the boundary representation: 0 flat, 1 spherical, 2 omni.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Spherical { true_north: 0.0 },
            2 => Self::Omni(OmniParams::default()),
            _ => Self::Flat,
        }
    }

    /// Whether horizontal view coordinates wrap modulo 1.
    #[must_use]
    pub fn wraps_horizontally(&self) -> bool {
        !matches!(self, Self::Flat)
    }
}

/// Result of projecting one image point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Screen x in CSS pixels.
    pub x: f64,
    /// Screen y in CSS pixels.
    pub y: f64,
    /// Screen pixels per image pixel at this point.
    pub scale: f64,
    /// Forward component; `> 0` means hidden behind the camera or object.
    pub depth: f64,
}

impl ScreenPoint {
    /// Fixed-layout form used at the handle boundary.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.scale, self.depth]
    }

    /// Whether the point faces the camera.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.depth <= 0.0
    }
}

/// Everything needed to map between image and screen space for a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    /// Screen region of the canvas in CSS pixels.
    pub region: Rect,
    /// Source image width in pixels (per frame for omni).
    pub image_width: f64,
    /// Source image height in pixels (per frame for omni).
    pub image_height: f64,
    /// Coordinate system.
    pub projection: Projection,
}

impl ViewGeometry {
    /// Geometry for `projection` drawn into `region`.
    #[must_use]
    pub fn new(
        region: Rect,
        image_width: f64,
        image_height: f64,
        projection: Projection,
    ) -> Self {
        Self {
            region,
            image_width: image_width.max(1.0),
            image_height: image_height.max(1.0),
            projection,
        }
    }

    fn region_width(&self) -> f64 {
        self.region.width.max(1.0)
    }

    fn region_height(&self) -> f64 {
        self.region.height.max(1.0)
    }

    fn region_center(&self) -> DVec2 {
        DVec2::new(self.region.center_x(), self.region.center_y())
    }

    /// Screen aspect ratio (width / height) of the region.
    #[must_use]
    pub fn screen_aspect(&self) -> f64 {
        self.region_width() / self.region_height()
    }

    /// Image aspect ratio (width / height).
    #[must_use]
    pub fn image_aspect(&self) -> f64 {
        self.image_width / self.image_height
    }

    /// Horizontal field of view (radians) of a perspective view.
    #[must_use]
    pub fn horizontal_fov(&self, view: &View) -> f64 {
        match self.projection {
            Projection::Flat => 0.0,
            Projection::Spherical { .. } => {
                (view.width * TAU).clamp(f64::EPSILON, MAX_PERSPECTIVE_FOV)
            }
            Projection::Omni(params) => {
                let half = 0.5 * params.fov_deg.to_radians();
                2.0 * (view.width * half.tan()).atan()
            }
        }
    }

    /// Focal length in CSS pixels for perspective projections; 0 for flat.
    ///
    /// Hosts placing CSS embeds use this as the container `perspective`.
    #[must_use]
    pub fn focal_px(&self, view: &View) -> f64 {
        match self.projection {
            Projection::Flat => 0.0,
            _ => {
                0.5 * self.region_width()
                    / (0.5 * self.horizontal_fov(view)).tan()
            }
        }
    }

    /// Screen pixels per image pixel at the view center.
    #[must_use]
    pub fn scale(&self, view: &View) -> f64 {
        match self.projection {
            Projection::Flat | Projection::Omni(_) => {
                self.region_width() / (view.width * self.image_width)
            }
            Projection::Spherical { .. } => {
                self.focal_px(view) * TAU / self.image_width
            }
        }
    }

    /// View width that produces `scale` screen pixels per image pixel.
    #[must_use]
    pub fn width_for_scale(&self, scale: f64) -> f64 {
        let scale = scale.max(f64::MIN_POSITIVE);
        match self.projection {
            Projection::Flat | Projection::Omni(_) => {
                self.region_width() / (scale * self.image_width)
            }
            Projection::Spherical { .. } => {
                let focal = scale * self.image_width / TAU;
                let fov = 2.0 * (0.5 * self.region_width() / focal).atan();
                fov / TAU
            }
        }
    }

    /// Height matching `width` on this region's aspect ratio.
    #[must_use]
    pub fn height_for_width(&self, width: f64) -> f64 {
        match self.projection {
            Projection::Flat | Projection::Omni(_) => {
                width * self.image_aspect() / self.screen_aspect()
            }
            Projection::Spherical { .. } => {
                let hfov = (width * TAU).clamp(f64::EPSILON, MAX_PERSPECTIVE_FOV);
                let vfov = 2.0 * ((0.5 * hfov).tan() / self.screen_aspect()).atan();
                vfov / PI
            }
        }
    }

    /// Expand a requested view so it matches the region's aspect ratio
    /// while still containing the requested extent.
    #[must_use]
    pub fn fit_view(&self, view: &View) -> View {
        let width = match self.projection {
            Projection::Flat => {
                let needed = view.height * self.screen_aspect() / self.image_aspect();
                view.width.max(needed)
            }
            Projection::Spherical { .. } => {
                let vfov = (view.height * PI).clamp(f64::EPSILON, PI * 0.99);
                let hfov = 2.0 * ((0.5 * vfov).tan() * self.screen_aspect()).atan();
                view.width
                    .max(hfov / TAU)
                    .min(MAX_PERSPECTIVE_FOV / TAU)
            }
            Projection::Omni(_) => view.width,
        };
        View::new(
            view.center_x,
            view.center_y,
            width,
            self.height_for_width(width),
        )
    }

    /// Project an image point to screen space.
    ///
    /// `absolute` means `x`/`y` are source-image pixels instead of
    /// normalized coordinates.
    #[must_use]
    pub fn project(&self, view: &View, x: f64, y: f64, absolute: bool) -> ScreenPoint {
        let (x, y) = if absolute {
            (x / self.image_width, y / self.image_height)
        } else {
            (x, y)
        };
        match self.projection {
            Projection::Flat => self.project_flat(view, x, y),
            Projection::Spherical { .. } => self.project_spherical(view, x, y),
            Projection::Omni(params) => self.project_omni(view, &params, x, y),
        }
    }

    /// Map a screen point back to normalized image coordinates.
    ///
    /// Without `allow_out_of_bounds` the result is clamped to [0,1]; wrapping
    /// projections always wrap longitude into [0,1).
    #[must_use]
    pub fn unproject(
        &self,
        view: &View,
        screen_x: f64,
        screen_y: f64,
        allow_out_of_bounds: bool,
    ) -> DVec2 {
        let p = match self.projection {
            Projection::Flat => self.unproject_flat(view, screen_x, screen_y),
            Projection::Spherical { .. } => {
                self.unproject_spherical(view, screen_x, screen_y)
            }
            Projection::Omni(params) => {
                self.unproject_omni(view, &params, screen_x, screen_y)
            }
        };
        if allow_out_of_bounds {
            p
        } else {
            DVec2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0))
        }
    }

    /// Translate a view by a screen-pixel drag.
    ///
    /// Dragging right moves content right, so the view center moves left.
    #[must_use]
    pub fn pan_view(&self, view: &View, dx: f64, dy: f64) -> View {
        let mut out = *view;
        match self.projection {
            Projection::Flat => {
                out.center_x -= dx / self.region_width() * view.width;
                out.center_y -= dy / self.region_height() * view.height;
            }
            Projection::Spherical { .. } => {
                out.center_x = wrap_unit(
                    view.center_x - dx / self.region_width() * view.width,
                );
                out.center_y -= dy / self.region_height() * view.height;
            }
            Projection::Omni(_) => {
                out.center_x = wrap_unit(
                    view.center_x
                        - dx / self.region_width() * OMNI_TURNS_PER_REGION_WIDTH,
                );
                out.center_y = (view.center_y
                    - dy / self.region_height() * OMNI_RINGS_PER_REGION_HEIGHT)
                    .clamp(0.0, 1.0);
            }
        }
        out
    }

    // -- Flat --

    fn project_flat(&self, view: &View, x: f64, y: f64) -> ScreenPoint {
        let bounds = view.bounds();
        ScreenPoint {
            x: self.region.x + (x - bounds.x) / view.width * self.region_width(),
            y: self.region.y
                + (y - bounds.y) / view.height * self.region_height(),
            scale: self.scale(view),
            depth: -1.0,
        }
    }

    fn unproject_flat(&self, view: &View, sx: f64, sy: f64) -> DVec2 {
        let bounds = view.bounds();
        DVec2::new(
            bounds.x + (sx - self.region.x) / self.region_width() * view.width,
            bounds.y + (sy - self.region.y) / self.region_height() * view.height,
        )
    }

    // -- Spherical --

    fn project_spherical(&self, view: &View, x: f64, y: f64) -> ScreenPoint {
        let focal = self.focal_px(view);
        let cam = spherical_camera(view).transpose() * sphere_direction(x, y);
        let forward = -cam.z;
        let denom = if forward.abs() < 1e-12 { 1e-12 } else { forward };
        let center = self.region_center();
        ScreenPoint {
            x: center.x + focal * cam.x / denom,
            y: center.y - focal * cam.y / denom,
            scale: focal * TAU / self.image_width / denom.abs(),
            depth: cam.z,
        }
    }

    fn unproject_spherical(&self, view: &View, sx: f64, sy: f64) -> DVec2 {
        let focal = self.focal_px(view);
        let center = self.region_center();
        let ray = DVec3::new(
            (sx - center.x) / focal,
            -(sy - center.y) / focal,
            -1.0,
        )
        .normalize();
        let dir = spherical_camera(view) * ray;
        let lon = dir.x.atan2(-dir.z);
        let lat = dir.y.clamp(-1.0, 1.0).asin();
        DVec2::new(wrap_unit(lon / TAU + 0.5), 0.5 - lat / PI)
    }

    // -- Omni --

    fn omni_object_point(&self, params: &OmniParams, x: f64, y: f64) -> DVec3 {
        let plane = params.frame_plane_width();
        DVec3::new(
            (x - 0.5) * plane,
            (0.5 - y) * plane / self.image_aspect(),
            0.0,
        )
    }

    fn project_omni(
        &self,
        view: &View,
        params: &OmniParams,
        x: f64,
        y: f64,
    ) -> ScreenPoint {
        let rotated = omni_rotation(view, params) * self.omni_object_point(params, x, y);
        let distance = params.capture_distance.max(f64::EPSILON);
        let forward = distance - rotated.z;
        let denom = if forward.abs() < 1e-12 { 1e-12 } else { forward };
        let focal = self.focal_px(view);
        let center = self.region_center();
        ScreenPoint {
            x: center.x + focal * rotated.x / denom,
            y: center.y - focal * rotated.y / denom,
            scale: focal * params.frame_plane_width()
                / (self.image_width * denom.abs()),
            depth: -rotated.z,
        }
    }

    fn unproject_omni(
        &self,
        view: &View,
        params: &OmniParams,
        sx: f64,
        sy: f64,
    ) -> DVec2 {
        let focal = self.focal_px(view);
        let center = self.region_center();
        let to_object = omni_rotation(view, params).transpose();
        let distance = params.capture_distance.max(f64::EPSILON);
        let origin = to_object * DVec3::new(0.0, 0.0, distance);
        let dir = to_object
            * DVec3::new((sx - center.x) / focal, -(sy - center.y) / focal, -1.0);
        if dir.z.abs() < 1e-12 {
            // Frame plane seen edge-on
            return DVec2::new(0.5, 0.5);
        }
        let t = -origin.z / dir.z;
        let hit = origin + dir * t;
        let plane = params.frame_plane_width();
        DVec2::new(
            hit.x / plane + 0.5,
            0.5 - hit.y * self.image_aspect() / plane,
        )
    }
}

/// Unit direction for a normalized equirectangular coordinate.
///
/// Longitude 0.5 / latitude 0.5 faces `-Z`; `+Y` is up.
#[must_use]
pub fn sphere_direction(x: f64, y: f64) -> DVec3 {
    let lon = (x - 0.5) * TAU;
    let lat = (0.5 - y) * PI;
    DVec3::new(lat.cos() * lon.sin(), lat.sin(), -lat.cos() * lon.cos())
}

/// Camera-to-world rotation of a 360 view.
#[must_use]
pub fn spherical_camera(view: &View) -> DMat3 {
    let yaw = (view.center_x - 0.5) * TAU;
    let pitch = (0.5 - view.center_y) * PI;
    DMat3::from_rotation_y(-yaw) * DMat3::from_rotation_x(pitch)
}

/// Object-to-camera rotation of an omni view (tilt after spin).
#[must_use]
pub fn omni_rotation(view: &View, params: &OmniParams) -> DMat3 {
    DMat3::from_rotation_x(params.tilt(view.center_y))
        * DMat3::from_rotation_y(OmniParams::rotation(view.center_x))
}

/// Yaw in radians of a 360 view, corrected by `true_north`.
#[must_use]
pub fn yaw(view: &View, true_north: f64) -> f64 {
    (view.center_x - 0.5) * TAU + true_north
}

/// Pitch in radians of a 360 view (positive looks up).
#[must_use]
pub fn pitch(view: &View) -> f64 {
    (0.5 - view.center_y) * PI
}

/// View with its yaw set to `yaw` radians, inverting the `true_north`
/// correction applied by [`yaw`].
#[must_use]
pub fn with_yaw(view: &View, yaw: f64, true_north: f64) -> View {
    View {
        center_x: wrap_unit((yaw - true_north) / TAU + 0.5),
        ..*view
    }
}

/// View with its pitch set to `pitch` radians.
#[must_use]
pub fn with_pitch(view: &View, pitch: f64) -> View {
    View {
        center_y: (0.5 - pitch / PI).clamp(0.0, 1.0),
        ..*view
    }
}
