//! Option records for camera instructions and the image descriptor a
//! canvas is created from.

use serde::{Deserialize, Serialize};

use crate::camera::{Projection, Rect};
use crate::error::ViewerError;
use crate::util::easing::Easing;

/// Default tile edge in source pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Static description of the image a canvas displays.
///
/// A zero width or height describes a pure container (the implicit root,
/// grid cells): it still has a view but never requests tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDescriptor {
    /// Source width in pixels (per frame for omni).
    pub width: f64,
    /// Source height in pixels (per frame for omni).
    pub height: f64,
    /// Tile edge in source pixels.
    pub tile_size: u32,
    /// Coordinate system.
    pub projection: Projection,
    /// Allow panning the image partly out of the region.
    pub free_move: bool,
    /// Zoomed-out limit fills the region instead of fitting inside it.
    pub cover_limit: bool,
    /// Explicit minimum scale; defaults to the fit scale.
    pub min_scale: Option<f64>,
    /// Explicit maximum scale; defaults to the viewer-wide camera option.
    pub max_scale: Option<f64>,
    /// Per-canvas camera speed multiplier.
    pub camera_speed: f64,
    /// Optional rectangle the view must stay inside.
    pub limit: Option<Rect>,
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            tile_size: DEFAULT_TILE_SIZE,
            projection: Projection::Flat,
            free_move: false,
            cover_limit: false,
            min_scale: None,
            max_scale: None,
            camera_speed: 1.0,
            limit: None,
        }
    }
}

impl ImageDescriptor {
    /// Container without an image.
    #[must_use]
    pub fn container() -> Self {
        Self::default()
    }

    /// Image of the given pixel size.
    #[must_use]
    pub fn image(width: f64, height: f64, projection: Projection) -> Self {
        Self {
            width,
            height,
            projection,
            ..Self::default()
        }
    }

    /// Whether this describes an image rather than a container.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Reject sizes and tile edges nothing can be drawn from.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(ViewerError::InvalidImage(format!(
                "non-finite size {}x{}",
                self.width, self.height
            )));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(ViewerError::InvalidImage(format!(
                "negative size {}x{}",
                self.width, self.height
            )));
        }
        if self.tile_size == 0 {
            return Err(ViewerError::InvalidImage("tile size is zero".into()));
        }
        if let Some(limit) = self.limit {
            if !limit.is_drawable() {
                return Err(ViewerError::InvalidImage(format!(
                    "empty limit rect {limit:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Options for `set_view`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetViewOptions {
    /// Skip limit and scale clamping.
    pub no_limit: bool,
    /// Do not record the previous view for `go_back`.
    pub no_last_view: bool,
}

/// Options for `fly_to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyToOptions {
    /// Fixed duration in ms; `None` derives it from travel distance.
    pub duration: Option<f64>,
    /// Speed multiplier for derived durations.
    pub speed: f64,
    /// Zoom out, travel, then zoom back in.
    pub is_jump: bool,
    /// Never exceed the maximum scale, even mid-flight.
    pub limit_zoom: bool,
    /// Easing curve.
    pub easing: Easing,
}

impl Default for FlyToOptions {
    fn default() -> Self {
        Self {
            duration: None,
            speed: 1.0,
            is_jump: false,
            limit_zoom: false,
            easing: Easing::Ease,
        }
    }
}

impl FlyToOptions {
    /// Fixed-duration fly.
    #[must_use]
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }
}

/// Options for `zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomOptions {
    /// Duration in ms; `None` uses the camera option default.
    pub duration: Option<f64>,
    /// Easing curve.
    pub easing: Easing,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            duration: None,
            easing: Easing::EaseOut,
        }
    }
}

/// Options for `pan`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanOptions {
    /// Skip limit clamping.
    pub no_limit: bool,
    /// Leave the sample out of the release-velocity window.
    pub no_kinetic: bool,
}
