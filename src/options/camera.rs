use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera motion, gesture and scale-bound parameters.
pub struct CameraOptions {
    /// Global camera speed multiplier applied on top of per-canvas speed.
    #[schemars(title = "Camera Speed", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub speed: f64,
    /// Milliseconds of fly animation per unit of view travel distance.
    #[schemars(title = "Fly Pace (ms/unit)", range(min = 50.0, max = 3000.0))]
    pub fly_ms_per_unit: f64,
    /// Lower bound for auto-derived fly durations.
    #[schemars(skip)]
    pub fly_min_ms: f64,
    /// Upper bound for auto-derived fly durations.
    #[schemars(skip)]
    pub fly_max_ms: f64,
    /// Duration of animated (wheel/button) zoom steps.
    #[schemars(title = "Zoom Duration (ms)", range(min = 0.0, max = 1000.0))]
    pub zoom_duration_ms: f64,
    /// Fraction of release velocity kept by kinetic panning (0 disables).
    #[schemars(title = "Elasticity", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub elasticity: f64,
    /// Exponential decay time constant of kinetic panning.
    #[schemars(skip)]
    pub kinetic_time_constant_ms: f64,
    /// Pan samples older than this window are ignored for release velocity.
    #[schemars(skip)]
    pub pan_velocity_window_ms: f64,
    /// Release speeds below this (px/ms) never start a kinetic animation.
    #[schemars(skip)]
    pub kinetic_min_speed: f64,
    /// Default maximum scale (screen px per image px) for new canvases.
    #[schemars(title = "Max Scale", range(min = 0.25, max = 8.0))]
    pub max_scale: f64,
    /// Narrowest horizontal field of view for 360 images, in degrees.
    #[schemars(skip)]
    pub min_fov_deg: f64,
    /// Widest horizontal field of view for 360 images, in degrees.
    #[schemars(skip)]
    pub max_fov_deg: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            fly_ms_per_unit: 600.0,
            fly_min_ms: 250.0,
            fly_max_ms: 2500.0,
            zoom_duration_ms: 250.0,
            elasticity: 0.85,
            kinetic_time_constant_ms: 325.0,
            pan_velocity_window_ms: 100.0,
            kinetic_min_speed: 0.05,
            max_scale: 1.0,
            min_fov_deg: 20.0,
            max_fov_deg: 120.0,
        }
    }
}
