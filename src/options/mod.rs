//! Centralized viewer options with TOML preset support.
//!
//! Camera motion, transition durations and tile selection knobs are
//! consolidated here. Options serialize to/from TOML so hosts can ship
//! presets; the engine itself only ever receives an in-memory [`Options`].

mod camera;
mod tiles;
mod transitions;

use std::path::Path;

pub use camera::CameraOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use tiles::TileOptions;
pub use transitions::TransitionOptions;

use crate::error::ViewerError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[camera]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera motion and gesture parameters.
    pub camera: CameraOptions,
    /// Viewer-wide transition durations.
    pub transitions: TransitionOptions,
    /// Tile selection parameters.
    pub tiles: TileOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, ViewerError> {
        toml::from_str(content)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ViewerError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewerError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(ViewerError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[camera]
elasticity = 0.5
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.camera.elasticity, 0.5);
        assert_eq!(opts.camera.fly_ms_per_unit, 600.0);
        assert_eq!(opts.transitions, TransitionOptions::default());
        assert_eq!(opts.tiles.prefetch_margin, 1);
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[camera]\nspeed = \"fast\"").unwrap_err();
        assert!(matches!(err, ViewerError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join("zoomview-options-test");
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.transitions.grid_ms = 750.0;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("transitions"));
        assert!(props.contains_key("tiles"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("elasticity").is_some());
        assert!(camera.get("kinetic_time_constant_ms").is_none());
    }
}
