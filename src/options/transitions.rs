use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Transitions", inline)]
#[serde(default)]
/// Viewer-wide transition durations, in milliseconds.
pub struct TransitionOptions {
    /// Area re-layout duration for grids and split screens.
    #[schemars(title = "Grid", range(min = 0.0, max = 2000.0))]
    pub grid_ms: f64,
    /// Opacity cross-fade duration between canvases.
    #[schemars(title = "Cross-fade", range(min = 0.0, max = 2000.0))]
    pub cross_fade_ms: f64,
    /// Fade duration for embedded overlays appearing on a canvas.
    #[schemars(title = "Embed Fade", range(min = 0.0, max = 2000.0))]
    pub embed_fade_ms: f64,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            grid_ms: 400.0,
            cross_fade_ms: 300.0,
            embed_fade_ms: 200.0,
        }
    }
}
