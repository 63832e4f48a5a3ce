use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Tiles", inline)]
#[serde(default)]
/// Tile selection parameters.
pub struct TileOptions {
    /// Ring of extra tiles requested around the visible set.
    #[schemars(title = "Prefetch Margin", range(min = 0, max = 4))]
    pub prefetch_margin: u32,
    /// Omni frames on either side of the displayed one that stay requested.
    #[schemars(title = "Omni Frame Window", range(min = 0, max = 16))]
    pub omni_frame_window: u32,
    /// Keep the coarsest layer requested as a fallback while streaming.
    pub keep_fallback: bool,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            prefetch_margin: 1,
            omni_frame_window: 2,
            keep_fallback: true,
        }
    }
}
