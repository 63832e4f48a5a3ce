//! Camera and viewport math.
//!
//! Pure coordinate transforms shared by every canvas: views and rects,
//! flat / 360 / omni projections, yaw and pitch accessors, omni frame
//! indexing and CSS placement matrices. Nothing here holds mutable state.

/// Rotatable-object capture parameters and frame indexing.
pub mod omni;
/// Projection kinds with project/unproject and scale conversions.
pub mod projection;
/// 4×4 placement matrices for embeds and markers.
pub mod transform;
/// Normalized rectangles and the per-canvas view.
pub mod view;

pub use omni::{omni_frame_index, OmniParams};
pub use projection::{Projection, ScreenPoint, ViewGeometry};
pub use transform::{compute_transform_matrix, Placement};
pub use view::{Rect, View};
