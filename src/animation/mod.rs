//! Timestamp-driven animation for canvases.
//!
//! Each canvas has two independent timelines: the camera (fly, zoom,
//! kinetic glide) and opacity. A new instruction on a timeline replaces the
//! live one and marks its ticket interrupted. Nothing here owns a clock;
//! every sample takes the host's `now` in milliseconds.

/// Fly, zoom and kinetic camera motions.
pub mod camera;
/// Tickets and settled-status bookkeeping.
pub mod ticket;
/// Generic eased value transitions (opacity, area rects).
pub mod tween;

pub use camera::{CameraAnimation, CameraAnimationKind};
pub use ticket::{AnimationStatus, AnimationTicket};
pub(crate) use ticket::TicketLog;
pub use tween::{Interpolate, Tween};

/// An opacity transition and the ticket that reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Ticket handed to the host.
    pub ticket: AnimationTicket,
    /// Opacity over time.
    pub tween: Tween<f64>,
}
