//! The viewer's complete instruction vocabulary.
//!
//! Every operation a host can trigger, whether from a pointer gesture, a
//! toolbar button or a script, is representable as a `ViewerCommand`.
//! Hosts construct commands and pass them to
//! [`Viewer::execute`](super::Viewer::execute) together with the current
//! frame timestamp.

use glam::DVec2;

use super::{CanvasId, Viewer};
use crate::animation::AnimationTicket;
use crate::camera::{Rect, View};
use crate::canvas::{FlyToOptions, PanOptions, SetViewOptions, ZoomOptions};
use crate::error::ViewerError;

/// A single instruction for a [`Viewer`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    // ── Camera ──────────────────────────────────────────────────────
    /// Jump to a view without animating.
    SetView {
        /// Target canvas.
        canvas: CanvasId,
        /// Requested view.
        view: View,
        /// Limit and history handling.
        options: SetViewOptions,
    },
    /// Animate to a view.
    FlyTo {
        /// Target canvas.
        canvas: CanvasId,
        /// Requested view.
        view: View,
        /// Duration, path and easing.
        options: FlyToOptions,
    },
    /// Zoom by `delta` powers of two around a screen point.
    Zoom {
        /// Target canvas.
        canvas: CanvasId,
        /// Positive zooms in.
        delta: f64,
        /// Focus point in element CSS pixels.
        focus: DVec2,
        /// Duration and easing.
        options: ZoomOptions,
    },
    /// Return to the view recorded before the last jump or flight.
    GoBack {
        /// Target canvas.
        canvas: CanvasId,
    },
    /// Set the horizontal look angle of a spherical canvas.
    SetYaw {
        /// Target canvas.
        canvas: CanvasId,
        /// Angle in radians.
        radians: f64,
    },
    /// Set the vertical look angle of a spherical canvas.
    SetPitch {
        /// Target canvas.
        canvas: CanvasId,
        /// Angle in radians.
        radians: f64,
    },

    // ── Gestures ────────────────────────────────────────────────────
    /// Drag by a screen-pixel delta.
    Pan {
        /// Target canvas.
        canvas: CanvasId,
        /// Pointer movement in CSS pixels.
        delta: DVec2,
        /// Limit and kinetic handling.
        options: PanOptions,
    },
    /// Pointer released after a drag.
    ReleasePan {
        /// Target canvas.
        canvas: CanvasId,
        /// Glide on with the drag velocity.
        kinetic: bool,
    },
    /// Two-finger positions during a pinch.
    Pinch {
        /// Target canvas.
        canvas: CanvasId,
        /// First finger.
        a: DVec2,
        /// Second finger.
        b: DVec2,
    },
    /// Fingers lifted.
    EndPinch {
        /// Target canvas.
        canvas: CanvasId,
    },

    // ── Compositing ─────────────────────────────────────────────────
    /// Ease (or snap) opacity.
    FadeTo {
        /// Target canvas.
        canvas: CanvasId,
        /// Opacity in `[0, 1]`.
        opacity: f64,
        /// Snap without animating.
        direct: bool,
    },
    /// Place a canvas within its parent.
    SetArea {
        /// Target canvas.
        canvas: CanvasId,
        /// Normalized rect inside the parent's region.
        area: Rect,
        /// Ease over the grid transition duration.
        animate: bool,
    },
    /// Change the draw-order hint.
    SetZIndex {
        /// Target canvas.
        canvas: CanvasId,
        /// Higher draws later.
        z_index: i32,
    },
    /// Re-parent a canvas.
    AddChild {
        /// New parent.
        parent: CanvasId,
        /// Canvas being moved.
        child: CanvasId,
    },
    /// Remove a canvas.
    Destroy {
        /// Canvas to remove.
        canvas: CanvasId,
    },

    // ── Element ─────────────────────────────────────────────────────
    /// The host element changed size or pixel ratio.
    Resize {
        /// Width in CSS pixels.
        width: f64,
        /// Height in CSS pixels.
        height: f64,
        /// Device pixel ratio.
        device_pixel_ratio: f64,
    },
}

/// What executing a command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Applied synchronously.
    Applied,
    /// Started a timeline; poll the ticket with [`Viewer::status`].
    Started(AnimationTicket),
    /// Ignored: malformed input or nothing to do.
    Ignored,
}

impl CommandOutcome {
    fn from_flag(applied: bool) -> Self {
        if applied {
            Self::Applied
        } else {
            Self::Ignored
        }
    }
}

// ── Command execution ──

impl Viewer {
    /// Execute one command at host time `now` (milliseconds).
    pub fn execute(
        &mut self,
        command: ViewerCommand,
        now: f64,
    ) -> Result<CommandOutcome, ViewerError> {
        use ViewerCommand as C;
        let outcome = match command {
            C::SetView {
                canvas,
                view,
                options,
            } => {
                self.try_canvas_mut(canvas)?.set_view(&view, &options);
                CommandOutcome::Applied
            }
            C::FlyTo {
                canvas,
                view,
                options,
            } => CommandOutcome::Started(self.try_canvas_mut(canvas)?.fly_to(&view, &options, now)),
            C::Zoom {
                canvas,
                delta,
                focus,
                options,
            } => CommandOutcome::Started(
                self.try_canvas_mut(canvas)?
                    .zoom(delta, focus.x, focus.y, &options, now),
            ),
            C::GoBack { canvas } => CommandOutcome::from_flag(self.try_canvas_mut(canvas)?.go_back()),
            C::SetYaw { canvas, radians } => {
                CommandOutcome::from_flag(self.try_canvas_mut(canvas)?.set_yaw(radians))
            }
            C::SetPitch { canvas, radians } => {
                CommandOutcome::from_flag(self.try_canvas_mut(canvas)?.set_pitch(radians))
            }
            C::Pan {
                canvas,
                delta,
                options,
            } => {
                self.try_canvas_mut(canvas)?
                    .pan(delta.x, delta.y, &options, now);
                CommandOutcome::Applied
            }
            C::ReleasePan { canvas, kinetic } => {
                CommandOutcome::Started(self.try_canvas_mut(canvas)?.release_pan(kinetic, now))
            }
            C::Pinch { canvas, a, b } => {
                self.try_canvas_mut(canvas)?.pinch(a.x, a.y, b.x, b.y, now);
                CommandOutcome::Applied
            }
            C::EndPinch { canvas } => {
                self.try_canvas_mut(canvas)?.end_pinch();
                CommandOutcome::Applied
            }
            C::FadeTo {
                canvas,
                opacity,
                direct,
            } => CommandOutcome::Started(self.try_canvas_mut(canvas)?.fade_to(opacity, direct, now)),
            C::SetArea {
                canvas,
                area,
                animate,
            } => CommandOutcome::from_flag(self.set_area(canvas, area, animate, now)?),
            C::SetZIndex { canvas, z_index } => {
                self.set_z_index(canvas, z_index)?;
                CommandOutcome::Applied
            }
            C::AddChild { parent, child } => {
                self.add_child(parent, child)?;
                CommandOutcome::Applied
            }
            C::Destroy { canvas } => {
                self.destroy(canvas)?;
                CommandOutcome::Applied
            }
            C::Resize {
                width,
                height,
                device_pixel_ratio,
            } => {
                self.resize(width, height, device_pixel_ratio);
                CommandOutcome::Applied
            }
        };
        Ok(outcome)
    }
}
