//! Integer-handle API for hosts that cannot hold Rust references.
//!
//! Viewers and canvases are addressed by `f64` handles (the slotmap FFI
//! key, which stays exact below 2^53). Calls take handles plus primitive
//! arguments and answer with a primitive or by filling one of the shared
//! buffers. Stale or malformed handles never panic: the call is a no-op
//! answering `-1`, `NaN` or `false`, and a warning is logged.
//!
//! Buffer layouts:
//!
//! - view: `[center_x, center_y, width, height]`
//! - point: `[x, y, scale, depth]` (`unproject` fills the first two)
//! - matrix: 16 column-major entries
//! - tiles: [`TILE_RECORD_LEN`] × i32 per tile,
//!   `(frame, layer, column, row, kind, rank)`
//! - draw: [`DRAW_RECORD_LEN`] × f64 per canvas, `(canvas, depth, x, y,
//!   width, height, opacity, z_index, center_x, center_y, view_width,
//!   view_height)`

use slotmap::{new_key_type, Key, KeyData, SlotMap};

#[cfg(feature = "web")]
use wasm_bindgen::prelude::wasm_bindgen;

use crate::animation::{AnimationStatus, AnimationTicket};
use crate::camera::{Placement, Projection, Rect, View};
use crate::canvas::{
    Canvas, CanvasState, FlyToOptions, ImageDescriptor, PanOptions, SetViewOptions, ZoomOptions,
};
use crate::engine::{CanvasId, Viewer};
use crate::options::Options;
use crate::util::easing::Easing;

/// Sentinel for "no handle" and "no ticket".
pub const INVALID_HANDLE: f64 = -1.0;

/// i32 values per tile record.
pub const TILE_RECORD_LEN: usize = 6;

/// f64 values per draw record.
pub const DRAW_RECORD_LEN: usize = 12;

/// Largest integer an f64 holds exactly.
const MAX_EXACT: f64 = 9_007_199_254_740_991.0;

new_key_type! {
    struct ViewerKey;
}

fn encode<K: Key>(key: K) -> f64 {
    key.data().as_ffi() as f64
}

fn decode<K: Key + From<KeyData>>(handle: f64) -> Option<K> {
    if !(0.0..=MAX_EXACT).contains(&handle) || handle.fract() != 0.0 {
        return None;
    }
    Some(KeyData::from_ffi(handle as u64).into())
}

fn ticket_value(ticket: AnimationTicket) -> f64 {
    ticket.raw() as f64
}

fn state_code(state: CanvasState) -> i32 {
    match state {
        CanvasState::Uninitialized => 0,
        CanvasState::Ready => 1,
        CanvasState::Animating => 2,
        CanvasState::Idle => 3,
        CanvasState::Destroyed => 4,
    }
}

/// Every viewer of one host page plus the shared result buffers.
#[cfg_attr(feature = "web", wasm_bindgen)]
#[derive(Debug, Default)]
pub struct HandleTable {
    viewers: SlotMap<ViewerKey, Viewer>,
    view_buffer: [f64; 4],
    point_buffer: [f64; 4],
    matrix_buffer: [f64; 16],
    tile_buffer: Vec<i32>,
    draw_buffer: Vec<f64>,
}

// ── Lookup ──

impl HandleTable {
    fn viewer(&self, handle: f64) -> Option<&Viewer> {
        let found = decode::<ViewerKey>(handle).and_then(|k| self.viewers.get(k));
        if found.is_none() {
            log::warn!("stale viewer handle {handle}");
        }
        found
    }

    fn viewer_mut(&mut self, handle: f64) -> Option<&mut Viewer> {
        let found = decode::<ViewerKey>(handle).and_then(|k| self.viewers.get_mut(k));
        if found.is_none() {
            log::warn!("stale viewer handle {handle}");
        }
        found
    }

    fn canvas(&self, viewer: f64, canvas: f64) -> Option<&Canvas> {
        let found = self
            .viewer(viewer)?
            .canvas(decode::<CanvasId>(canvas)?);
        if found.is_none() {
            log::warn!("stale canvas handle {canvas}");
        }
        found
    }

    fn canvas_mut(&mut self, viewer: f64, canvas: f64) -> Option<&mut Canvas> {
        let id = decode::<CanvasId>(canvas);
        let found = id.and_then(|id| self.viewer_mut(viewer)?.canvas_mut(id));
        if found.is_none() {
            log::warn!("stale canvas handle {canvas}");
        }
        found
    }

    /// Run a ticket-returning instruction, or answer the sentinel.
    fn start(
        &mut self,
        viewer: f64,
        canvas: f64,
        op: impl FnOnce(&mut Canvas) -> AnimationTicket,
    ) -> f64 {
        self.canvas_mut(viewer, canvas)
            .map_or(INVALID_HANDLE, |c| ticket_value(op(c)))
    }

    fn read(&self, viewer: f64, canvas: f64, op: impl FnOnce(&Canvas) -> f64) -> f64 {
        self.canvas(viewer, canvas).map_or(f64::NAN, op)
    }

    fn insert_canvas(&mut self, viewer: f64, parent: f64, descriptor: ImageDescriptor) -> f64 {
        let parent = if parent < 0.0 {
            None
        } else {
            match decode::<CanvasId>(parent) {
                Some(id) => Some(id),
                None => return INVALID_HANDLE,
            }
        };
        let Some(v) = self.viewer_mut(viewer) else {
            return INVALID_HANDLE;
        };
        match v.create_canvas(descriptor, parent) {
            Ok(id) => encode(id),
            Err(e) => {
                log::warn!("create_canvas rejected: {e}");
                INVALID_HANDLE
            }
        }
    }

    /// Latest `get_view`/`last_view` result.
    #[must_use]
    pub fn view_buffer(&self) -> &[f64] {
        &self.view_buffer
    }

    /// Latest `project`/`unproject` result.
    #[must_use]
    pub fn point_buffer(&self) -> &[f64] {
        &self.point_buffer
    }

    /// Latest `transform_matrix` result.
    #[must_use]
    pub fn matrix_buffer(&self) -> &[f64] {
        &self.matrix_buffer
    }

    /// Latest `tile_plan` records.
    #[must_use]
    pub fn tile_buffer(&self) -> &[i32] {
        &self.tile_buffer
    }

    /// Latest `draw_plan` records.
    #[must_use]
    pub fn draw_buffer(&self) -> &[f64] {
        &self.draw_buffer
    }
}

#[cfg_attr(feature = "web", wasm_bindgen)]
impl HandleTable {
    /// Empty table.
    #[cfg_attr(feature = "web", wasm_bindgen(constructor))]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Viewers ─────────────────────────────────────────────────────

    /// New viewer with default options.
    pub fn create_viewer(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> f64 {
        encode(
            self.viewers
                .insert(Viewer::new(width, height, device_pixel_ratio, Options::default())),
        )
    }

    /// New viewer configured from a TOML options document.
    pub fn create_viewer_with_options(
        &mut self,
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        options_toml: &str,
    ) -> f64 {
        match Options::from_toml(options_toml) {
            Ok(options) => encode(
                self.viewers
                    .insert(Viewer::new(width, height, device_pixel_ratio, options)),
            ),
            Err(e) => {
                log::warn!("create_viewer rejected: {e}");
                INVALID_HANDLE
            }
        }
    }

    /// Drop a viewer and every canvas it owns.
    pub fn destroy_viewer(&mut self, viewer: f64) -> bool {
        decode::<ViewerKey>(viewer)
            .and_then(|k| self.viewers.remove(k))
            .is_some()
    }

    /// Element size or pixel ratio changed.
    pub fn resize(&mut self, viewer: f64, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        self.viewer_mut(viewer)
            .map(|v| v.resize(width, height, device_pixel_ratio))
            .is_some()
    }

    /// Advance a viewer to `now`. Bit 0: animating, bit 1: needs draw;
    /// `-1` for a stale handle.
    pub fn tick(&mut self, viewer: f64, now: f64) -> i32 {
        self.viewer_mut(viewer).map_or(-1, |v| {
            let report = v.tick(now);
            i32::from(report.animating) | (i32::from(report.needs_draw) << 1)
        })
    }

    /// Acknowledge a finished draw.
    pub fn confirm_draw(&mut self, viewer: f64) -> bool {
        self.viewer_mut(viewer).map(Viewer::confirm_draw).is_some()
    }

    /// Handle of the implicit root canvas.
    pub fn root(&self, viewer: f64) -> f64 {
        self.viewer(viewer)
            .map_or(INVALID_HANDLE, |v| encode(v.root()))
    }

    /// Fill the draw buffer; answers the record count.
    pub fn draw_plan(&mut self, viewer: f64) -> i32 {
        let Some(plan) = self.viewer(viewer).map(Viewer::draw_plan) else {
            return -1;
        };
        self.draw_buffer.clear();
        for item in &plan.items {
            self.draw_buffer.extend_from_slice(&[
                encode(item.canvas),
                f64::from(item.depth),
                item.region.x,
                item.region.y,
                item.region.width,
                item.region.height,
                item.opacity,
                f64::from(item.z_index),
                item.view.center_x,
                item.view.center_y,
                item.view.width,
                item.view.height,
            ]);
        }
        plan.items.len() as i32
    }

    // ── Canvas tree ─────────────────────────────────────────────────

    /// New image canvas under `parent` (negative for the root).
    /// `projection`: 0 flat, 1 360, 2 omni.
    pub fn create_canvas(
        &mut self,
        viewer: f64,
        parent: f64,
        width: f64,
        height: f64,
        tile_size: u32,
        projection: u32,
    ) -> f64 {
        let descriptor = ImageDescriptor {
            tile_size,
            ..ImageDescriptor::image(width, height, Projection::from_code(projection))
        };
        self.insert_canvas(viewer, parent, descriptor)
    }

    /// New canvas from a JSON image descriptor; missing fields default.
    pub fn create_canvas_json(&mut self, viewer: f64, parent: f64, descriptor: &str) -> f64 {
        match serde_json::from_str::<ImageDescriptor>(descriptor) {
            Ok(d) => self.insert_canvas(viewer, parent, d),
            Err(e) => {
                log::warn!("malformed image descriptor: {e}");
                INVALID_HANDLE
            }
        }
    }

    /// Remove a canvas; its children move to the root.
    pub fn destroy_canvas(&mut self, viewer: f64, canvas: f64) -> bool {
        let Some(id) = decode::<CanvasId>(canvas) else {
            return false;
        };
        self.viewer_mut(viewer)
            .is_some_and(|v| v.destroy(id).is_ok())
    }

    /// Re-parent `child` under `parent`.
    pub fn add_child(&mut self, viewer: f64, parent: f64, child: f64) -> bool {
        let (Some(parent), Some(child)) = (decode::<CanvasId>(parent), decode::<CanvasId>(child))
        else {
            return false;
        };
        self.viewer_mut(viewer)
            .is_some_and(|v| v.add_child(parent, child).is_ok())
    }

    /// Place a canvas inside its parent.
    pub fn set_area(
        &mut self,
        viewer: f64,
        canvas: f64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        animate: bool,
        now: f64,
    ) -> bool {
        let Some(id) = decode::<CanvasId>(canvas) else {
            return false;
        };
        self.viewer_mut(viewer).is_some_and(|v| {
            v.set_area(id, Rect::new(x, y, width, height), animate, now)
                .unwrap_or(false)
        })
    }

    /// Draw-order hint among siblings.
    pub fn set_z_index(&mut self, viewer: f64, canvas: f64, z_index: i32) -> bool {
        let Some(id) = decode::<CanvasId>(canvas) else {
            return false;
        };
        self.viewer_mut(viewer)
            .is_some_and(|v| v.set_z_index(id, z_index).is_ok())
    }

    /// Ease opacity; answers a ticket.
    pub fn fade_to(&mut self, viewer: f64, canvas: f64, opacity: f64, direct: bool, now: f64) -> f64 {
        self.start(viewer, canvas, |c| c.fade_to(opacity, direct, now))
    }

    // ── Camera ──────────────────────────────────────────────────────

    /// Jump to a view.
    pub fn set_view(
        &mut self,
        viewer: f64,
        canvas: f64,
        center_x: f64,
        center_y: f64,
        width: f64,
        height: f64,
        no_limit: bool,
        no_last_view: bool,
    ) -> bool {
        let view = View::new(center_x, center_y, width, height);
        let options = SetViewOptions {
            no_limit,
            no_last_view,
        };
        let Some(c) = self.canvas_mut(viewer, canvas) else {
            return false;
        };
        c.set_view(&view, &options);
        true
    }

    /// Copy the current view into the view buffer.
    pub fn get_view(&mut self, viewer: f64, canvas: f64) -> bool {
        let Some(view) = self.canvas(viewer, canvas).map(Canvas::view) else {
            return false;
        };
        self.view_buffer = view.to_array();
        true
    }

    /// Copy the recorded back-navigation view into the view buffer.
    pub fn last_view(&mut self, viewer: f64, canvas: f64) -> bool {
        let Some(view) = self.canvas(viewer, canvas).and_then(Canvas::last_view) else {
            return false;
        };
        self.view_buffer = view.to_array();
        true
    }

    /// Animate to a view. A negative or NaN `duration` derives it from the
    /// travel distance. `easing` is 0 ease, 1 ease-in, 2 ease-out or 3
    /// linear.
    pub fn fly_to(
        &mut self,
        viewer: f64,
        canvas: f64,
        center_x: f64,
        center_y: f64,
        width: f64,
        height: f64,
        duration: f64,
        is_jump: bool,
        limit_zoom: bool,
        easing: u32,
        now: f64,
    ) -> f64 {
        let view = View::new(center_x, center_y, width, height);
        let options = FlyToOptions {
            duration: (duration >= 0.0).then_some(duration),
            is_jump,
            limit_zoom,
            easing: Easing::from_code(easing),
            ..FlyToOptions::default()
        };
        self.start(viewer, canvas, |c| c.fly_to(&view, &options, now))
    }

    /// Zoom by `delta` powers of two around an element point, eased by
    /// the `fly_to` easing codes.
    pub fn zoom(
        &mut self,
        viewer: f64,
        canvas: f64,
        delta: f64,
        focus_x: f64,
        focus_y: f64,
        easing: u32,
        now: f64,
    ) -> f64 {
        let options = ZoomOptions {
            easing: Easing::from_code(easing),
            ..ZoomOptions::default()
        };
        self.start(viewer, canvas, |c| c.zoom(delta, focus_x, focus_y, &options, now))
    }

    /// Return to the recorded view.
    pub fn go_back(&mut self, viewer: f64, canvas: f64) -> bool {
        self.canvas_mut(viewer, canvas).is_some_and(Canvas::go_back)
    }

    /// Status code of a ticket: 0 pending, 1 completed, 2 interrupted,
    /// -1 unknown.
    pub fn status(&self, viewer: f64, canvas: f64, ticket: f64) -> i32 {
        let (Some(v), Some(id)) = (self.viewer(viewer), decode::<CanvasId>(canvas)) else {
            return AnimationStatus::Unknown.code();
        };
        if !(1.0..=MAX_EXACT).contains(&ticket) || ticket.fract() != 0.0 {
            return AnimationStatus::Unknown.code();
        }
        v.status(id, AnimationTicket(ticket as u64)).code()
    }

    /// Lifecycle code: 0 uninitialized, 1 ready, 2 animating, 3 idle,
    /// -1 stale.
    pub fn canvas_state(&self, viewer: f64, canvas: f64) -> i32 {
        self.canvas(viewer, canvas)
            .map_or(-1, |c| state_code(c.state()))
    }

    // ── Gestures ────────────────────────────────────────────────────

    /// Drag by a pixel delta.
    pub fn pan(&mut self, viewer: f64, canvas: f64, dx: f64, dy: f64, now: f64) -> bool {
        let Some(c) = self.canvas_mut(viewer, canvas) else {
            return false;
        };
        c.pan(dx, dy, &PanOptions::default(), now);
        true
    }

    /// Pointer released; answers the glide ticket.
    pub fn release_pan(&mut self, viewer: f64, canvas: f64, kinetic: bool, now: f64) -> f64 {
        self.start(viewer, canvas, |c| c.release_pan(kinetic, now))
    }

    /// Two-finger positions.
    pub fn pinch(
        &mut self,
        viewer: f64,
        canvas: f64,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        now: f64,
    ) -> bool {
        let Some(c) = self.canvas_mut(viewer, canvas) else {
            return false;
        };
        c.pinch(x0, y0, x1, y1, now);
        true
    }

    /// Fingers lifted.
    pub fn end_pinch(&mut self, viewer: f64, canvas: f64) -> bool {
        let Some(c) = self.canvas_mut(viewer, canvas) else {
            return false;
        };
        c.end_pinch();
        true
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Project an image point into the point buffer.
    pub fn project(&mut self, viewer: f64, canvas: f64, x: f64, y: f64, absolute: bool) -> bool {
        let Some(p) = self.canvas(viewer, canvas).map(|c| c.project(x, y, absolute)) else {
            return false;
        };
        self.point_buffer = [p.x, p.y, p.scale, p.depth];
        true
    }

    /// Unproject an element point into the first two point-buffer slots.
    pub fn unproject(
        &mut self,
        viewer: f64,
        canvas: f64,
        sx: f64,
        sy: f64,
        allow_out_of_bounds: bool,
    ) -> bool {
        let Some(p) = self
            .canvas(viewer, canvas)
            .map(|c| c.unproject(sx, sy, allow_out_of_bounds))
        else {
            return false;
        };
        self.point_buffer[0] = p.x;
        self.point_buffer[1] = p.y;
        true
    }

    /// Placement matrix for an embed anchored at `(x, y)`; see
    /// [`Placement`] for the parameters.
    pub fn transform_matrix(
        &mut self,
        viewer: f64,
        canvas: f64,
        x: f64,
        y: f64,
        scale: f64,
        radius: f64,
        rot_x: f64,
        rot_y: f64,
        rot_z: f64,
        translate_y: f64,
        scale_x: f64,
        scale_y: f64,
    ) -> bool {
        let placement = Placement {
            x,
            y,
            scale,
            radius,
            rot_x,
            rot_y,
            rot_z,
            translate_y,
            scale_x,
            scale_y,
        };
        let Some(m) = self
            .canvas(viewer, canvas)
            .map(|c| c.transform_matrix(&placement))
        else {
            return false;
        };
        self.matrix_buffer = m.to_cols_array();
        true
    }

    /// Yaw in radians, NaN when not a 360 canvas.
    pub fn yaw(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, |c| c.yaw().unwrap_or(f64::NAN))
    }

    /// Pitch in radians, NaN when not a 360 canvas.
    pub fn pitch(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, |c| c.pitch().unwrap_or(f64::NAN))
    }

    /// Turn a 360 canvas to a yaw.
    pub fn set_yaw(&mut self, viewer: f64, canvas: f64, radians: f64) -> bool {
        self.canvas_mut(viewer, canvas)
            .is_some_and(|c| c.set_yaw(radians))
    }

    /// Tilt a 360 canvas to a pitch.
    pub fn set_pitch(&mut self, viewer: f64, canvas: f64, radians: f64) -> bool {
        self.canvas_mut(viewer, canvas)
            .is_some_and(|c| c.set_pitch(radians))
    }

    /// Displayed omni frame (`ring * frame_count + frame`), or -1.
    pub fn omni_frame(&self, viewer: f64, canvas: f64) -> f64 {
        self.canvas(viewer, canvas)
            .and_then(|c| match c.projection() {
                Projection::Omni(params) => c
                    .omni_frame()
                    .map(|(frame, ring)| f64::from(ring * params.frame_count + frame)),
                _ => None,
            })
            .unwrap_or(INVALID_HANDLE)
    }

    /// Screen pixels per image pixel.
    pub fn scale(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, Canvas::scale)
    }

    /// Lowest allowed scale.
    pub fn min_scale(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, Canvas::min_scale)
    }

    /// Highest allowed scale.
    pub fn max_scale(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, Canvas::max_scale)
    }

    /// Scale that fits (or covers) the region.
    pub fn fit_scale(&self, viewer: f64, canvas: f64) -> f64 {
        self.read(viewer, canvas, Canvas::fit_scale)
    }

    /// At the maximum scale.
    pub fn is_zoomed_in(&self, viewer: f64, canvas: f64) -> bool {
        self.canvas(viewer, canvas).is_some_and(Canvas::is_zoomed_in)
    }

    /// At the minimum (or, with `strict`, exactly the fit) scale.
    pub fn is_zoomed_out(&self, viewer: f64, canvas: f64, strict: bool) -> bool {
        self.canvas(viewer, canvas)
            .is_some_and(|c| c.is_zoomed_out(strict))
    }

    /// Fill the tile buffer; answers the tile count.
    pub fn tile_plan(&mut self, viewer: f64, canvas: f64) -> i32 {
        let Some(id) = decode::<CanvasId>(canvas) else {
            return -1;
        };
        let Some(plan) = self.viewer_mut(viewer).and_then(|v| v.tile_plan(id)) else {
            return -1;
        };
        self.tile_buffer = plan.to_records();
        plan.tiles.len() as i32
    }
}
