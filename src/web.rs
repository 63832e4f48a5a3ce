//! Browser bindings.
//!
//! [`HandleTable`] is exported to JavaScript directly; this module adds
//! the module start hook and typed-array copies of the shared buffers.

use js_sys::{Float64Array, Int32Array};
use wasm_bindgen::prelude::wasm_bindgen;

use crate::interop::HandleTable;

/// Install the console logger and panic hook.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("console logger already installed");
    }
}

#[wasm_bindgen]
impl HandleTable {
    /// View buffer as a `Float64Array`.
    pub fn view_array(&self) -> Float64Array {
        Float64Array::from(self.view_buffer())
    }

    /// Point buffer as a `Float64Array`.
    pub fn point_array(&self) -> Float64Array {
        Float64Array::from(self.point_buffer())
    }

    /// Matrix buffer, ready for `matrix3d()`.
    pub fn matrix_array(&self) -> Float64Array {
        Float64Array::from(self.matrix_buffer())
    }

    /// Tile records as an `Int32Array`.
    pub fn tile_array(&self) -> Int32Array {
        Int32Array::from(self.tile_buffer())
    }

    /// Draw records as a `Float64Array`.
    pub fn draw_array(&self) -> Float64Array {
        Float64Array::from(self.draw_buffer())
    }
}
