//! Browser bindings for backdrop
//!
//! This crate provides WASM bindings for mounting the animated backgrounds
//! on HTML canvases of a landing page.

use wasm_bindgen::prelude::*;

pub mod canvas2d;
pub mod mount;
mod pointer_bus;

pub use canvas2d::Canvas2dSurface;
pub use mount::{MountHandle, mount};

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Whether the browser exposes touch events (`ontouchstart` in window)
#[wasm_bindgen]
pub fn is_touch_capable() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
}
