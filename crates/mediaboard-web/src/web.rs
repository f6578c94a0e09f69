//! WebAssembly entry point.

use wasm_bindgen::prelude::*;

/// Install the panic hook and console logger when the module is instantiated.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(log::Level::Info).expect("Failed to initialize logger");

    log::info!("Mediaboard module loaded");
}

/// Convert a core error into a JS exception value.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

pub(crate) fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| js_error("no global window"))
}

pub(crate) fn document() -> Result<web_sys::Document, JsValue> {
    window()?.document().ok_or_else(|| js_error("window has no document"))
}

/// Schedule `callback` for the next animation frame.
pub(crate) fn request_animation_frame(callback: &js_sys::Function) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback)
}
