//! Mediaboard browser host
//!
//! Mounts a canvas in a page, decodes image and video media for the core
//! scene, draws it on demand and routes pointer input to it. Everything here
//! is specific to `wasm32`; native builds only see the core crate.

#[cfg(target_arch = "wasm32")]
mod board;
#[cfg(target_arch = "wasm32")]
mod loader;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use board::MediaBoard;
#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
