//! Browser front end of the Spine skeleton viewer.
//!
//! [`SpineBackend`] plugs the `spine2d` runtime into `spine-viewer`; the `web` module binds the
//! page (file input, selects, buttons, canvas) and renders through `spine2d-wgpu`.

mod backend;

pub use backend::*;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
mod web {
    // The page glue only exists on wasm32; native builds keep the backend and its tests.
}

#[cfg(test)]
mod backend_tests;
