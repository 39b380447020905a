//! Window and frame loop.
//!
//! Owns the `winit` event loop and window, binds them to the GPU layer and
//! drives the canvas once per redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
