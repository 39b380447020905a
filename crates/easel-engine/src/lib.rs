//! Easel engine crate.
//!
//! An immediate-mode 2D canvas over wgpu: callers issue draw calls every frame
//! against a fixed logical resolution, and the engine caches geometry, orders
//! draws, and letterboxes the canvas onto whatever surface it gets.

pub mod asset;
pub mod cache;
pub mod canvas;
pub mod coords;
pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod style;
pub mod text;
pub mod time;
pub mod window;
