//! Coordinate and geometry types shared across the canvas and the renderer.
//!
//! Canonical CPU space:
//! - canvas units (resolution independent)
//! - origin top-left
//! - +X right, +Y down
//!
//! [`CanvasMapping`] converts canvas units to device pixels; the renderer converts
//! device pixels to NDC in shaders.

mod affine;
mod mapping;
mod rect;
mod vec2;

pub use affine::Affine;
pub use mapping::CanvasMapping;
pub use rect::Rect;
pub use vec2::Vec2;
