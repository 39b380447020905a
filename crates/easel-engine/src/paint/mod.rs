//! Color and material model.
//!
//! Scope:
//! - color representation (linear premultiplied alpha)
//! - materials attached to draw commands (solid or textured)

mod color;
mod material;

pub use color::Color;
pub(crate) use color::{linear_to_srgb, srgb_to_linear};
pub use material::{Material, TextureSource};
