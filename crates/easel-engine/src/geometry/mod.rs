//! Mesh generation.
//!
//! Builders are pure functions over [`Mesh`] buffers:
//! - shared meshes (unit quad, filled circle) are built in local space once and
//!   placed by the command transform
//! - outline meshes (wired circle, wired rect, line) are built directly in canvas
//!   space into a [`ScratchPool`] mesh, because they depend on the live transform and
//!   line width

mod circle;
mod line;
mod mesh;
mod outline;
mod pool;
mod quad;

pub use circle::{fill_circle, wire_circle, MIN_CIRCLE_RESOLUTION};
pub use line::line_segment;
pub use mesh::{Mesh, MeshId};
pub use outline::wire_rect;
pub use pool::{ScratchId, ScratchPool};
pub use quad::unit_quad;
