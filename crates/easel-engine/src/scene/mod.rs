//! Per-frame draw command lists.
//!
//! Responsibilities:
//! - value-typed draw commands (mesh reference, transform, depth, material)
//! - the opaque/transparent split the frame composer submits in that order
//! - painter's-order depth assignment

mod cmd;
mod depth;
mod list;

pub use cmd::{DrawCmd, MeshRef};
pub use depth::{Depth, DepthCounter, DEPTH_STEP};
pub use list::{CommandList, FrameLists};
