//! wgpu renderer for recorded canvas frames.
//!
//! Conventions:
//! - meshes and transforms arrive in canvas units; a single uniform maps canvas
//!   units to clip space through the letterbox mapping
//! - colors and textures are premultiplied alpha
//! - the offscreen target matches the surface format and size

mod common;
mod composer;
mod ctx;
mod meshes;
mod resources;
mod textures;

pub use composer::FrameComposer;
pub use ctx::{RenderCtx, RenderTarget};
pub use resources::Resources;
