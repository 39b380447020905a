//! Immediate-mode drawing surface.
//!
//! [`Canvas`] is the engine's public drawing API: style and coordinate state,
//! the draw calls, and per-frame bookkeeping. It is GPU-free; the renderer
//! consumes the recorded [`FrameView`].

mod canvas;
mod config;
mod drawable;
mod frame;
mod scope;

pub use canvas::Canvas;
pub use config::{CanvasConfig, FrameStats, CIRCLE_TTL, TEXT_TTL};
pub use drawable::Drawable;
pub use frame::FrameView;
pub use scope::{CoordinateScope, StyleScope};
