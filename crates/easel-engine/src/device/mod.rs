//! GPU device and window surface.
//!
//! Creates the wgpu device/queue, configures the swapchain and hands out one
//! encoder per frame. Rendering itself lives in `render`.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
