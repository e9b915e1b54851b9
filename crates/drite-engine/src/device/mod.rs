//! wgpu device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - creating & configuring the Surface (swapchain)
//! - acquiring, clearing and presenting frames behind `GraphicsContext`

mod context;
mod frame;
mod init;
mod surface;

pub use context::WgpuContext;
pub use init::GpuInit;
