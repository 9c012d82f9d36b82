//! wgpu device and window surface.
//!
//! [`Gpu`] owns the device, queue and configured surface of one window and hands
//! out [`GpuFrame`]s to render into.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
