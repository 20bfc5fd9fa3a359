//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the `DeviceResources` contract consumed by the frame controller
//! - the wgpu implementation of that contract (`Gpu`)
//! - detecting device loss and replaying the lost/restored notification pair

mod frame;
mod gpu;
mod init;
mod resources;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use resources::{DeviceNotify, DeviceResources};
pub use surface::SurfaceErrorAction;
