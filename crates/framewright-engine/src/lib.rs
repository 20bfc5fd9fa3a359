//! Framewright engine crate.
//!
//! Device-resource lifecycle, step timer and frame controller, plus the winit
//! runtime and the small set of wgpu render helpers the samples draw with.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
