//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and forwards platform events to a
//! [`FrameController`](crate::core::FrameController).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
