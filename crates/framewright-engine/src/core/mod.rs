//! Frame controller and the scene contract it drives.
//!
//! The host (see `window::Runtime`) only talks to [`FrameController`]; the
//! controller owns the device manager, the step timer and the scene, and
//! turns device-lifetime notifications into scene resource (re)creation.

mod controller;
mod error;
mod scene;

pub use controller::{FrameController, LifecycleState, default_size};
pub use error::LifecycleError;
pub use scene::Scene;
