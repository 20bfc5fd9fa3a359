//! Screen-space geometry shared by the device layer and the renderers.
//!
//! Canonical CPU space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Vector math uses `glam`.

mod rect;
mod viewport;

pub use rect::Rect;
pub use viewport::{OutputSize, Viewport};
