//! Colour representation shared by the device layer and the renderers.

pub mod color;

pub use color::Color;
