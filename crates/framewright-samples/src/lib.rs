//! Sample scenes for the framewright engine.
//!
//! Two alternative configurations of the same frame controller:
//! - [`triangle::NormalMappedTriangle`]: a normal-mapped triangle under a tumbling light
//! - [`starfield::StarfieldScene`]: a scrolling starfield with an animated sprite

pub mod animated_texture;
pub mod cli;
pub mod content;
pub mod scrolling_background;
pub mod starfield;
pub mod triangle;
