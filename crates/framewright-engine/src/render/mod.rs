//! GPU rendering helpers used by scenes.
//!
//! Each helper owns its own GPU resources (pipelines, buffers) and is therefore
//! a device-dependent resource: scenes create them when the device appears and
//! drop them when it is lost.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC with a pixel projection matrix.

mod common;
mod ctx;
mod normal_map;
mod primitive_batch;
mod sprite_batch;
mod stream;
mod texture;

pub use ctx::{RenderCtx, RenderTarget, pixel_projection};
pub use normal_map::{NormalMapEffect, VertexPositionNormalTexture};
pub use primitive_batch::PrimitiveBatch;
pub use sprite_batch::{Sprite, SpriteBatch, SpriteBatchPass};
pub use texture::{Texture, TextureKind};
