use glam::{Mat4, Vec3};

use crate::coords::Viewport;

/// Renderer-facing context (device/queue + back-buffer format + viewport).
///
/// `frame_index` changes once per acquired frame. Uploads staged through
/// `queue.write_buffer` land before the frame's commands run, so renderers
/// append into their buffers for the whole frame and rewind only when the
/// index changes.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // physical px
    pub frame_index: u64,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        frame_index: u64,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            frame_index,
        }
    }

    #[inline]
    pub fn pixel_projection(&self) -> Mat4 {
        pixel_projection(self.viewport)
    }
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }

    /// Opens a pass that draws over the already-cleared back buffer.
    pub fn load_pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Maps pixel coordinates (top-left origin, +Y down) to clip space.
///
/// `(0, 0)` lands on `(-1, 1)` and `(width, height)` on `(1, -1)`; z passes through.
pub fn pixel_projection(viewport: Viewport) -> Mat4 {
    let w = viewport.width.max(1.0);
    let h = viewport.height.max(1.0);
    Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.0))
        * Mat4::from_scale(Vec3::new(2.0 / w, -2.0 / h, 1.0))
}
