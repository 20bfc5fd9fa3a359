use crate::render::RenderTarget;

/// Represents a single acquired frame.
///
/// The colour target has already been cleared when the frame is handed out.
/// This object is short-lived and must be presented promptly; holding the
/// surface texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Borrows the encoder and back-buffer view for a renderer.
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.encoder, &self.view)
    }
}
