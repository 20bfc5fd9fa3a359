/// Device and swap-chain options for [`Gpu`](super::Gpu).
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,

    /// Pick an sRGB back-buffer format when the surface offers one.
    pub prefer_srgb: bool,

    /// `Fifo` (vsync) is the only mode every backend must support.
    pub present_mode: wgpu::PresentMode,

    /// Requested composite alpha mode; falls back to the first supported one.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Format of the depth/stencil buffer cleared each frame; `None` for no depth buffer.
    pub depth_format: Option<wgpu::TextureFormat>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Back buffers queued ahead of the display. A hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            depth_format: Some(wgpu::TextureFormat::Depth24PlusStencil8),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
