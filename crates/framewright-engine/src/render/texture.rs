use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use glam::Vec2;

use super::RenderCtx;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// How texel values are interpreted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureKind {
    /// Colour data stored in sRGB; sampled values are linearized.
    Color,
    /// Data stored linearly (normal maps, masks).
    Linear,
}

impl TextureKind {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A sampled 2D texture.
///
/// Device-dependent: a `Texture` is only valid for the device that created it.
pub struct Texture {
    id: u64,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba8(
        ctx: &RenderCtx<'_>,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
        kind: TextureKind,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture `{label}` has zero size");
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            pixels.len() == expected,
            "texture `{label}`: expected {expected} bytes of RGBA8, got {}",
            pixels.len()
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: kind.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            _texture: texture,
            view,
            width,
            height,
        })
    }

    /// Uploads a decoded image.
    pub fn from_image(
        ctx: &RenderCtx<'_>,
        label: &str,
        image: &image::RgbaImage,
        kind: TextureKind,
    ) -> Result<Self> {
        Self::from_rgba8(ctx, label, image.width(), image.height(), image.as_raw(), kind)
    }

    /// Decodes an image file (any format enabled on the `image` crate) and uploads it.
    pub fn from_path(ctx: &RenderCtx<'_>, path: &Path, kind: TextureKind) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();

        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );

        Self::from_image(ctx, &path.display().to_string(), &image, kind)
    }

    /// Process-unique identity, used to batch draws by texture.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}
