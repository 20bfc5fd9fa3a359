use anyhow::{Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use framewright_engine::core::Scene;
use framewright_engine::device::{DeviceResources, Gpu, GpuFrame};
use framewright_engine::paint::Color;
use framewright_engine::render::{
    NormalMapEffect, PrimitiveBatch, Texture, TextureKind, VertexPositionNormalTexture,
    pixel_projection,
};
use framewright_engine::time::StepTimer;

use crate::content::{self, ContentSource};

/// One textured triangle, lit through a normal map by a tumbling light.
pub struct NormalMappedTriangle {
    content: ContentSource,
    resources: Option<TriangleResources>,
    projection: Mat4,
    light_direction: Vec3,
}

struct TriangleResources {
    effect: NormalMapEffect,
    batch: PrimitiveBatch<VertexPositionNormalTexture>,
    _albedo: Texture,
    _normal_map: Texture,
}

impl NormalMappedTriangle {
    pub fn new(content: ContentSource) -> Self {
        Self {
            content,
            resources: None,
            projection: Mat4::IDENTITY,
            light_direction: light_direction_at(0.0),
        }
    }
}

impl Scene<Gpu> for NormalMappedTriangle {
    fn create_device_dependent_resources(&mut self, gpu: &Gpu) -> Result<()> {
        let ctx = gpu.render_ctx()?;

        let albedo = self.content.texture(&ctx, content::ROCKS, TextureKind::Color)?;
        let normal_map = self
            .content
            .texture(&ctx, content::ROCKS_NORMAL_MAP, TextureKind::Linear)?;

        let mut effect = NormalMapEffect::new(&ctx);
        effect.set_textures(&ctx, &albedo, &normal_map);
        effect.enable_default_lighting();
        effect.set_light_diffuse_color(Color::GRAY);

        self.resources = Some(TriangleResources {
            effect,
            batch: PrimitiveBatch::new(),
            _albedo: albedo,
            _normal_map: normal_map,
        });
        Ok(())
    }

    fn create_window_size_dependent_resources(&mut self, gpu: &Gpu) -> Result<()> {
        self.projection = pixel_projection(gpu.viewport());
        if let Some(res) = self.resources.as_mut() {
            res.effect.set_projection(self.projection);
        }
        Ok(())
    }

    fn release_device_dependent_resources(&mut self) {
        self.resources = None;
    }

    fn update(&mut self, timer: &StepTimer) {
        self.light_direction = light_direction_at(timer.total_seconds() as f32);
    }

    fn render(&mut self, gpu: &Gpu, frame: &mut GpuFrame) -> Result<()> {
        let res = self
            .resources
            .as_mut()
            .context("triangle rendered without device resources")?;
        let ctx = gpu.render_ctx()?;

        res.effect.set_light_direction(self.light_direction);

        let mut target = frame.target();
        let mut rpass = target.load_pass("framewright triangle");
        if !res.effect.apply(&ctx, &mut rpass) {
            return Ok(());
        }

        let [v1, v2, v3] = triangle_vertices();
        res.batch.begin();
        res.batch.draw_triangle(v1, v2, v3);
        res.batch.end(&ctx, &mut rpass);
        Ok(())
    }
}

/// Light direction after `seconds` of tumbling.
///
/// The `(1, 1, 1)` vector is rolled, then pitched, then yawed. The pitch
/// angle drives the yaw axis and vice versa.
pub fn light_direction_at(seconds: f32) -> Vec3 {
    let yaw = seconds * 0.4;
    let pitch = seconds * 0.7;
    let roll = seconds * 1.1;

    let rotation = Quat::from_euler(EulerRot::YXZ, pitch, yaw, roll);
    rotation * Vec3::ONE
}

/// The triangle in pixel space, facing the viewer.
pub fn triangle_vertices() -> [VertexPositionNormalTexture; 3] {
    [
        VertexPositionNormalTexture::new(Vec3::new(400.0, 150.0, 0.0), Vec3::NEG_Z, Vec2::new(0.5, 0.0)),
        VertexPositionNormalTexture::new(Vec3::new(600.0, 450.0, 0.0), Vec3::NEG_Z, Vec2::new(1.0, 1.0)),
        VertexPositionNormalTexture::new(Vec3::new(200.0, 450.0, 0.0), Vec3::NEG_Z, Vec2::new(0.0, 1.0)),
    ]
}
