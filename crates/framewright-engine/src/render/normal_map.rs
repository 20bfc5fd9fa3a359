use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::paint::Color;

use super::common::{
    cull_none, dynamic_uniform_bind_group, dynamic_uniform_layout_entry, linear_clamp_sampler,
    sampler_layout_entry, texture_layout_entry, uniform_offset_alignment,
};
use super::stream::StreamBuffer;
use super::{RenderCtx, Texture};

/// Vertex with position, normal and one texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormalTexture {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl VertexPositionNormalTexture {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct NormalMapParams {
    projection: [[f32; 4]; 4],
    light_direction: [f32; 4],
    light_diffuse: [f32; 4],
    ambient: [f32; 4],
}

/// Key light direction and ambient term of the standard three-light rig.
const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::new(-0.526_540_8, -0.573_576_5, -0.627_506_9);
const DEFAULT_LIGHT_DIFFUSE: Color = Color::from_premul(1.0, 0.960_784_4, 0.807_843_2, 1.0);
const DEFAULT_AMBIENT: Color = Color::from_premul(0.053_333_33, 0.098_823_53, 0.181_960_8, 1.0);

/// Textured, normal-mapped surface lit by one directional light.
///
/// Pipeline state is fixed: opaque blend, no depth test, no culling,
/// linear-clamp sampling. Consumes [`VertexPositionNormalTexture`].
pub struct NormalMapEffect {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    params_layout: wgpu::BindGroupLayout,
    params: StreamBuffer,
    params_bind_group: Option<wgpu::BindGroup>,
    params_alignment: u64,
    texture_bind_group: Option<wgpu::BindGroup>,

    projection: Mat4,
    light_direction: Vec3,
    light_diffuse: Color,
    ambient: Color,
}

impl NormalMapEffect {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("framewright normal map shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/normal_map.wgsl").into()),
        });

        let params_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("framewright normal map params bgl"),
                entries: &[dynamic_uniform_layout_entry::<NormalMapParams>(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                )],
            });

        let texture_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("framewright normal map texture bgl"),
                entries: &[
                    texture_layout_entry(0),
                    texture_layout_entry(1),
                    sampler_layout_entry(2),
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("framewright normal map pipeline layout"),
                bind_group_layouts: &[&params_layout, &texture_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("framewright normal map pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[VertexPositionNormalTexture::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: cull_none(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let params_alignment = uniform_offset_alignment(ctx.device);

        Self {
            pipeline,
            texture_layout,
            sampler: linear_clamp_sampler(ctx.device, "framewright normal map sampler"),
            params_layout,
            params: StreamBuffer::new(
                "framewright normal map params",
                wgpu::BufferUsages::UNIFORM,
                params_alignment * 16,
            ),
            params_bind_group: None,
            params_alignment,
            texture_bind_group: None,
            projection: Mat4::IDENTITY,
            light_direction: Vec3::NEG_Z,
            light_diffuse: Color::WHITE,
            ambient: Color::BLACK,
        }
    }

    /// Binds the albedo texture and its tangent-space normal map.
    pub fn set_textures(&mut self, ctx: &RenderCtx<'_>, albedo: &Texture, normal_map: &Texture) {
        self.texture_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("framewright normal map textures"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(albedo.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal_map.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
    }

    /// Key light of the standard rig: warm white from the upper left.
    pub fn enable_default_lighting(&mut self) {
        self.light_direction = DEFAULT_LIGHT_DIRECTION;
        self.light_diffuse = DEFAULT_LIGHT_DIFFUSE;
        self.ambient = DEFAULT_AMBIENT;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Direction the light travels in (not the direction towards the light).
    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.light_direction = direction.normalize_or(Vec3::NEG_Z);
    }

    pub fn set_light_diffuse_color(&mut self, color: Color) {
        self.light_diffuse = color;
    }

    pub fn set_ambient_color(&mut self, color: Color) {
        self.ambient = color;
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// Uploads parameters and binds pipeline state on `rpass`.
    ///
    /// Each call stages its own copy of the parameters, so several applies
    /// with different settings can be recorded in one frame.
    /// Returns `false` (binding nothing) until textures have been set.
    pub fn apply(&mut self, ctx: &RenderCtx<'_>, rpass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(textures) = self.texture_bind_group.as_ref() else {
            return false;
        };

        let params = NormalMapParams {
            projection: self.projection.to_cols_array_2d(),
            light_direction: self.light_direction.extend(0.0).to_array(),
            light_diffuse: self.light_diffuse.to_array(),
            ambient: self.ambient.to_array(),
        };
        let Some(upload) = self
            .params
            .upload(ctx, bytemuck::bytes_of(&params), self.params_alignment)
        else {
            return false;
        };
        if upload.replaced || self.params_bind_group.is_none() {
            self.params_bind_group = Some(dynamic_uniform_bind_group::<NormalMapParams>(
                ctx.device,
                "framewright normal map params",
                &self.params_layout,
                upload.buffer,
            ));
        }
        let offset = upload.range.start as u32;
        let Some(params_bind_group) = self.params_bind_group.as_ref() else {
            return false;
        };

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, params_bind_group, &[offset]);
        rpass.set_bind_group(1, textures, &[]);
        true
    }
}
