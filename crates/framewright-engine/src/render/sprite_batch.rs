use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{Mat2, Vec2};

use crate::coords::Rect;
use crate::paint::Color;

use super::common::{
    cull_none, dynamic_uniform_bind_group, dynamic_uniform_layout_entry, linear_clamp_sampler,
    premul_alpha_blend, sampler_layout_entry, texture_layout_entry, uniform_offset_alignment,
    vertex_stream_min_size,
};
use super::stream::StreamBuffer;
use super::{RenderCtx, RenderTarget, Texture};

/// One textured quad.
///
/// `position` is where `origin` (in source-rect pixels) lands on screen.
/// Rotation is in radians, clockwise on screen (+Y down).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    /// Source rectangle in texture pixels; `None` uses the whole texture.
    pub source: Option<Rect>,
    pub color: Color,
    pub rotation: f32,
    pub origin: Vec2,
    pub scale: Vec2,
}

impl Sprite {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            source: None,
            color: Color::WHITE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }

    pub fn source(mut self, rect: Rect) -> Self {
        self.source = Some(rect);
        self
    }

    pub fn origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn tint(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Corner vertices in order top-left, top-right, bottom-right, bottom-left.
    fn corners(&self, texture_size: Vec2) -> [SpriteVertex; 4] {
        let src = self
            .source
            .unwrap_or(Rect::new(0.0, 0.0, texture_size.x, texture_size.y))
            .normalized();
        let (uv0, uv1) = src.to_uv(texture_size);

        let w = src.width();
        let h = src.height();
        let local = [
            Vec2::new(0.0, 0.0),
            Vec2::new(w, 0.0),
            Vec2::new(w, h),
            Vec2::new(0.0, h),
        ];
        let uvs = [
            Vec2::new(uv0.x, uv0.y),
            Vec2::new(uv1.x, uv0.y),
            Vec2::new(uv1.x, uv1.y),
            Vec2::new(uv0.x, uv1.y),
        ];

        let rot = Mat2::from_angle(self.rotation);
        let color = self.color.to_array();

        std::array::from_fn(|i| {
            let p = self.position + rot * ((local[i] - self.origin) * self.scale);
            SpriteVertex {
                position: p.to_array(),
                uv: uvs[i].to_array(),
                color,
            }
        })
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct SpriteVertex {
    position: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl SpriteVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteGlobals {
    projection: [[f32; 4]; 4],
}

/// Batched sprite renderer (premultiplied alpha, linear-clamp sampling).
///
/// Device-dependent: create it when the device appears and drop it on loss.
/// Any number of `begin`/`end` passes may be recorded per frame.
pub struct SpriteBatch {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    texture_bind_groups: BindGroupCache<wgpu::BindGroup>,

    globals_layout: wgpu::BindGroupLayout,
    globals: StreamBuffer,
    globals_bind_group: Option<wgpu::BindGroup>,
    globals_alignment: u64,

    vbo: StreamBuffer,
    scratch: Vec<SpriteVertex>,
}

impl SpriteBatch {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("framewright sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let globals_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("framewright sprite globals bgl"),
                entries: &[dynamic_uniform_layout_entry::<SpriteGlobals>(
                    0,
                    wgpu::ShaderStages::VERTEX,
                )],
            });

        let texture_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("framewright sprite texture bgl"),
                entries: &[texture_layout_entry(0), sampler_layout_entry(1)],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("framewright sprite pipeline layout"),
                bind_group_layouts: &[&globals_layout, &texture_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("framewright sprite pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[SpriteVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: cull_none(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        let globals_alignment = uniform_offset_alignment(ctx.device);

        Self {
            pipeline,
            texture_layout,
            sampler: linear_clamp_sampler(ctx.device, "framewright sprite sampler"),
            texture_bind_groups: BindGroupCache::default(),
            globals_layout,
            globals: StreamBuffer::new(
                "framewright sprite globals",
                wgpu::BufferUsages::UNIFORM,
                globals_alignment * 16,
            ),
            globals_bind_group: None,
            globals_alignment,
            vbo: StreamBuffer::new(
                "framewright sprite vbo",
                wgpu::BufferUsages::VERTEX,
                vertex_stream_min_size::<SpriteVertex>() * 4,
            ),
            scratch: Vec::new(),
        }
    }

    /// Starts collecting sprites for one pass.
    pub fn begin<'t>(&mut self) -> SpriteBatchPass<'_, 't> {
        SpriteBatchPass {
            batch: self,
            sprites: Vec::new(),
        }
    }

    fn flush(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, sprites: &[(&Texture, Sprite)]) {
        self.scratch.clear();
        for (texture, sprite) in sprites {
            let [tl, tr, br, bl] = sprite.corners(texture.size());
            self.scratch.extend_from_slice(&[tl, tr, br, tl, br, bl]);
        }

        let globals = SpriteGlobals {
            projection: ctx.pixel_projection().to_cols_array_2d(),
        };
        let Some(globals_upload) =
            self.globals
                .upload(ctx, bytemuck::bytes_of(&globals), self.globals_alignment)
        else {
            return;
        };
        if globals_upload.replaced || self.globals_bind_group.is_none() {
            self.globals_bind_group = Some(dynamic_uniform_bind_group::<SpriteGlobals>(
                ctx.device,
                "framewright sprite globals",
                &self.globals_layout,
                globals_upload.buffer,
            ));
        }
        let globals_offset = globals_upload.range.start as u32;

        let Some(vertices) = self.vbo.upload(ctx, bytemuck::cast_slice(&self.scratch), 0) else {
            return;
        };

        // One draw per run of sprites sharing a texture, in submission order.
        let ids: Vec<u64> = sprites.iter().map(|(t, _)| t.id()).collect();
        let runs = texture_runs(&ids);
        for run in &runs {
            let texture = sprites[run.start].0;
            self.texture_bind_groups.touch(ctx.frame_index, texture.id(), || {
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("framewright sprite texture"),
                    layout: &self.texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(texture.view()),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            });
        }

        let Some(globals_bind_group) = self.globals_bind_group.as_ref() else {
            return;
        };

        let mut rpass = target.load_pass("framewright sprite pass");
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, globals_bind_group, &[globals_offset]);
        rpass.set_vertex_buffer(0, vertices.buffer.slice(vertices.range));

        for run in runs {
            let Some(bind_group) = self.texture_bind_groups.get(ids[run.start]) else {
                continue;
            };
            rpass.set_bind_group(1, bind_group, &[]);
            rpass.draw(run.start as u32 * 6..run.end as u32 * 6, 0..1);
        }
    }
}

/// Values keyed by texture id, dropped once their texture goes a whole frame
/// without being drawn.
#[derive(Debug)]
struct BindGroupCache<T> {
    frame: u64,
    entries: HashMap<u64, (u64, T)>,
}

impl<T> Default for BindGroupCache<T> {
    fn default() -> Self {
        Self {
            frame: 0,
            entries: HashMap::new(),
        }
    }
}

impl<T> BindGroupCache<T> {
    /// Marks `id` as used in `frame`, creating its value on first use.
    fn touch(&mut self, frame: u64, id: u64, create: impl FnOnce() -> T) {
        if frame != self.frame {
            let previous = self.frame;
            self.entries.retain(|_, (used, _)| *used == previous);
            self.frame = frame;
        }
        self.entries
            .entry(id)
            .and_modify(|(used, _)| *used = frame)
            .or_insert_with(|| (frame, create()));
    }

    fn get(&self, id: u64) -> Option<&T> {
        self.entries.get(&id).map(|(_, value)| value)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Sprites queued between `SpriteBatch::begin` and `end`.
pub struct SpriteBatchPass<'b, 't> {
    batch: &'b mut SpriteBatch,
    sprites: Vec<(&'t Texture, Sprite)>,
}

impl<'b, 't> SpriteBatchPass<'b, 't> {
    pub fn draw(&mut self, texture: &'t Texture, sprite: Sprite) {
        self.sprites.push((texture, sprite));
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Records one render pass drawing every queued sprite over `target`.
    pub fn end(self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.sprites.is_empty() {
            return;
        }
        self.batch.flush(ctx, target, &self.sprites);
    }
}

/// Splits a sequence of texture ids into runs of equal consecutive ids.
fn texture_runs(ids: &[u64]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=ids.len() {
        if i == ids.len() || ids[i] != ids[start] {
            if i > start {
                runs.push(start..i);
            }
            start = i;
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(v: &[SpriteVertex; 4]) -> Vec<Vec2> {
        v.iter().map(|v| Vec2::from_array(v.position)).collect()
    }

    #[test]
    fn full_texture_sprite_covers_texture_size() {
        let quad = Sprite::at(Vec2::new(10.0, 20.0)).corners(Vec2::new(64.0, 32.0));
        assert_eq!(
            positions(&quad),
            vec![
                Vec2::new(10.0, 20.0),
                Vec2::new(74.0, 20.0),
                Vec2::new(74.0, 52.0),
                Vec2::new(10.0, 52.0),
            ]
        );
        assert_eq!(quad[0].uv, [0.0, 0.0]);
        assert_eq!(quad[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn source_rect_selects_uv_window_and_size() {
        let quad = Sprite::at(Vec2::ZERO)
            .source(Rect::new(32.0, 0.0, 32.0, 32.0))
            .corners(Vec2::new(128.0, 32.0));

        assert_eq!(quad[1].position, [32.0, 0.0]);
        assert_eq!(quad[0].uv, [0.25, 0.0]);
        assert_eq!(quad[2].uv, [0.5, 1.0]);
    }

    #[test]
    fn origin_centres_the_quad_on_position() {
        let quad = Sprite::at(Vec2::new(100.0, 100.0))
            .origin(Vec2::new(16.0, 8.0))
            .corners(Vec2::new(32.0, 16.0));

        assert_eq!(quad[0].position, [84.0, 92.0]);
        assert_eq!(quad[2].position, [116.0, 108.0]);
    }

    #[test]
    fn scale_and_rotation_apply_around_origin() {
        let quad = Sprite::at(Vec2::ZERO)
            .scale(Vec2::splat(2.0))
            .rotation(std::f32::consts::FRAC_PI_2)
            .corners(Vec2::new(10.0, 10.0));

        // Top-right corner (10, 0) scaled to (20, 0), rotated a quarter turn to (0, 20).
        let tr = Vec2::from_array(quad[1].position);
        assert!(tr.abs_diff_eq(Vec2::new(0.0, 20.0), 1e-4));
    }

    #[test]
    fn tint_is_copied_to_every_vertex() {
        let red = Color::from_premul(1.0, 0.0, 0.0, 1.0);
        let quad = Sprite::at(Vec2::ZERO).tint(red).corners(Vec2::ONE);
        assert!(quad.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn runs_group_consecutive_textures_only() {
        assert_eq!(texture_runs(&[]), Vec::<Range<usize>>::new());
        assert_eq!(texture_runs(&[7]), vec![0..1]);
        assert_eq!(texture_runs(&[1, 1, 2, 2, 2, 1]), vec![0..2, 2..5, 5..6]);
    }

    #[test]
    fn bind_groups_are_created_once_per_texture() {
        let mut cache = BindGroupCache::default();
        let mut created = 0;

        for frame in 1..=3 {
            for id in [7, 9, 7] {
                cache.touch(frame, id, || {
                    created += 1;
                    id * 10
                });
            }
        }

        assert_eq!(created, 2);
        assert_eq!(cache.get(7), Some(&70));
        assert_eq!(cache.get(9), Some(&90));
    }

    #[test]
    fn bind_groups_for_undrawn_textures_are_evicted() {
        let mut cache = BindGroupCache::default();
        cache.touch(1, 7, || "seven");
        cache.touch(1, 9, || "nine");

        // Frame 2 draws only texture 7; texture 9 goes stale when frame 3 starts.
        cache.touch(2, 7, || "seven");
        assert_eq!(cache.len(), 2);
        cache.touch(3, 7, || "seven");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(9), None);
        assert_eq!(cache.get(7), Some(&"seven"));
    }
}
