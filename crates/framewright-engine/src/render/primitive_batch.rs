use bytemuck::Pod;

use super::RenderCtx;
use super::common::vertex_stream_min_size;
use super::stream::StreamBuffer;

/// Immediate-mode triangle batcher for an arbitrary vertex type.
///
/// Usage: `begin`, any number of `draw_triangle`, then `end` inside a render
/// pass whose pipeline consumes `V` at vertex buffer slot 0. Several
/// `begin`/`end` cycles may share one frame; each draws its own vertices.
pub struct PrimitiveBatch<V> {
    vertices: Vec<V>,
    in_batch: bool,

    vbo: StreamBuffer,
}

impl<V: Pod> PrimitiveBatch<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            in_batch: false,
            vbo: StreamBuffer::new(
                "framewright primitive batch vbo",
                wgpu::BufferUsages::VERTEX,
                vertex_stream_min_size::<V>(),
            ),
        }
    }

    pub fn begin(&mut self) {
        debug_assert!(!self.in_batch, "PrimitiveBatch::begin called twice without end");
        self.vertices.clear();
        self.in_batch = true;
    }

    pub fn draw_triangle(&mut self, v1: V, v2: V, v3: V) {
        debug_assert!(self.in_batch, "PrimitiveBatch::draw_triangle outside begin/end");
        self.vertices.extend_from_slice(&[v1, v2, v3]);
    }

    /// Number of vertices queued since `begin`.
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Uploads queued vertices and draws them with the pipeline bound on `rpass`.
    pub fn end(&mut self, ctx: &RenderCtx<'_>, rpass: &mut wgpu::RenderPass<'_>) {
        debug_assert!(self.in_batch, "PrimitiveBatch::end without begin");
        self.in_batch = false;

        if self.vertices.is_empty() {
            return;
        }

        let count = self.vertices.len() as u32;
        if let Some(upload) = self
            .vbo
            .upload(ctx, bytemuck::cast_slice(&self.vertices), 0)
        {
            rpass.set_vertex_buffer(0, upload.buffer.slice(upload.range));
            rpass.draw(0..count, 0..1);
        }

        self.vertices.clear();
    }
}

impl<V: Pod> Default for PrimitiveBatch<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangles_queue_three_vertices_each() {
        let mut batch = PrimitiveBatch::<[f32; 2]>::new();
        batch.begin();
        batch.draw_triangle([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        batch.draw_triangle([1.0, 1.0], [1.0, 0.0], [0.0, 1.0]);
        assert_eq!(batch.pending_vertices(), 6);
    }

    #[test]
    fn begin_discards_previous_vertices() {
        let mut batch = PrimitiveBatch::<[f32; 2]>::default();
        batch.begin();
        batch.draw_triangle([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
        batch.in_batch = false;

        batch.begin();
        assert_eq!(batch.pending_vertices(), 0);
    }
}
