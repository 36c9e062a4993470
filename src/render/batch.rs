/// Generic dynamic-vertex-buffer batching engine.
///
/// One instance per renderable class (sprites, particles, glyphs); the
/// vertex layout is the type parameter, everything else is shared.
/// Capacity overflow — a full texture-slot table or an exhausted index
/// budget — is never an error: the batcher flushes what it has and
/// starts a fresh batch before continuing.

use std::sync::Arc;
use bytemuck::Pod;
use crate::error::Result;
use crate::gpu::{
    BindingEntry, BindingGroupDesc, BindingResource, Buffer, BufferDesc, BufferUsage, CommandList,
    GraphicsDevice, IndexType, Pipeline, Texture,
};
use super::stats::FrameStats;
use super::vertex::QuadWriter;

/// Texture slots per batch draw call; slot 0 is "no texture"
pub const MAX_BATCH_TEXTURES: usize = 16;

/// Binding set index used for the per-batch texture array
const BATCH_TEXTURE_SET: u32 = 1;

/// Everything a flush needs from the surrounding pass
pub struct BatchContext<'a> {
    pub device: &'a dyn GraphicsDevice,
    pub cmd: &'a mut dyn CommandList,
    pub pipeline: &'a Arc<dyn Pipeline>,
    /// Pads unused texture slots so binding layouts stay uniform
    pub default_texture: &'a Arc<dyn Texture>,
    pub stats: &'a mut FrameStats,
}

/// Quad batcher with frame-indexed vertex buffers
pub struct QuadBatcher<V> {
    label: String,
    max_quads: u32,
    max_draw_calls: u32,
    writer: QuadWriter<V>,
    index_count: u32,
    textures: Vec<Arc<dyn Texture>>,
    draw_call_index: usize,
    /// Vertex buffers indexed [frame in flight][draw call], grown lazily
    vertex_buffers: Vec<Vec<Arc<dyn Buffer>>>,
    /// Shared static index buffer with the 0,1,2,2,3,0 quad pattern
    index_buffer: Arc<dyn Buffer>,
    frame_index: usize,
}

impl<V: Pod> QuadBatcher<V> {
    pub fn new(
        device: &dyn GraphicsDevice,
        label: &str,
        max_quads: u32,
        max_draw_calls: u32,
    ) -> Result<Self> {
        let frames = device.caps().frames_in_flight as usize;

        let mut indices: Vec<u32> = Vec::with_capacity(max_quads as usize * 6);
        for quad in 0..max_quads {
            let base = quad * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        let index_buffer = device.create_buffer(&BufferDesc {
            label: format!("{}_indices", label),
            size: (indices.len() * std::mem::size_of::<u32>()) as u64,
            usage: BufferUsage::Index,
        })?;
        index_buffer.update(0, bytemuck::cast_slice(&indices))?;

        Ok(Self {
            label: label.to_string(),
            max_quads,
            max_draw_calls,
            writer: QuadWriter::new(max_quads),
            index_count: 0,
            textures: Vec::with_capacity(MAX_BATCH_TEXTURES),
            draw_call_index: 0,
            vertex_buffers: vec![Vec::new(); frames],
            index_buffer,
            frame_index: 0,
        })
    }

    /// Reset for a new pass: cursor to the start of this frame's buffers,
    /// empty slot table, draw-call index zero
    pub fn begin_batch(&mut self, frame_index: u32) {
        self.frame_index = frame_index as usize % self.vertex_buffers.len();
        self.draw_call_index = 0;
        self.textures.clear();
        self.restart();
    }

    /// Restart accumulation without touching the draw-call index.
    /// The slot table survives so slots handed out before an
    /// index-overflow flush stay valid for the quads that follow.
    fn restart(&mut self) {
        self.writer.reset();
        self.index_count = 0;
    }

    /// Register a texture for the current batch and return its slot.
    ///
    /// Slots are 1-based; 0.0 means untextured. A texture already in the
    /// table reuses its slot. A full table flushes and restarts first.
    pub fn submit_texture(
        &mut self,
        texture: &Arc<dyn Texture>,
        ctx: &mut BatchContext<'_>,
    ) -> Result<f32> {
        for (slot, bound) in self.textures.iter().enumerate() {
            if Arc::ptr_eq(bound, texture) {
                return Ok((slot + 1) as f32);
            }
        }
        if self.textures.len() >= MAX_BATCH_TEXTURES {
            self.flush(ctx)?;
            self.textures.clear();
        }
        self.textures.push(texture.clone());
        Ok(self.textures.len() as f32)
    }

    /// Write one quad (4 vertices, 6 indices), flushing first when the
    /// index budget would be exceeded
    pub fn push_quad(&mut self, corners: [V; 4], ctx: &mut BatchContext<'_>) -> Result<()> {
        if self.index_count + 6 > self.max_quads * 6 {
            self.flush(ctx)?;
        }
        // Cannot fail: the writer was just drained if it was full
        if self.writer.write_quad(corners) {
            self.index_count += 6;
        }
        Ok(())
    }

    /// Upload the accumulated range, bind the batch resources, issue one
    /// indexed draw, and start a fresh batch
    pub fn flush(&mut self, ctx: &mut BatchContext<'_>) -> Result<()> {
        if self.index_count == 0 {
            return Ok(());
        }
        if self.draw_call_index as u32 >= self.max_draw_calls {
            crate::engine_warn!(
                "nova::QuadBatcher",
                "'{}' exceeded {} draw calls this pass",
                self.label,
                self.max_draw_calls
            );
        }

        let buffer = self.frame_vertex_buffer(ctx.device)?;
        buffer.update(0, self.writer.bytes())?;

        let mut slots = self.textures.clone();
        while slots.len() < MAX_BATCH_TEXTURES {
            slots.push(ctx.default_texture.clone());
        }
        let group = ctx.device.create_binding_group(&BindingGroupDesc {
            label: format!("{}_{}", self.label, self.draw_call_index),
            entries: vec![BindingEntry {
                binding: 0,
                resource: BindingResource::SampledTextureArray(slots),
            }],
        })?;

        ctx.cmd.bind_pipeline(ctx.pipeline)?;
        ctx.cmd.bind_binding_group(BATCH_TEXTURE_SET, &group)?;
        ctx.cmd.bind_vertex_buffer(&buffer, 0)?;
        ctx.cmd.bind_index_buffer(&self.index_buffer, 0, IndexType::U32)?;
        ctx.cmd.draw_indexed(self.index_count, 0, 0)?;

        ctx.stats.draw_calls += 1;
        ctx.stats.triangles += self.index_count / 3;
        ctx.stats.batches_flushed += 1;
        self.draw_call_index += 1;
        self.restart();
        Ok(())
    }

    /// Vertex buffer for [frame_index][draw_call_index], created on first use
    fn frame_vertex_buffer(&mut self, device: &dyn GraphicsDevice) -> Result<Arc<dyn Buffer>> {
        let buffers = &mut self.vertex_buffers[self.frame_index];
        while buffers.len() <= self.draw_call_index {
            let buffer = device.create_buffer(&BufferDesc {
                label: format!(
                    "{}_vtx_f{}_d{}",
                    self.label,
                    self.frame_index,
                    buffers.len()
                ),
                size: (self.max_quads as usize * 4 * std::mem::size_of::<V>()) as u64,
                usage: BufferUsage::Vertex,
            })?;
            buffers.push(buffer);
        }
        Ok(buffers[self.draw_call_index].clone())
    }

    // ===== INSPECTION =====

    pub fn max_quads(&self) -> u32 {
        self.max_quads
    }

    /// Indices accumulated since the last flush
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertices accumulated since the last flush
    pub fn vertex_count(&self) -> u32 {
        self.writer.vertex_count()
    }

    /// Distinct textures bound in the current batch
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Draw calls issued since begin_batch
    pub fn draw_call_index(&self) -> usize {
        self.draw_call_index
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
