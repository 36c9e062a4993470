/// Pod vertex layouts and the typed quad writer.
///
/// The writer replaces raw pointer-cursor writes: it tracks remaining
/// capacity itself and refuses writes past it, so the batcher can treat
/// "full" as a flush signal rather than a buffer overrun.

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by sprites and particles
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World-space position; the batch shaders apply the camera matrix
    /// supplied via push constants
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// 1-based texture slot; 0.0 means untextured
    pub texture_slot: f32,
    pub color: [f32; 4],
}

/// Vertex layout for text glyphs (adds an outline color)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub texture_slot: f32,
    pub color: [f32; 4],
    pub outline_color: [f32; 4],
}

/// Capacity-tracked vertex accumulator, four vertices per quad
pub struct QuadWriter<V> {
    vertices: Vec<V>,
    max_quads: u32,
}

impl<V: Pod> QuadWriter<V> {
    pub fn new(max_quads: u32) -> Self {
        Self {
            vertices: Vec::with_capacity(max_quads as usize * 4),
            max_quads,
        }
    }

    /// Discard accumulated vertices (batch restart)
    pub fn reset(&mut self) {
        self.vertices.clear();
    }

    /// Number of quads written since the last reset
    pub fn quad_count(&self) -> u32 {
        (self.vertices.len() / 4) as u32
    }

    /// Number of vertices written since the last reset
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// True when no further quad fits
    pub fn is_full(&self) -> bool {
        self.quad_count() >= self.max_quads
    }

    /// Write one quad's four corners.
    ///
    /// Returns `false` without writing when the writer is full — the
    /// caller flushes and retries.
    pub fn write_quad(&mut self, corners: [V; 4]) -> bool {
        if self.is_full() {
            return false;
        }
        self.vertices.extend_from_slice(&corners);
        true
    }

    /// Accumulated vertex data as bytes, ready for upload
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
#[path = "vertex_tests.rs"]
mod tests;
