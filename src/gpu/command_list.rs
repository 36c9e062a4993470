/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use crate::error::Result;
use super::binding_group::BindingGroup;
use super::buffer::{Buffer, IndexType};
use super::pipeline::Pipeline;
use super::shader::ShaderStage;
use super::texture::Texture;

/// Attachment set and clear behavior for one render pass
pub struct RenderPassDesc {
    /// Debug label, also used by the mock backend for assertions
    pub label: String,
    /// Color attachment (None for depth-only passes)
    pub color: Option<Arc<dyn Texture>>,
    /// Mip level of the color attachment to render into
    pub color_mip: u32,
    /// Array layer of the color attachment (shadow cascade index)
    pub color_layer: u32,
    /// Depth attachment
    pub depth: Option<Arc<dyn Texture>>,
    /// Clear color, `None` loads existing contents
    pub clear_color: Option<[f32; 4]>,
    /// Clear depth, `None` loads existing contents
    pub clear_depth: Option<f32>,
}

impl RenderPassDesc {
    /// Color-only pass rendering into mip 0 without clearing
    pub fn color_only(label: &str, color: &Arc<dyn Texture>) -> Self {
        Self {
            label: label.to_string(),
            color: Some(color.clone()),
            color_mip: 0,
            color_layer: 0,
            depth: None,
            clear_color: None,
            clear_depth: None,
        }
    }
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-target viewport with the standard 0..1 depth range
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Command list for recording rendering commands
///
/// Commands are recorded and later submitted to the GPU via
/// `GraphicsDevice::submit()`.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass into the given attachments
    fn begin_render_pass(&mut self, desc: &RenderPassDesc) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Bind a graphics or compute pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a binding group at the given set index
    fn bind_binding_group(&mut self, set_index: u32, group: &Arc<dyn BindingGroup>) -> Result<()>;

    /// Push constants to the bound pipeline
    fn push_constants(&mut self, stages: &[ShaderStage], offset: u32, data: &[u8]) -> Result<()>;

    /// Bind a vertex buffer
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32)
        -> Result<()>;

    /// Dispatch compute workgroups (outside a render pass)
    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) -> Result<()>;

    /// Copy the full contents of one texture to another of the same size.
    /// Used to hand the composited result to the presentation surface.
    fn copy_texture(&mut self, src: &Arc<dyn Texture>, dst: &Arc<dyn Texture>) -> Result<()>;
}
