/// Pipeline trait, value-equality pipeline descriptor, and the dedup cache

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use super::device::GraphicsDevice;
use super::shader::Shader;
use super::texture::TextureFormat;

/// Blend state for a graphics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// No blending, output replaces destination
    Opaque,
    /// Standard alpha blending (src_alpha, one_minus_src_alpha)
    Alpha,
    /// Additive blending (one, one)
    Additive,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Back,
    Front,
}

/// Descriptor for creating a graphics pipeline.
///
/// Keyed by value equality: two identical descriptors must produce
/// interchangeable pipelines, which is what lets [`PipelineCache`]
/// deduplicate them. The shader is referenced by name for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineDesc {
    /// Name of the shader to bind (resolved through the shader library)
    pub shader: String,
    /// Color attachment format
    pub color_format: Option<TextureFormat>,
    /// Depth attachment format
    pub depth_format: Option<TextureFormat>,
    pub blend: BlendMode,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull: CullMode,
    /// MSAA sample count
    pub samples: u32,
    /// Compute pipeline: no attachments, dispatched rather than drawn
    pub compute: bool,
}

impl PipelineDesc {
    /// Descriptor for a full-screen post-process pass
    pub fn fullscreen(shader: &str, color_format: TextureFormat) -> Self {
        Self {
            shader: shader.to_string(),
            color_format: Some(color_format),
            depth_format: None,
            blend: BlendMode::Opaque,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: false,
        }
    }

    /// Descriptor for a compute pipeline
    pub fn compute(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            color_format: None,
            depth_format: None,
            blend: BlendMode::Opaque,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: true,
        }
    }
}

/// Graphics or compute pipeline trait
pub trait Pipeline: Send + Sync {
    /// Descriptor this pipeline was created from
    fn desc(&self) -> &PipelineDesc;
}

// ===== PIPELINE CACHE =====

/// Deduplicating pipeline cache keyed by [`PipelineDesc`].
///
/// Identical descriptors return the same pipeline handle; creation goes
/// through the device only on a miss.
pub struct PipelineCache {
    pipelines: FxHashMap<PipelineDesc, Arc<dyn Pipeline>>,
}

impl PipelineCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            pipelines: FxHashMap::default(),
        }
    }

    /// Get the pipeline for `desc`, creating it on first use
    pub fn get_or_create(
        &mut self,
        device: &dyn GraphicsDevice,
        desc: &PipelineDesc,
        shader: &Arc<dyn Shader>,
    ) -> Result<Arc<dyn Pipeline>> {
        if let Some(pipeline) = self.pipelines.get(desc) {
            return Ok(pipeline.clone());
        }
        let pipeline = device.create_pipeline(desc, shader)?;
        self.pipelines.insert(desc.clone(), pipeline.clone());
        Ok(pipeline)
    }

    /// Number of distinct pipelines created so far
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// True if no pipeline has been created yet
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Drop all cached pipelines (e.g. after a device loss)
    pub fn clear(&mut self) {
        self.pipelines.clear();
    }
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
