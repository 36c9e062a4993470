/// GraphicsDevice factory trait and device capabilities

use std::sync::Arc;
use crate::error::Result;
use super::binding_group::{BindingGroup, BindingGroupDesc};
use super::buffer::{Buffer, BufferDesc};
use super::command_list::CommandList;
use super::pipeline::{Pipeline, PipelineDesc};
use super::shader::Shader;
use super::texture::{Texture, TextureDesc};

/// Capabilities reported by the device at creation time.
///
/// Queried once; strategy choices (compute vs. raster bloom) are made at
/// initialization, not per frame.
#[derive(Debug, Clone)]
pub struct DeviceCaps {
    /// Compute shader dispatch is available
    pub compute: bool,
    /// Number of frames that may be in flight simultaneously.
    /// Per-frame dynamic buffers are arrays of this length.
    pub frames_in_flight: u32,
    /// Maximum supported MSAA sample count
    pub max_msaa_samples: u32,
}

/// Factory trait for creating GPU resources and submitting work
///
/// Implemented by backend devices. All resource handles are reference
/// counted; resources die when the last handle drops.
pub trait GraphicsDevice: Send + Sync {
    /// Device capabilities
    fn caps(&self) -> &DeviceCaps;

    /// Create a texture
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a buffer
    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a pipeline from a value-equality descriptor and a shader
    fn create_pipeline(
        &self,
        desc: &PipelineDesc,
        shader: &Arc<dyn Shader>,
    ) -> Result<Arc<dyn Pipeline>>;

    /// Create an immutable binding group
    fn create_binding_group(&self, desc: &BindingGroupDesc) -> Result<Arc<dyn BindingGroup>>;

    /// Acquire the command list for the current swapchain frame.
    ///
    /// # Errors
    ///
    /// `Error::CapabilityMissing` when no swapchain frame is available -
    /// this is the fatal path; the frame cannot proceed without it.
    fn acquire_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit a recorded command list for execution
    fn submit(&self, command_list: Box<dyn CommandList>) -> Result<()>;

    /// Index of the swapchain frame currently being prepared,
    /// in `0..caps().frames_in_flight`
    fn frame_index(&self) -> u32;

    /// Texture the composited result must end up in for presentation
    fn backbuffer(&self) -> Result<Arc<dyn Texture>>;
}
