/// Mock graphics device for unit tests (no GPU required)
///
/// Command lists write one string per recorded command into a sink shared
/// with the device, so tests can assert on the exact pass/draw sequence a
/// frame produced. Resources retain their descriptors for inspection.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use super::binding_group::{BindingGroup, BindingGroupDesc};
use super::buffer::{Buffer, BufferDesc, IndexType};
use super::command_list::{CommandList, RenderPassDesc, Viewport};
use super::device::{DeviceCaps, GraphicsDevice};
use super::pipeline::{Pipeline, PipelineDesc};
use super::shader::{Shader, ShaderLibrary, ShaderStage};
use super::texture::{Texture, TextureDesc, TextureInfo, TextureUsage};

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub label: String,
    pub size: u64,
    /// (offset, byte length) of every update() call
    pub updates: Mutex<Vec<(u64, usize)>>,
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            return Err(Error::InvalidResource(format!(
                "update past end of buffer '{}'",
                self.label
            )));
        }
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((offset, data.len()));
        }
        Ok(())
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    pub label: String,
    pub info: TextureInfo,
}

impl MockTexture {
    /// Standalone sampled texture for batching tests
    pub fn sampled(label: &str, width: u32, height: u32) -> Arc<dyn Texture> {
        Arc::new(Self {
            label: label.to_string(),
            info: TextureInfo {
                width,
                height,
                format: super::texture::TextureFormat::R8G8B8A8_UNORM,
                usage: TextureUsage::Sampled,
                mip_levels: 1,
                array_layers: 1,
                samples: 1,
            },
        })
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock Shader
// ============================================================================

pub struct MockShader {
    pub name: String,
    pub compiled: bool,
}

impl Shader for MockShader {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_compiled(&self) -> bool {
        self.compiled
    }
}

/// Shader library backed by a name map.
///
/// `permissive()` hands out a compiled shader for any requested name,
/// which is what orchestrator tests want; `add_uncompiled` lets tests
/// exercise the skip-on-uncompiled path for a specific pass.
pub struct MockShaderLibrary {
    shaders: Mutex<FxHashMap<String, Arc<dyn Shader>>>,
    permissive: bool,
}

impl MockShaderLibrary {
    /// Empty library; unknown names return None
    pub fn new() -> Self {
        Self {
            shaders: Mutex::new(FxHashMap::default()),
            permissive: false,
        }
    }

    /// Library that resolves every name to a compiled shader
    pub fn permissive() -> Self {
        Self {
            shaders: Mutex::new(FxHashMap::default()),
            permissive: true,
        }
    }

    /// Register a compiled shader under `name`
    pub fn add(&self, name: &str) {
        if let Ok(mut shaders) = self.shaders.lock() {
            shaders.insert(
                name.to_string(),
                Arc::new(MockShader {
                    name: name.to_string(),
                    compiled: true,
                }),
            );
        }
    }

    /// Register a shader that never finishes compiling
    pub fn add_uncompiled(&self, name: &str) {
        if let Ok(mut shaders) = self.shaders.lock() {
            shaders.insert(
                name.to_string(),
                Arc::new(MockShader {
                    name: name.to_string(),
                    compiled: false,
                }),
            );
        }
    }
}

impl Default for MockShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderLibrary for MockShaderLibrary {
    fn shader(&self, name: &str) -> Option<Arc<dyn Shader>> {
        let mut shaders = self.shaders.lock().ok()?;
        if let Some(shader) = shaders.get(name) {
            return Some(shader.clone());
        }
        if self.permissive {
            let shader: Arc<dyn Shader> = Arc::new(MockShader {
                name: name.to_string(),
                compiled: true,
            });
            shaders.insert(name.to_string(), shader.clone());
            return Some(shader);
        }
        None
    }
}

// ============================================================================
// Mock Pipeline / BindingGroup
// ============================================================================

pub struct MockPipeline {
    pub desc: PipelineDesc,
}

impl Pipeline for MockPipeline {
    fn desc(&self) -> &PipelineDesc {
        &self.desc
    }
}

pub struct MockBindingGroup {
    pub label: String,
    pub entry_count: u32,
}

impl BindingGroup for MockBindingGroup {
    fn entry_count(&self) -> u32 {
        self.entry_count
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

pub struct MockCommandList {
    sink: Arc<Mutex<Vec<String>>>,
}

impl MockCommandList {
    fn record(&mut self, command: String) {
        if let Ok(mut sink) = self.sink.lock() {
            sink.push(command);
        }
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.record("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record("end".to_string());
        Ok(())
    }

    fn begin_render_pass(&mut self, desc: &RenderPassDesc) -> Result<()> {
        self.record(format!("begin_render_pass:{}", desc.label));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.record("end_render_pass".to_string());
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record(format!(
            "set_viewport:{}x{}",
            viewport.width as u32, viewport.height as u32
        ));
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.record(format!("bind_pipeline:{}", pipeline.desc().shader));
        Ok(())
    }

    fn bind_binding_group(&mut self, set_index: u32, _group: &Arc<dyn BindingGroup>) -> Result<()> {
        self.record(format!("bind_binding_group:{}", set_index));
        Ok(())
    }

    fn push_constants(&mut self, _stages: &[ShaderStage], _offset: u32, data: &[u8]) -> Result<()> {
        self.record(format!("push_constants:{}", data.len()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, _offset: u64) -> Result<()> {
        self.record("bind_vertex_buffer".to_string());
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        _buffer: &Arc<dyn Buffer>,
        _offset: u64,
        _index_type: IndexType,
    ) -> Result<()> {
        self.record("bind_index_buffer".to_string());
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.record(format!("draw:{}", vertex_count));
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
    ) -> Result<()> {
        self.record(format!("draw_indexed:{}", index_count));
        Ok(())
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) -> Result<()> {
        self.record(format!("dispatch:{}x{}x{}", groups_x, groups_y, groups_z));
        Ok(())
    }

    fn copy_texture(&mut self, _src: &Arc<dyn Texture>, _dst: &Arc<dyn Texture>) -> Result<()> {
        self.record("copy_texture".to_string());
        Ok(())
    }
}

// ============================================================================
// Mock Device
// ============================================================================

pub struct MockDevice {
    caps: DeviceCaps,
    backbuffer: Arc<dyn Texture>,
    commands: Arc<Mutex<Vec<String>>>,
    created_textures: Mutex<Vec<String>>,
    frame_index: Mutex<u32>,
    /// When set, acquire_command_list fails (fatal-path tests)
    pub fail_acquire: Mutex<bool>,
}

impl MockDevice {
    pub fn new(width: u32, height: u32, caps: DeviceCaps) -> Self {
        let backbuffer: Arc<dyn Texture> = Arc::new(MockTexture {
            label: "backbuffer".to_string(),
            info: TextureInfo {
                width,
                height,
                format: super::texture::TextureFormat::B8G8R8A8_UNORM,
                usage: TextureUsage::RenderTarget,
                mip_levels: 1,
                array_layers: 1,
                samples: 1,
            },
        });
        Self {
            caps,
            backbuffer,
            commands: Arc::new(Mutex::new(Vec::new())),
            created_textures: Mutex::new(Vec::new()),
            frame_index: Mutex::new(0),
            fail_acquire: Mutex::new(false),
        }
    }

    /// Device with compute support and triple buffering
    pub fn with_compute(width: u32, height: u32) -> Self {
        Self::new(
            width,
            height,
            DeviceCaps {
                compute: true,
                frames_in_flight: 3,
                max_msaa_samples: 8,
            },
        )
    }

    /// Device without compute support (raster bloom path)
    pub fn raster_only(width: u32, height: u32) -> Self {
        Self::new(
            width,
            height,
            DeviceCaps {
                compute: false,
                frames_in_flight: 2,
                max_msaa_samples: 4,
            },
        )
    }

    /// Snapshot of every command recorded so far
    pub fn recorded(&self) -> Vec<String> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Clear the recorded command log
    pub fn clear_recorded(&self) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.clear();
        }
    }

    /// Labels of every texture created through this device
    pub fn texture_labels(&self) -> Vec<String> {
        self.created_textures
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    /// Advance to the next swapchain frame
    pub fn advance_frame(&self) {
        if let Ok(mut index) = self.frame_index.lock() {
            *index = (*index + 1) % self.caps.frames_in_flight;
        }
    }
}

impl GraphicsDevice for MockDevice {
    fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource(format!(
                "zero-sized texture '{}'",
                desc.label
            )));
        }
        if let Ok(mut created) = self.created_textures.lock() {
            created.push(desc.label.clone());
        }
        Ok(Arc::new(MockTexture {
            label: desc.label.clone(),
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
                mip_levels: desc.mip_levels,
                array_layers: desc.array_layers,
                samples: desc.samples,
            },
        }))
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!(
                "zero-sized buffer '{}'",
                desc.label
            )));
        }
        Ok(Arc::new(MockBuffer {
            label: desc.label.clone(),
            size: desc.size,
            updates: Mutex::new(Vec::new()),
        }))
    }

    fn create_pipeline(
        &self,
        desc: &PipelineDesc,
        shader: &Arc<dyn Shader>,
    ) -> Result<Arc<dyn Pipeline>> {
        if !shader.is_compiled() {
            return Err(Error::InvalidResource(format!(
                "shader '{}' not compiled",
                shader.name()
            )));
        }
        Ok(Arc::new(MockPipeline { desc: desc.clone() }))
    }

    fn create_binding_group(&self, desc: &BindingGroupDesc) -> Result<Arc<dyn BindingGroup>> {
        Ok(Arc::new(MockBindingGroup {
            label: desc.label.clone(),
            entry_count: desc.entries.len() as u32,
        }))
    }

    fn acquire_command_list(&self) -> Result<Box<dyn CommandList>> {
        if self.fail_acquire.lock().map(|f| *f).unwrap_or(false) {
            return Err(Error::CapabilityMissing(
                "no swapchain command list available".to_string(),
            ));
        }
        Ok(Box::new(MockCommandList {
            sink: self.commands.clone(),
        }))
    }

    fn submit(&self, _command_list: Box<dyn CommandList>) -> Result<()> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push("submit".to_string());
        }
        Ok(())
    }

    fn frame_index(&self) -> u32 {
        self.frame_index.lock().map(|i| *i).unwrap_or(0)
    }

    fn backbuffer(&self) -> Result<Arc<dyn Texture>> {
        Ok(self.backbuffer.clone())
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
