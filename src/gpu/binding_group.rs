/// BindingGroup trait and binding group descriptor
///
/// A BindingGroup is an immutable set of GPU resource bindings (textures,
/// buffers). The layout is deduced by the backend from the bound pipeline;
/// users never manipulate descriptor layouts directly. Once created, a
/// group cannot be modified - create a new one to change resources.

use std::sync::Arc;
use super::buffer::Buffer;
use super::texture::Texture;

/// A concrete resource bound at one slot of a binding group
#[derive(Clone)]
pub enum BindingResource {
    /// Uniform buffer binding
    UniformBuffer(Arc<dyn Buffer>),
    /// Sampled texture (backend resolves the sampler)
    SampledTexture(Arc<dyn Texture>),
    /// A specific mip level of a texture, sampled
    SampledTextureMip(Arc<dyn Texture>, u32),
    /// A specific mip level of a texture, written by compute
    StorageTextureMip(Arc<dyn Texture>, u32),
    /// Fixed-length array of sampled textures (batch texture slots).
    /// Callers pad short arrays so layouts stay uniform across draws.
    SampledTextureArray(Vec<Arc<dyn Texture>>),
}

/// One entry of a binding group descriptor
#[derive(Clone)]
pub struct BindingEntry {
    /// Binding number (`layout(binding = N)` in the shader)
    pub binding: u32,
    /// Bound resource
    pub resource: BindingResource,
}

/// Descriptor for creating a binding group
#[derive(Clone)]
pub struct BindingGroupDesc {
    /// Debug label
    pub label: String,
    /// Entries, one per binding slot
    pub entries: Vec<BindingEntry>,
}

/// An immutable set of GPU resource bindings
pub trait BindingGroup: Send + Sync {
    /// Number of entries in this group
    fn entry_count(&self) -> u32;
}
