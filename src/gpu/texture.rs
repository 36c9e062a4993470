/// Texture trait, texture descriptor, and texture info

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    R11G11B10_UFLOAT,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
}

/// Texture usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as a render target
    RenderTarget,
    /// Texture can be sampled and rendered to
    SampledAndRenderTarget,
    /// Texture can additionally be written by compute shaders
    Storage,
    /// Texture can be used as a depth attachment
    DepthStencil,
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug label, surfaced by backends that support object names
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
    /// Number of mip levels (1 = no mip chain)
    pub mip_levels: u32,
    /// Number of array layers (>1 for shadow cascade arrays)
    pub array_layers: u32,
    /// MSAA sample count (1 = no MSAA)
    pub samples: u32,
    /// Optional initial pixel data for mip 0, layer 0
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Descriptor for a single-layer, single-mip color target
    pub fn color_target(label: &str, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            format,
            usage: TextureUsage::SampledAndRenderTarget,
            mip_levels: 1,
            array_layers: 1,
            samples: 1,
            data: None,
        }
    }

    /// Descriptor for a depth attachment
    pub fn depth_target(label: &str, width: u32, height: u32) -> Self {
        Self {
            label: label.to_string(),
            width,
            height,
            format: TextureFormat::D32_FLOAT,
            usage: TextureUsage::DepthStencil,
            mip_levels: 1,
            array_layers: 1,
            samples: 1,
            data: None,
        }
    }
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture.
///
/// Returned by `Texture::info()` to query texture properties
/// without exposing backend-specific details.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub samples: u32,
}

impl TextureInfo {
    /// Width of the given mip level in pixels (at least 1)
    pub fn mip_width(&self, mip: u32) -> u32 {
        (self.width >> mip).max(1)
    }

    /// Height of the given mip level in pixels (at least 1)
    pub fn mip_height(&self, mip: u32) -> u32 {
        (self.height >> mip).max(1)
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource trait
///
/// Implemented by backend-specific texture types. The texture is
/// destroyed when the last handle is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
