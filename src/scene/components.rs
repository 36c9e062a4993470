/// Component structs attached to world entities.
///
/// These are the renderer-facing slice of the host's entity data: the
/// renderer reads them through the world's capability queries and never
/// mutates them during a frame.

use std::sync::Arc;
use bitflags::bitflags;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use crate::gpu::{Buffer, Texture};
use super::aabb::Aabb;

bitflags! {
    /// Per-renderable visibility flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderFlags: u32 {
        const CAST_SHADOW = 1 << 0;
        const RECEIVE_SHADOW = 1 << 1;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags::CAST_SHADOW | RenderFlags::RECEIVE_SHADOW
    }
}

// ===== TRANSFORM =====

/// World transform component
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Composed world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(Vec3::ZERO)
    }
}

// ===== MESH =====

/// GPU mesh: vertex/index buffers plus a local-space bounding box
pub struct Mesh {
    pub vertex_buffer: Arc<dyn Buffer>,
    pub index_buffer: Arc<dyn Buffer>,
    pub index_count: u32,
    pub aabb: Aabb,
}

/// Material referenced by a mesh renderer
#[derive(Clone)]
pub struct Material {
    pub albedo: Option<Arc<dyn Texture>>,
    pub color: Vec4,
    /// Alpha-blended materials draw without depth testing, after opaques
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: None,
            color: Vec4::ONE,
            transparent: false,
        }
    }
}

/// 3D mesh renderable component
#[derive(Clone)]
pub struct MeshRenderer {
    pub mesh: Arc<Mesh>,
    pub material: Material,
    pub flags: RenderFlags,
}

// ===== SPRITE =====

/// 2D sprite component; the transform's Z orders the 2D queue
#[derive(Clone)]
pub struct Sprite {
    pub texture: Option<Arc<dyn Texture>>,
    pub color: Vec4,
    pub size: Vec2,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

impl Sprite {
    pub fn colored(size: Vec2, color: Vec4) -> Self {
        Self {
            texture: None,
            color,
            size,
            uv_min: Vec2::ZERO,
            uv_max: Vec2::ONE,
        }
    }
}

// ===== LIGHT =====

/// Light source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// Light component; the position comes from the entity's Transform
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    /// Direction for directional and spot lights
    pub direction: Vec3,
    /// Cone angle for spot lights, radians
    pub angle: f32,
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
            radius: 0.0,
            direction: direction.normalize_or_zero(),
            angle: 0.0,
        }
    }

    pub fn point(color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity,
            radius,
            direction: Vec3::NEG_Y,
            angle: 0.0,
        }
    }
}

// ===== PARTICLES =====

/// One live particle, owned by its emitter
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec3,
    pub size: Vec2,
    pub color: Vec4,
    pub life: f32,
    pub frame: u32,
}

/// Particle emitter component.
///
/// The renderer iterates the live particles; it never owns or steps them.
#[derive(Clone)]
pub struct ParticleEmitter {
    pub particles: Vec<Particle>,
    pub texture: Option<Arc<dyn Texture>>,
    /// Sort particles farthest-from-camera first before batching
    pub sort_particles: bool,
    /// Additive rather than alpha blending
    pub additive: bool,
    /// Frames along each axis of the animation flipbook texture
    pub animation_grid: u32,
}

// ===== TEXT =====

/// One glyph of a font atlas
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    pub size: Vec2,
    pub offset: Vec2,
    pub advance: f32,
}

/// Font atlas plus per-character glyph metrics
pub struct Font {
    pub atlas: Arc<dyn Texture>,
    pub glyphs: FxHashMap<char, Glyph>,
    pub line_height: f32,
}

/// World-space text component
#[derive(Clone)]
pub struct TextLabel {
    pub text: String,
    pub font: Arc<Font>,
    pub color: Vec4,
    pub scale: f32,
}
