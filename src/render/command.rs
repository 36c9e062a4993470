/// Per-frame draw commands.
///
/// Built fresh each frame by the visibility builder and consumed by the
/// pass functions; nothing here outlives the frame.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec4};
use crate::gpu::Texture;
use crate::scene::{Material, Mesh};

/// One 3D draw for the forward or shadow queues
#[derive(Clone)]
pub struct RenderCommand {
    pub mesh: Arc<Mesh>,
    pub world: Mat4,
    pub material: Material,
    /// Depth-tested commands sort before non-depth-tested ones
    pub depth_test: bool,
    /// Distance from the camera, cached as the secondary sort key
    pub camera_distance: f32,
}

/// One 2D quad draw for the sprite queue
#[derive(Clone)]
pub struct RenderCommand2D {
    pub texture: Option<Arc<dyn Texture>>,
    pub world: Mat4,
    pub color: Vec4,
    pub size: Vec2,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    /// World-space Z, the 2D queue's sort key (back to front)
    pub z: f32,
}
