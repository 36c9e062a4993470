/// Visibility and command-queue construction.
///
/// Runs once per frame before any pass records commands. Camera culling
/// and cascade culling are independent: an object outside the camera
/// frustum is excluded from the camera-facing queues but still enters any
/// cascade queue whose frustum it passes — shadow casters behind the
/// camera must still cast.

use std::cmp::Ordering;
use glam::Vec3;
use crate::camera::Camera;
use crate::scene::{Aabb, Particle, RenderFlags, World};
use super::cascades::CascadeShadowMap;
use super::command::{RenderCommand, RenderCommand2D};
use super::light_arena::LightArena;
use super::stats::FrameStats;

/// Camera-facing command queues, rebuilt every frame
pub struct FrameQueues {
    /// 3D queue: depth-tested commands first, then by ascending camera
    /// distance within each group
    pub forward: Vec<RenderCommand>,
    /// 2D queue, ascending world-space Z for back-to-front blending
    pub queue_2d: Vec<RenderCommand2D>,
}

impl FrameQueues {
    pub fn new() -> Self {
        Self {
            forward: Vec::new(),
            queue_2d: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.queue_2d.clear();
    }
}

impl Default for FrameQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort an emitter's particles farthest-from-camera first, required for
/// correct alpha/additive accumulation order
pub fn sort_particles_back_to_front(particles: &mut [Particle], camera_position: Vec3) {
    particles.sort_by(|a, b| {
        let da = a.position.distance_squared(camera_position);
        let db = b.position.distance_squared(camera_position);
        db.partial_cmp(&da).unwrap_or(Ordering::Equal)
    });
}

/// Per-frame visibility builder
pub struct VisibilityBuilder;

impl VisibilityBuilder {
    /// Collect lights into the arena, capped at its size with silent
    /// drop. Runs before cascade update, which needs the directional
    /// light's direction.
    pub fn collect_lights(world: &World, lights: &mut LightArena, stats: &mut FrameStats) {
        lights.clear();
        for (_, transform, light) in world.query_lights() {
            lights.push(transform.translation, light);
        }
        stats.lights = lights.len() as u32;
    }

    /// Iterate the world, cull, and fill every queue for this frame.
    /// Cascades must be updated before this runs so their frustums are
    /// current.
    ///
    /// Sorting uses stable comparison sorts: queues are small (hundreds)
    /// and determinism matters more than asymptotic cost.
    pub fn build(
        world: &World,
        camera: &Camera,
        cascades: &mut CascadeShadowMap,
        queues: &mut FrameQueues,
        stats: &mut FrameStats,
    ) {
        queues.clear();

        let frustum = camera.frustum();
        let camera_position = camera.position();

        // Meshes: camera queue and cascade queues tested independently
        for (_, transform, renderer) in world.query_meshes() {
            let world_matrix = transform.matrix();
            let world_aabb: Aabb = renderer.mesh.aabb.transformed(&world_matrix);

            if frustum.intersects_aabb(&world_aabb) {
                queues.forward.push(RenderCommand {
                    mesh: renderer.mesh.clone(),
                    world: world_matrix,
                    material: renderer.material.clone(),
                    depth_test: !renderer.material.transparent,
                    camera_distance: world_aabb.center().distance(camera_position),
                });
                stats.visible_objects += 1;
            } else {
                stats.culled_objects += 1;
            }

            if renderer.flags.contains(RenderFlags::CAST_SHADOW) {
                for cascade_index in 0..cascades.count() as usize {
                    if cascades.cascades()[cascade_index]
                        .frustum
                        .intersects_aabb(&world_aabb)
                    {
                        cascades.push_caster(
                            cascade_index,
                            RenderCommand {
                                mesh: renderer.mesh.clone(),
                                world: world_matrix,
                                material: renderer.material.clone(),
                                depth_test: true,
                                camera_distance: 0.0,
                            },
                        );
                        stats.shadow_casters += 1;
                    }
                }
            }
        }

        // Sprites: camera-culled, then back-to-front by world Z
        for (_, transform, sprite) in world.query_sprites() {
            let world_matrix = transform.matrix();
            let half = (sprite.size * 0.5).extend(0.0);
            let local = Aabb::new(-half, half);
            if !frustum.intersects_aabb(&local.transformed(&world_matrix)) {
                stats.culled_objects += 1;
                continue;
            }
            queues.queue_2d.push(RenderCommand2D {
                texture: sprite.texture.clone(),
                world: world_matrix,
                color: sprite.color,
                size: sprite.size,
                uv_min: sprite.uv_min,
                uv_max: sprite.uv_max,
                z: transform.translation.z,
            });
        }

        // Stable sort: depth-tested before non-depth-tested, then nearest
        // first within each group
        queues.forward.sort_by(|a, b| {
            b.depth_test.cmp(&a.depth_test).then(
                a.camera_distance
                    .partial_cmp(&b.camera_distance)
                    .unwrap_or(Ordering::Equal),
            )
        });
        queues
            .queue_2d
            .sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
