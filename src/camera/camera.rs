/// Camera — perspective parameters plus a caller-driven view matrix.
///
/// The caller positions the camera (look_at or an explicit view matrix);
/// projection, view-projection, and the culling frustum are derived from
/// the stored parameters on demand.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
    view_matrix: Mat4,
}

impl Camera {
    /// Create a camera at the origin looking down -Z.
    ///
    /// `fov_y` is the vertical field of view in radians.
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            view_matrix: Mat4::IDENTITY,
        }
    }

    // ===== GETTERS =====

    /// Vertical field of view in radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    /// World-space camera position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// View matrix (inverse of the camera's world transform)
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (right-handed, 0..1 clip depth)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix
    }

    /// Culling frustum derived from the current view-projection
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    // ===== SETTERS =====

    /// Point the camera at `center` from `eye`
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.position = eye;
        self.view_matrix = Mat4::look_at_rh(eye, center, up);
    }

    /// Set an explicit view matrix; the position is recovered from it
    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.position = view.inverse().w_axis.truncate();
        self.view_matrix = view;
    }

    /// Update the aspect ratio (on window resize)
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
