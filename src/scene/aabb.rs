/// Axis-aligned bounding box in world or local space

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from min/max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Unit cube centered at the origin
    pub fn unit() -> Self {
        Self {
            min: Vec3::splat(-0.5),
            max: Vec3::splat(0.5),
        }
    }

    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents of the box
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Transform the AABB by a matrix, returning the AABB of the result.
    ///
    /// Arvo's method: accumulate per-axis min/max contributions of each
    /// rotation/scale column, starting from the translation.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let translation = matrix.w_axis.truncate();
        let mut min = translation;
        let mut max = translation;

        for axis in 0..3 {
            let column = matrix.col(axis).truncate();
            let a = column * self.min[axis];
            let b = column * self.max[axis];
            min += a.min(b);
            max += a.max(b);
        }

        Aabb { min, max }
    }

    /// Test if a point lies inside the box (inclusive)
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Test if two boxes overlap
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
