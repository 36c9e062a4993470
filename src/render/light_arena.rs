/// Bounded per-frame light arena.
///
/// Shading reads a fixed-capacity array of lights; pushes past the cap
/// are dropped silently, never an error. The arena is passed explicitly
/// into the per-frame build, not held as global state.

use glam::Vec3;
use crate::scene::{Light, LightKind};

/// Maximum number of lights shading considers per frame
pub const MAX_LIGHTS: usize = 64;

/// One light in the frame's shading array
#[derive(Debug, Clone, Copy)]
pub struct LightData {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub angle: f32,
}

/// Fixed-capacity light array with an explicit count
pub struct LightArena {
    lights: [LightData; MAX_LIGHTS],
    count: usize,
}

impl LightArena {
    pub fn new() -> Self {
        Self {
            lights: [LightData {
                kind: LightKind::Point,
                position: Vec3::ZERO,
                direction: Vec3::NEG_Y,
                color: Vec3::ZERO,
                intensity: 0.0,
                radius: 0.0,
                angle: 0.0,
            }; MAX_LIGHTS],
            count: 0,
        }
    }

    /// Add a light. Past capacity the light is dropped and `false`
    /// returned; this is the documented policy, not a failure.
    pub fn push(&mut self, position: Vec3, light: &Light) -> bool {
        if self.count >= MAX_LIGHTS {
            return false;
        }
        self.lights[self.count] = LightData {
            kind: light.kind,
            position,
            direction: light.direction,
            color: light.color,
            intensity: light.intensity,
            radius: light.radius,
            angle: light.angle,
        };
        self.count += 1;
        true
    }

    /// Lights collected this frame
    pub fn lights(&self) -> &[LightData] {
        &self.lights[..self.count]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// First directional light, if any — it feeds the shadow system
    pub fn directional(&self) -> Option<&LightData> {
        self.lights().iter().find(|l| l.kind == LightKind::Directional)
    }

    /// Drop all lights (start of frame)
    pub fn clear(&mut self) {
        self.count = 0;
    }
}

impl Default for LightArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "light_arena_tests.rs"]
mod tests;
