/// Per-frame renderer statistics

/// Counters reset at the start of each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued (indexed and non-indexed)
    pub draw_calls: u32,
    /// Triangles submitted across all draws
    pub triangles: u32,
    /// Objects rejected by the camera frustum
    pub culled_objects: u32,
    /// Objects that entered the forward queue
    pub visible_objects: u32,
    /// Lights collected into the arena (post-cap)
    pub lights: u32,
    /// Shadow-caster commands across all cascades
    pub shadow_casters: u32,
    /// Batches flushed by the quad batchers
    pub batches_flushed: u32,
}

impl FrameStats {
    /// Reset all counters to zero
    pub fn reset(&mut self) {
        *self = FrameStats::default();
    }
}
