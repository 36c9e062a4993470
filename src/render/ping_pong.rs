/// Two-slot ping-pong target ring for the post-process chain.
///
/// One slot is the read source, the other the write destination; after a
/// pass completes the index toggles (`current ^= 1`) so the just-written
/// slot becomes the next source. A skipped pass performs no toggle, so
/// the chain is unaffected by disabled passes.

use std::sync::Arc;
use crate::gpu::Texture;

/// Explicit two-slot target ring
pub struct PingPongRing {
    slots: [Arc<dyn Texture>; 2],
    current: usize,
}

impl PingPongRing {
    /// Build the ring over two same-sized color targets; slot 0 starts
    /// as the source
    pub fn new(first: Arc<dyn Texture>, second: Arc<dyn Texture>) -> Self {
        Self {
            slots: [first, second],
            current: 0,
        }
    }

    /// Target the next pass reads from
    pub fn source(&self) -> &Arc<dyn Texture> {
        &self.slots[self.current]
    }

    /// Target the next pass writes to
    pub fn destination(&self) -> &Arc<dyn Texture> {
        &self.slots[self.current ^ 1]
    }

    /// Make the just-written destination the new source.
    /// Called once per completed pass, never for skipped ones.
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Index of the current source slot (0 or 1)
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Reset so slot 0 is the source again (start of frame)
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Replace both slots after a resize; the ring resets to slot 0
    pub fn replace(&mut self, first: Arc<dyn Texture>, second: Arc<dyn Texture>) {
        self.slots = [first, second];
        self.current = 0;
    }
}

#[cfg(test)]
#[path = "ping_pong_tests.rs"]
mod tests;
