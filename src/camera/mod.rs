//! Camera module — camera parameters and frustum culling.
//!
//! The renderer does NOT store or manage cameras — the caller owns the
//! camera and passes it into the per-frame calls.

mod camera;
mod frustum;

pub use camera::Camera;
pub use frustum::Frustum;
