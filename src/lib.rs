/*!
# Nova Render

Per-frame render-pass pipeline for a 3D scene renderer.

This crate provides the platform-agnostic rendering pipeline: per-frame
visibility and command-queue construction, cascaded shadow maps, a
generic 16-slot quad batching engine, a fixed post-process chain over a
ping-pong target ring, and the pass orchestrator that drives them.
GPU access goes through trait-based dynamic polymorphism; backend
implementations provide concrete types behind the `gpu` traits.

## Architecture

- **GraphicsDevice**: Factory trait for creating GPU resources
- **SceneRenderer**: Pass orchestrator, one `begin_scene`/`render` pair per frame
- **VisibilityBuilder**: Frustum culling into the frame's command queues
- **CascadeShadowMap**: Cascaded shadow-map fitting and caster queues
- **QuadBatcher**: Multi-texture quad batching with flush-and-restart
- **PingPongRing**: Two-slot source/destination ring for post-processing

The `MockDevice` backend records commands as strings and backs the test
suite; real backends live in separate crates.
*/

// Internal modules
mod error;
mod settings;
pub mod camera;
pub mod gpu;
pub mod log;
pub mod render;
pub mod scene;

// Main nova namespace module
pub mod nova {
    // Error types
    pub use crate::error::{Error, Result};

    // Render settings
    pub use crate::settings::{RenderSettings, ShadowQuality, ShadowSettings};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // GPU abstraction sub-module
    pub mod gpu {
        pub use crate::gpu::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render pipeline sub-module
    pub mod render {
        pub use crate::render::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
