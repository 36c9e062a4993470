//! Per-frame render pipeline
//!
//! Visibility and command-queue construction, cascaded shadows, the
//! generic quad batching engine, the post-process chain, and the pass
//! orchestrator that drives it all once per frame.

mod batch;
mod bloom;
mod cascades;
mod command;
mod light_arena;
mod ping_pong;
mod scene_renderer;
mod stats;
mod vertex;
mod visibility;

pub use batch::{BatchContext, QuadBatcher, MAX_BATCH_TEXTURES};
pub use bloom::{
    bloom_mip_count, bloom_pass_count, bloom_result, bloom_schedule, prefilter_params, BloomPass,
    BloomStage, BloomStageKind, BLOOM_WORKGROUP_SIZE,
};
pub use cascades::{
    cascade_split_fractions, round_up_to_multiple_of_5, Cascade, CascadeShadowMap, MAX_CASCADES,
};
pub use command::{RenderCommand, RenderCommand2D};
pub use light_arena::{LightArena, LightData, MAX_LIGHTS};
pub use ping_pong::PingPongRing;
pub use scene_renderer::SceneRenderer;
pub use stats::FrameStats;
pub use vertex::{GlyphVertex, QuadVertex, QuadWriter};
pub use visibility::{sort_particles_back_to_front, FrameQueues, VisibilityBuilder};
