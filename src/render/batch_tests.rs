//! Unit tests for batch.rs
//!
//! Exercises slot allocation, flush-and-restart on both overflow axes,
//! and the command sequence each flush records on the mock device.

use std::sync::Arc;
use crate::gpu::mock::{MockDevice, MockShaderLibrary, MockTexture};
use crate::gpu::{
    GraphicsDevice, Pipeline, PipelineDesc, ShaderLibrary, Texture, TextureFormat,
};
use crate::render::batch::{BatchContext, QuadBatcher, MAX_BATCH_TEXTURES};
use crate::render::stats::FrameStats;
use crate::render::vertex::QuadVertex;

// ============================================================================
// HELPERS
// ============================================================================

fn quad(slot: f32) -> [QuadVertex; 4] {
    let vertex = QuadVertex {
        position: [0.0, 0.0, 0.0],
        uv: [0.0, 0.0],
        texture_slot: slot,
        color: [1.0, 1.0, 1.0, 1.0],
    };
    [vertex; 4]
}

fn test_pipeline(device: &MockDevice) -> Arc<dyn Pipeline> {
    let shaders = MockShaderLibrary::permissive();
    let shader = shaders.shader("sprite_batch").expect("shader");
    device
        .create_pipeline(
            &PipelineDesc::fullscreen("sprite_batch", TextureFormat::R16G16B16A16_SFLOAT),
            &shader,
        )
        .expect("pipeline")
}

/// Run `body` with a fresh batcher and a live batch context
fn with_batcher<F>(max_quads: u32, body: F) -> (Vec<String>, FrameStats)
where
    F: FnOnce(&mut QuadBatcher<QuadVertex>, &mut BatchContext<'_>),
{
    let device = MockDevice::with_compute(256, 256);
    let pipeline = test_pipeline(&device);
    let default_texture = MockTexture::sampled("default", 1, 1);
    let mut stats = FrameStats::default();
    let mut batcher =
        QuadBatcher::<QuadVertex>::new(&device, "test", max_quads, 8).expect("batcher");
    let mut cmd = device.acquire_command_list().expect("cmd");

    {
        let mut ctx = BatchContext {
            device: &device,
            cmd: &mut *cmd,
            pipeline: &pipeline,
            default_texture: &default_texture,
            stats: &mut stats,
        };
        batcher.begin_batch(0);
        body(&mut batcher, &mut ctx);
    }

    (device.recorded(), stats)
}

fn count_draws(commands: &[String]) -> usize {
    commands
        .iter()
        .filter(|c| c.starts_with("draw_indexed:"))
        .count()
}

// ============================================================================
// SLOT ALLOCATION TESTS
// ============================================================================

#[test]
fn test_slots_are_one_based() {
    with_batcher(16, |batcher, ctx| {
        let a = MockTexture::sampled("a", 4, 4);
        let b = MockTexture::sampled("b", 4, 4);
        assert_eq!(batcher.submit_texture(&a, ctx).expect("slot"), 1.0);
        assert_eq!(batcher.submit_texture(&b, ctx).expect("slot"), 2.0);
        assert_eq!(batcher.texture_count(), 2);
    });
}

#[test]
fn test_resubmitted_texture_reuses_slot() {
    with_batcher(16, |batcher, ctx| {
        let a = MockTexture::sampled("a", 4, 4);
        let first = batcher.submit_texture(&a, ctx).expect("slot");
        let second = batcher.submit_texture(&a, ctx).expect("slot");
        assert_eq!(first, second);
        assert_eq!(batcher.texture_count(), 1);
    });
}

#[test]
fn test_full_slot_table_flushes_and_restarts() {
    let (commands, stats) = with_batcher(64, |batcher, ctx| {
        let textures: Vec<Arc<dyn Texture>> = (0..MAX_BATCH_TEXTURES + 1)
            .map(|i| MockTexture::sampled(&format!("t{}", i), 4, 4))
            .collect();

        for texture in &textures[..MAX_BATCH_TEXTURES] {
            let slot = batcher.submit_texture(texture, ctx).expect("slot");
            batcher.push_quad(quad(slot), ctx).expect("push");
        }
        assert_eq!(batcher.texture_count(), MAX_BATCH_TEXTURES);

        // The 17th texture forces a flush; it lands in slot 1 of a
        // fresh batch
        let slot = batcher
            .submit_texture(&textures[MAX_BATCH_TEXTURES], ctx)
            .expect("slot");
        assert_eq!(slot, 1.0);
        assert_eq!(batcher.texture_count(), 1);
        assert_eq!(batcher.index_count(), 0);
    });
    assert_eq!(count_draws(&commands), 1);
    assert_eq!(stats.batches_flushed, 1);
}

// ============================================================================
// QUAD CAPACITY TESTS
// ============================================================================

#[test]
fn test_three_quads_at_capacity_two_cause_two_flushes() {
    let (commands, stats) = with_batcher(2, |batcher, ctx| {
        // One texture submitted once; its slot survives the mid-batch flush
        let texture = MockTexture::sampled("shared", 4, 4);
        let slot = batcher.submit_texture(&texture, ctx).expect("slot");
        assert_eq!(slot, 1.0);
        for _ in 0..3 {
            batcher.push_quad(quad(slot), ctx).expect("push");
        }
        assert_eq!(batcher.texture_count(), 1);
        batcher.flush(ctx).expect("final flush");
        assert_eq!(batcher.draw_call_index(), 2);
    });
    // Overflow flush (2 quads) + final flush (1 quad)
    assert_eq!(count_draws(&commands), 2);
    assert_eq!(stats.batches_flushed, 2);
    assert_eq!(stats.triangles, 6);
    assert!(commands.contains(&"draw_indexed:12".to_string()));
    assert!(commands.contains(&"draw_indexed:6".to_string()));
}

#[test]
fn test_index_count_tracks_pushes() {
    with_batcher(8, |batcher, ctx| {
        batcher.push_quad(quad(0.0), ctx).expect("push");
        batcher.push_quad(quad(0.0), ctx).expect("push");
        assert_eq!(batcher.index_count(), 12);
        assert_eq!(batcher.vertex_count(), 8);
    });
}

// ============================================================================
// FLUSH TESTS
// ============================================================================

#[test]
fn test_empty_flush_is_noop() {
    let (commands, stats) = with_batcher(8, |batcher, ctx| {
        batcher.flush(ctx).expect("flush");
    });
    assert_eq!(count_draws(&commands), 0);
    assert_eq!(stats.draw_calls, 0);
    assert_eq!(stats.batches_flushed, 0);
}

#[test]
fn test_flush_records_bind_sequence() {
    let (commands, _) = with_batcher(8, |batcher, ctx| {
        batcher.push_quad(quad(0.0), ctx).expect("push");
        batcher.flush(ctx).expect("flush");
    });
    let draws: Vec<&String> = commands
        .iter()
        .filter(|c| {
            c.starts_with("bind_pipeline")
                || c.starts_with("bind_binding_group")
                || c.starts_with("bind_vertex_buffer")
                || c.starts_with("bind_index_buffer")
                || c.starts_with("draw_indexed")
        })
        .collect();
    assert_eq!(
        draws,
        vec![
            "bind_pipeline:sprite_batch",
            "bind_binding_group:1",
            "bind_vertex_buffer",
            "bind_index_buffer",
            "draw_indexed:6",
        ]
    );
}

#[test]
fn test_begin_batch_resets_draw_cursor() {
    with_batcher(8, |batcher, ctx| {
        batcher.push_quad(quad(0.0), ctx).expect("push");
        batcher.flush(ctx).expect("flush");
        assert_eq!(batcher.draw_call_index(), 1);

        batcher.begin_batch(0);
        assert_eq!(batcher.draw_call_index(), 0);
        assert_eq!(batcher.index_count(), 0);
        assert_eq!(batcher.texture_count(), 0);
    });
}

#[test]
fn test_frame_index_wraps_by_frames_in_flight() {
    // Device has 3 frames in flight; frame 3 maps back to buffer set 0
    with_batcher(8, |batcher, ctx| {
        batcher.begin_batch(3);
        batcher.push_quad(quad(0.0), ctx).expect("push");
        batcher.flush(ctx).expect("flush");
    });
}
