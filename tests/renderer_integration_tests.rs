//! Integration tests for the scene renderer frame loop
//!
//! These tests drive whole begin_scene/render frames through the public
//! API against the mock backend and assert on the recorded command
//! streams, frame stats, and target lifecycles.


use std::sync::Arc;
use mock_test_utils::{create_test_camera, create_test_world};
use nova_render::glam::{Vec2, Vec3, Vec4};
use nova_render::nova::gpu::mock::{MockDevice, MockShaderLibrary};
use nova_render::nova::render::{bloom_mip_count, bloom_pass_count, BloomPass, SceneRenderer};
use nova_render::nova::RenderSettings;

fn create_renderer(device: &Arc<MockDevice>, settings: &RenderSettings) -> SceneRenderer {
    let shaders = Arc::new(MockShaderLibrary::permissive());
    SceneRenderer::new(device.clone(), shaders, 1280, 720, settings).expect("renderer")
}

fn pass_labels(commands: &[String]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|c| c.strip_prefix("begin_render_pass:"))
        .map(String::from)
        .collect()
}

// ============================================================================
// FRAME LOOP TESTS
// ============================================================================

#[test]
fn test_integration_three_frame_loop() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings::default();
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 3);
    let camera = create_test_camera();

    // Frames in flight cycle the batchers' per-frame buffers; three
    // frames covers a full cycle on this device
    for _ in 0..3 {
        device.clear_recorded();
        renderer.begin_scene(&world, &camera, &settings);
        renderer.render(&settings).expect("render");

        let commands = device.recorded();
        assert_eq!(commands.first().map(String::as_str), Some("begin"));
        assert_eq!(commands.last().map(String::as_str), Some("submit"));
        assert_eq!(renderer.stats().visible_objects, 3);
        assert_eq!(renderer.stats().lights, 1);

        device.advance_frame();
    }
}

#[test]
fn test_integration_every_pass_enabled() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings {
        ssao_enabled: true,
        debanding_enabled: true,
        depth_of_field_enabled: true,
        sharpen_enabled: true,
        fxaa_enabled: true,
        chromatic_aberration_enabled: true,
        filmic_grain_enabled: true,
        debug_overlay_enabled: true,
        ..RenderSettings::default()
    };
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 2);

    renderer.begin_scene(&world, &create_test_camera(), &settings);
    renderer.submit_debug_quad(Vec3::new(0.0, 0.0, -5.0), Vec2::ONE, Vec4::ONE);
    renderer.render(&settings).expect("render");

    let labels = pass_labels(&device.recorded());
    let index = |name: &str| {
        labels
            .iter()
            .position(|l| l == name)
            .unwrap_or_else(|| panic!("pass '{}' missing from {:?}", name, labels))
    };

    // Geometry first, post chain in its fixed order, composite last
    assert!(index("depth_prepass") < index("ssao"));
    assert!(index("ssao") < index("shadow_cascade_0"));
    assert!(index("shadow_cascade_3") < index("forward"));
    assert!(index("forward") < index("skybox"));
    assert!(index("skybox") < index("debug_overlay"));
    assert!(index("debug_overlay") < index("depth_of_field"));
    assert!(index("depth_of_field") < index("debanding"));
    assert!(index("debanding") < index("tone_mapping"));
    assert!(index("tone_mapping") < index("sharpen"));
    assert!(index("sharpen") < index("fxaa"));
    assert!(index("fxaa") < index("chromatic_aberration"));
    assert!(index("chromatic_aberration") < index("filmic_grain"));
    assert_eq!(labels.last().map(String::as_str), Some("final_composite"));
}

#[test]
fn test_integration_minimal_settings_frame() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings {
        shadows_enabled: false,
        skybox_enabled: false,
        bloom_enabled: false,
        ..RenderSettings::default()
    };
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 1);

    renderer.begin_scene(&world, &create_test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let labels = pass_labels(&device.recorded());
    assert_eq!(
        labels,
        vec!["depth_prepass", "forward", "tone_mapping", "final_composite"]
    );
}

// ============================================================================
// BLOOM STRATEGY TESTS
// ============================================================================

#[test]
fn test_integration_compute_bloom_dispatches() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings::default();
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 1);

    assert_eq!(renderer.bloom_strategy(), BloomPass::Compute);

    renderer.begin_scene(&world, &create_test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let dispatches = device
        .recorded()
        .iter()
        .filter(|c| c.starts_with("dispatch:"))
        .count();
    assert_eq!(dispatches as u32, bloom_pass_count(bloom_mip_count(1280, 720)));
}

#[test]
fn test_integration_raster_bloom_fallback() {
    let device = Arc::new(MockDevice::raster_only(1280, 720));
    let settings = RenderSettings::default();
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 1);

    assert_eq!(renderer.bloom_strategy(), BloomPass::Raster);

    renderer.begin_scene(&world, &create_test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert!(!commands.iter().any(|c| c.starts_with("dispatch:")));
    let bloom_passes = commands
        .iter()
        .filter(|c| c.starts_with("begin_render_pass:bloom"))
        .count();
    assert_eq!(bloom_passes as u32, bloom_pass_count(bloom_mip_count(1280, 720)));
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_integration_resize_between_frames() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings::default();
    let mut renderer = create_renderer(&device, &settings);
    let world = create_test_world(&device, 1);
    let camera = create_test_camera();

    renderer.begin_scene(&world, &camera, &settings);
    renderer.render(&settings).expect("render");
    assert_eq!(renderer.resolution(), (1280, 720));

    renderer.on_resize(1920, 1080, &settings).expect("resize");
    assert_eq!(renderer.resolution(), (1920, 1080));
    assert_eq!(renderer.bloom_mip_levels(), bloom_mip_count(1920, 1080));

    // The renderer stays usable after target recreation
    renderer.begin_scene(&world, &camera, &settings);
    renderer.render(&settings).expect("render after resize");
}

#[test]
fn test_integration_render_scale_halves_resolution() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings {
        render_scale: 0.5,
        ..RenderSettings::default()
    };
    let renderer = create_renderer(&device, &settings);
    assert_eq!(renderer.resolution(), (640, 360));
}

// ============================================================================
// QUEUE INSPECTION TESTS
// ============================================================================

#[test]
fn test_integration_queues_rebuilt_each_scene() {
    let device = Arc::new(MockDevice::with_compute(1280, 720));
    let settings = RenderSettings::default();
    let mut renderer = create_renderer(&device, &settings);
    let camera = create_test_camera();

    let crowded = create_test_world(&device, 5);
    renderer.begin_scene(&crowded, &camera, &settings);
    assert_eq!(renderer.queues().forward.len(), 5);

    let sparse = create_test_world(&device, 1);
    renderer.begin_scene(&sparse, &camera, &settings);
    assert_eq!(renderer.queues().forward.len(), 1);
    assert_eq!(renderer.lights().len(), 1);
}
