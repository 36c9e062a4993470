//! Unit tests for scene_renderer.rs
//!
//! Drives whole frames against the mock device and asserts on the
//! recorded pass sequence.

use std::sync::Arc;
use glam::{Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use crate::camera::Camera;
use crate::error::Error;
use crate::gpu::mock::{MockDevice, MockShaderLibrary, MockTexture};
use crate::gpu::{BufferDesc, BufferUsage, GraphicsDevice};
use crate::render::bloom::{bloom_mip_count, bloom_pass_count, BloomPass};
use crate::render::scene_renderer::SceneRenderer;
use crate::scene::{
    Aabb, Font, Glyph, Light, Material, Mesh, MeshRenderer, Particle, ParticleEmitter,
    RenderFlags, Sprite, TextLabel, Transform, World,
};
use crate::settings::RenderSettings;

// ============================================================================
// HELPERS
// ============================================================================

fn test_camera() -> Camera {
    Camera::new(60f32.to_radians(), 4.0 / 3.0, 0.1, 1000.0)
}

fn test_mesh(device: &dyn GraphicsDevice) -> Arc<Mesh> {
    let buffer = |label: &str, usage| {
        device
            .create_buffer(&BufferDesc {
                label: label.to_string(),
                size: 256,
                usage,
            })
            .expect("buffer")
    };
    Arc::new(Mesh {
        vertex_buffer: buffer("vtx", BufferUsage::Vertex),
        index_buffer: buffer("idx", BufferUsage::Index),
        index_count: 36,
        aabb: Aabb::unit(),
    })
}

/// One shadow-casting cube in front of the camera plus a directional light
fn test_world(device: &dyn GraphicsDevice) -> World {
    let mut world = World::new();

    let cube = world.spawn();
    world.set_transform(cube, Transform::from_translation(Vec3::new(0.0, 0.0, -10.0)));
    world.set_mesh(
        cube,
        MeshRenderer {
            mesh: test_mesh(device),
            material: Material::default(),
            flags: RenderFlags::default(),
        },
    );

    let sun = world.spawn();
    world.set_transform(sun, Transform::from_translation(Vec3::new(0.0, 50.0, 0.0)));
    world.set_light(
        sun,
        Light::directional(Vec3::new(-0.3, -1.0, -0.2), Vec3::ONE, 3.0),
    );

    world
}

fn make_renderer(device: Arc<MockDevice>, settings: &RenderSettings) -> SceneRenderer {
    let shaders = Arc::new(MockShaderLibrary::permissive());
    SceneRenderer::new(device, shaders, 640, 480, settings).expect("renderer")
}

fn index_of(commands: &[String], needle: &str) -> usize {
    commands
        .iter()
        .position(|c| c == needle)
        .unwrap_or_else(|| panic!("'{}' not recorded in {:?}", needle, commands))
}

fn pass_count(commands: &[String], prefix: &str) -> usize {
    commands.iter().filter(|c| c.starts_with(prefix)).count()
}

/// Commands recorded between a pass's begin and its end_render_pass
fn pass_window<'a>(commands: &'a [String], label: &str) -> &'a [String] {
    let start = index_of(commands, &format!("begin_render_pass:{}", label));
    let end = commands[start..]
        .iter()
        .position(|c| c == "end_render_pass")
        .map(|offset| start + offset)
        .expect("pass not closed");
    &commands[start..end]
}

// ============================================================================
// FRAME SEQUENCE TESTS
// ============================================================================

#[test]
fn test_default_frame_pass_order() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let mut renderer = make_renderer(device.clone(), &RenderSettings::default());
    let world = test_world(&*device);
    let settings = RenderSettings::default();
    device.clear_recorded();

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(commands.first().map(String::as_str), Some("begin"));
    assert_eq!(commands.last().map(String::as_str), Some("submit"));

    let prepass = index_of(&commands, "begin_render_pass:depth_prepass");
    let shadow = index_of(&commands, "begin_render_pass:shadow_cascade_0");
    let forward = index_of(&commands, "begin_render_pass:forward");
    let skybox = index_of(&commands, "begin_render_pass:skybox");
    let tonemap = index_of(&commands, "begin_render_pass:tone_mapping");
    let composite = index_of(&commands, "begin_render_pass:final_composite");
    assert!(prepass < shadow);
    assert!(shadow < forward);
    assert!(forward < skybox);
    assert!(skybox < tonemap);
    assert!(tonemap < composite);
}

#[test]
fn test_all_four_cascades_rendered() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let mut renderer = make_renderer(device.clone(), &RenderSettings::default());
    let world = test_world(&*device);
    let settings = RenderSettings::default();

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:shadow_cascade_"), 4);
    assert_eq!(renderer.cascades().count(), 4);
}

#[test]
fn test_shadows_disabled_skips_cascade_passes() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings {
        shadows_enabled: false,
        ..RenderSettings::default()
    };
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:shadow_cascade_"), 0);
    assert!(!renderer.cascades().is_active());
}

#[test]
fn test_no_directional_light_skips_shadow_pass() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);

    let mut world = World::new();
    let cube = world.spawn();
    world.set_transform(cube, Transform::from_translation(Vec3::new(0.0, 0.0, -10.0)));
    world.set_mesh(
        cube,
        MeshRenderer {
            mesh: test_mesh(&*device),
            material: Material::default(),
            flags: RenderFlags::default(),
        },
    );

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");
    assert_eq!(
        pass_count(&device.recorded(), "begin_render_pass:shadow_cascade_"),
        0
    );
}

#[test]
fn test_render_without_begin_scene_is_noop() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let mut renderer = make_renderer(device.clone(), &RenderSettings::default());
    device.clear_recorded();

    renderer.render(&RenderSettings::default()).expect("render");
    assert!(device.recorded().is_empty());
}

#[test]
fn test_failed_acquire_propagates() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);
    renderer.begin_scene(&world, &test_camera(), &settings);

    *device.fail_acquire.lock().expect("lock") = true;
    let result = renderer.render(&settings);
    assert!(matches!(result, Err(Error::CapabilityMissing(_))));
}

#[test]
fn test_tone_mapping_runs_even_with_bloom_disabled() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings {
        bloom_enabled: false,
        ..RenderSettings::default()
    };
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "dispatch:"), 0);
    assert_eq!(pass_count(&commands, "begin_render_pass:tone_mapping"), 1);
}

// ============================================================================
// PASS DISABLEMENT TESTS
// ============================================================================

#[test]
fn test_missing_shader_pass_leaves_stream_unchanged() {
    // A pass whose shader never resolves records nothing, whether the
    // pass is enabled or not
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let shaders = MockShaderLibrary::new();
    for name in ["forward_pbr", "tone_mapping", "final_composite"] {
        shaders.add(name);
    }
    let base = RenderSettings {
        shadows_enabled: false,
        skybox_enabled: false,
        bloom_enabled: false,
        ..RenderSettings::default()
    };
    let mut renderer =
        SceneRenderer::new(device.clone(), Arc::new(shaders), 640, 480, &base).expect("renderer");
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &base);
    renderer.render(&base).expect("render");
    let without_sharpen = device.recorded();
    device.clear_recorded();

    let with_sharpen = RenderSettings {
        sharpen_enabled: true,
        ..base
    };
    renderer.render(&with_sharpen).expect("render");
    assert_eq!(device.recorded(), without_sharpen);
}

#[test]
fn test_optional_posts_disabled_by_default() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    for label in [
        "begin_render_pass:ssao",
        "begin_render_pass:depth_of_field",
        "begin_render_pass:sharpen",
        "begin_render_pass:fxaa",
        "begin_render_pass:chromatic_aberration",
        "begin_render_pass:filmic_grain",
        "begin_render_pass:debanding",
        "begin_render_pass:debug_overlay",
    ] {
        assert_eq!(pass_count(&commands, label), 0, "{}", label);
    }
}

#[test]
fn test_ssao_blur_runs_both_directions() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings {
        ssao_enabled: true,
        ..RenderSettings::default()
    };
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:ssao"), 3);
    let h = index_of(&commands, "begin_render_pass:ssao_blur_h");
    let v = index_of(&commands, "begin_render_pass:ssao_blur_v");
    assert!(h < v);
}

// ============================================================================
// BLOOM TESTS
// ============================================================================

#[test]
fn test_compute_bloom_dispatch_count_matches_schedule() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    assert_eq!(renderer.bloom_strategy(), BloomPass::Compute);
    let mips = bloom_mip_count(640, 480);
    assert_eq!(renderer.bloom_mip_levels(), mips);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(
        pass_count(&commands, "dispatch:") as u32,
        bloom_pass_count(mips)
    );
    assert_eq!(pass_count(&commands, "begin_render_pass:bloom"), 0);
}

#[test]
fn test_raster_bloom_pass_count_matches_schedule() {
    let device = Arc::new(MockDevice::raster_only(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    assert_eq!(renderer.bloom_strategy(), BloomPass::Raster);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    let mips = bloom_mip_count(640, 480);
    assert_eq!(
        pass_count(&commands, "begin_render_pass:bloom") as u32,
        bloom_pass_count(mips)
    );
    assert_eq!(pass_count(&commands, "dispatch:"), 0);
}

// ============================================================================
// BATCHED CONTENT TESTS
// ============================================================================

#[test]
fn test_particles_and_text_record_passes() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let mut world = test_world(&*device);

    let emitter = world.spawn();
    world.set_transform(emitter, Transform::from_translation(Vec3::new(0.0, 1.0, -5.0)));
    world.set_emitter(
        emitter,
        ParticleEmitter {
            particles: vec![
                Particle {
                    position: Vec3::new(0.0, 0.0, -1.0),
                    size: Vec2::ONE,
                    color: Vec4::ONE,
                    life: 1.0,
                    frame: 0,
                },
                Particle {
                    position: Vec3::new(0.0, 0.0, -4.0),
                    size: Vec2::ONE,
                    color: Vec4::ONE,
                    life: 1.0,
                    frame: 1,
                },
            ],
            texture: Some(MockTexture::sampled("flame", 64, 64)),
            sort_particles: true,
            additive: true,
            animation_grid: 2,
        },
    );

    let mut glyphs = FxHashMap::default();
    glyphs.insert(
        'a',
        Glyph {
            uv_min: Vec2::ZERO,
            uv_max: Vec2::splat(0.1),
            size: Vec2::new(8.0, 12.0),
            offset: Vec2::ZERO,
            advance: 9.0,
        },
    );
    let font = Arc::new(Font {
        atlas: MockTexture::sampled("font_atlas", 256, 256),
        glyphs,
        line_height: 16.0,
    });
    let label = world.spawn();
    world.set_transform(label, Transform::from_translation(Vec3::new(0.0, 2.0, -5.0)));
    world.set_label(
        label,
        TextLabel {
            text: "aa".to_string(),
            font,
            color: Vec4::ONE,
            scale: 1.0,
        },
    );

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:particles"), 1);
    assert_eq!(pass_count(&commands, "begin_render_pass:text"), 1);

    // Both passes hand the camera matrix (16 floats) to the batch shader
    let matrix_push = "push_constants:64".to_string();
    assert!(pass_window(&commands, "particles").contains(&matrix_push));
    assert!(pass_window(&commands, "text").contains(&matrix_push));
}

#[test]
fn test_sprite_pass_pushes_camera_matrix() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let mut world = test_world(&*device);

    let sprite = world.spawn();
    world.set_transform(sprite, Transform::from_translation(Vec3::new(0.0, 0.0, -5.0)));
    world.set_sprite(sprite, Sprite::colored(Vec2::ONE, Vec4::ONE));

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    // Sprite vertices stay in world space; the view-projection reaches
    // the shader through push constants instead
    let commands = device.recorded();
    let window = pass_window(&commands, "sprites_2d");
    assert!(window.contains(&"push_constants:64".to_string()));
    assert!(window.iter().any(|c| c.starts_with("draw_indexed:")));
}

#[test]
fn test_debug_quads_render_when_enabled() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings {
        debug_overlay_enabled: true,
        ..RenderSettings::default()
    };
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.submit_debug_quad(Vec3::new(0.0, 0.0, -5.0), Vec2::ONE, Vec4::ONE);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:debug_overlay"), 1);
    assert!(pass_window(&commands, "debug_overlay").contains(&"push_constants:64".to_string()));
}

#[test]
fn test_forward_occlusion_input_tracks_ssao_setting() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let renderer = make_renderer(device, &settings);

    // SSAO disabled by default; shading must read white, not the
    // never-written SSAO target
    let disabled = renderer.ssao_input(&settings);
    assert!(Arc::ptr_eq(&disabled, &renderer.default_texture));

    let ssao_on = RenderSettings {
        ssao_enabled: true,
        ..RenderSettings::default()
    };
    let enabled = renderer.ssao_input(&ssao_on);
    assert!(Arc::ptr_eq(&enabled, &renderer.ssao_targets[0]));
}

#[test]
fn test_missing_composite_shader_falls_back_to_copy() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let shaders = MockShaderLibrary::new();
    shaders.add("forward_pbr");
    shaders.add("tone_mapping");
    let settings = RenderSettings::default();
    let mut renderer = SceneRenderer::new(device.clone(), Arc::new(shaders), 640, 480, &settings)
        .expect("renderer");
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "begin_render_pass:final_composite"), 0);
    assert_eq!(pass_count(&commands, "copy_texture"), 1);
}

#[test]
fn test_scaled_frame_skips_mismatched_copy_fallback() {
    // copy_texture needs identical extents; at render scale 0.5 the
    // internal target no longer matches the backbuffer
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let shaders = MockShaderLibrary::new();
    shaders.add("forward_pbr");
    shaders.add("tone_mapping");
    let settings = RenderSettings {
        render_scale: 0.5,
        ..RenderSettings::default()
    };
    let mut renderer = SceneRenderer::new(device.clone(), Arc::new(shaders), 640, 480, &settings)
        .expect("renderer");
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let commands = device.recorded();
    assert_eq!(pass_count(&commands, "copy_texture"), 0);
    assert_eq!(pass_count(&commands, "begin_render_pass:final_composite"), 0);
}

// ============================================================================
// RESIZE TESTS
// ============================================================================

#[test]
fn test_invalid_settings_rejected_at_target_creation() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let shaders = Arc::new(MockShaderLibrary::permissive());

    let zero_scale = RenderSettings {
        render_scale: 0.0,
        ..RenderSettings::default()
    };
    let result = SceneRenderer::new(device.clone(), shaders.clone(), 640, 480, &zero_scale);
    assert!(matches!(result, Err(Error::BackendError(_))));

    let odd_msaa = RenderSettings {
        msaa_samples: 3,
        ..RenderSettings::default()
    };
    let result = SceneRenderer::new(device, shaders, 640, 480, &odd_msaa);
    assert!(matches!(result, Err(Error::BackendError(_))));
}

#[test]
fn test_internal_resolution_rounds_down_to_even() {
    let device = Arc::new(MockDevice::with_compute(801, 601));
    let shaders = Arc::new(MockShaderLibrary::permissive());
    let settings = RenderSettings::default();
    let renderer =
        SceneRenderer::new(device, shaders, 801, 601, &settings).expect("renderer");
    assert_eq!(renderer.resolution(), (800, 600));
}

#[test]
fn test_render_scale_applied_before_rounding() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let shaders = Arc::new(MockShaderLibrary::permissive());
    let settings = RenderSettings {
        render_scale: 0.75,
        ..RenderSettings::default()
    };
    let renderer =
        SceneRenderer::new(device, shaders, 640, 480, &settings).expect("renderer");
    // 640 * 0.75 = 480, 480 * 0.75 = 360
    assert_eq!(renderer.resolution(), (480, 360));
}

#[test]
fn test_on_resize_recreates_targets() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);

    renderer.on_resize(1280, 720, &settings).expect("resize");
    assert_eq!(renderer.resolution(), (1280, 720));
    assert_eq!(renderer.bloom_mip_levels(), bloom_mip_count(1280, 720));

    let scene_targets = device
        .texture_labels()
        .iter()
        .filter(|l| l.as_str() == "scene_color_0")
        .count();
    assert_eq!(scene_targets, 2);
}

#[test]
fn test_render_scale_change_triggers_recreation() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    let scaled = RenderSettings {
        render_scale: 0.5,
        ..RenderSettings::default()
    };
    renderer.begin_scene(&world, &test_camera(), &scaled);
    renderer.render(&scaled).expect("render");
    assert_eq!(renderer.resolution(), (320, 240));
}

// ============================================================================
// STATS TESTS
// ============================================================================

#[test]
fn test_frame_stats_populated() {
    let device = Arc::new(MockDevice::with_compute(640, 480));
    let settings = RenderSettings::default();
    let mut renderer = make_renderer(device.clone(), &settings);
    let world = test_world(&*device);

    renderer.begin_scene(&world, &test_camera(), &settings);
    renderer.render(&settings).expect("render");

    let stats = renderer.stats();
    assert_eq!(stats.visible_objects, 1);
    assert_eq!(stats.lights, 1);
    assert!(stats.shadow_casters > 0);
    assert!(stats.draw_calls > 0);
    assert!(stats.triangles > 0);
}
