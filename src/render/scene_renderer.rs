/// Scene renderer — the per-frame pass orchestrator.
///
/// `begin_scene` builds the frame's command queues (visibility, lights,
/// cascades, particle/text capture); `render` drives the fixed pass
/// sequence into the swapchain command list; `on_resize` rebuilds every
/// size-dependent target. The orchestrator owns no business logic beyond
/// ordering, clearing before first use, and resize handling.
///
/// Error policy: a missing or uncompiled shader, an empty queue, or a
/// disabled pass is a silent skip. Only device-level failures (no
/// swapchain command list, resource creation failure) propagate.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::camera::Camera;
use crate::error::Result;
use crate::gpu::{
    BindingEntry, BindingGroupDesc, BindingResource, BlendMode, Buffer, BufferDesc, BufferUsage,
    CommandList, CullMode, GraphicsDevice, IndexType, Pipeline, PipelineCache, PipelineDesc,
    RenderPassDesc, Shader, ShaderLibrary, ShaderStage, Texture, TextureDesc, TextureFormat,
    TextureUsage, Viewport,
};
use crate::scene::{Font, LightKind, Particle, World};
use crate::settings::RenderSettings;
use super::batch::{BatchContext, QuadBatcher};
use super::bloom::{
    bloom_mip_count, bloom_result, bloom_schedule, prefilter_params, BloomPass, BloomStageKind,
};
use super::cascades::{CascadeShadowMap, MAX_CASCADES};
use super::light_arena::{LightArena, MAX_LIGHTS};
use super::ping_pong::PingPongRing;
use super::stats::FrameStats;
use super::vertex::{GlyphVertex, QuadVertex};
use super::visibility::{sort_particles_back_to_front, FrameQueues, VisibilityBuilder};

const LOG_SRC: &str = "nova::SceneRenderer";

/// Batching limits shared by the 2D, particle, and glyph batchers
const MAX_QUADS: u32 = 1000;
const MAX_BATCH_DRAW_CALLS: u32 = 100;

/// Scene color format for the ping-pong targets
const SCENE_FORMAT: TextureFormat = TextureFormat::R16G16B16A16_SFLOAT;

/// Floats per light in the shading uniform block
const LIGHT_STRIDE: usize = 16;

/// Particles captured from one emitter at begin_scene
struct FrameParticles {
    texture: Option<Arc<dyn Texture>>,
    additive: bool,
    grid: u32,
    particles: Vec<Particle>,
}

/// Text run captured at begin_scene
struct FrameText {
    font: Arc<Font>,
    text: String,
    color: Vec4,
    scale: f32,
    world: Mat4,
}

/// All size-dependent GPU targets, rebuilt together on resize
struct TargetSet {
    width: u32,
    height: u32,
    shadow_map_size: u32,
    msaa_samples: u32,
    render_scale: f32,
    scene_colors: [Arc<dyn Texture>; 2],
    depth: Arc<dyn Texture>,
    ssao: [Arc<dyn Texture>; 2],
    shadow_map: Arc<dyn Texture>,
    bloom: [Arc<dyn Texture>; 3],
    bloom_mips: u32,
}

/// Round a surface dimension down to an even internal dimension
fn scaled_even(dim: u32, scale: f32) -> u32 {
    (((dim as f32 * scale) as u32) & !1).max(2)
}

fn build_targets(
    device: &dyn GraphicsDevice,
    surface_width: u32,
    surface_height: u32,
    settings: &RenderSettings,
) -> Result<TargetSet> {
    if !settings.render_scale.is_finite() || settings.render_scale <= 0.0 {
        crate::engine_bail!(LOG_SRC, "render scale {} is not positive", settings.render_scale);
    }
    if !settings.msaa_samples.is_power_of_two() {
        crate::engine_bail!(LOG_SRC, "MSAA sample count {} is not a power of two", settings.msaa_samples);
    }

    let width = scaled_even(surface_width, settings.render_scale);
    let height = scaled_even(surface_height, settings.render_scale);
    let shadow_map_size = settings.shadow_quality.map_size();

    let scene_colors = [
        device.create_texture(&TextureDesc::color_target("scene_color_0", width, height, SCENE_FORMAT))?,
        device.create_texture(&TextureDesc::color_target("scene_color_1", width, height, SCENE_FORMAT))?,
    ];
    let depth = device.create_texture(&TextureDesc::depth_target("scene_depth", width, height))?;

    let ssao_width = (width / 2).max(1);
    let ssao_height = (height / 2).max(1);
    let ssao = [
        device.create_texture(&TextureDesc::color_target(
            "ssao_0",
            ssao_width,
            ssao_height,
            TextureFormat::R8G8B8A8_UNORM,
        ))?,
        device.create_texture(&TextureDesc::color_target(
            "ssao_1",
            ssao_width,
            ssao_height,
            TextureFormat::R8G8B8A8_UNORM,
        ))?,
    ];

    let shadow_map = device.create_texture(&TextureDesc {
        label: "shadow_cascades".to_string(),
        width: shadow_map_size,
        height: shadow_map_size,
        format: TextureFormat::D32_FLOAT,
        usage: TextureUsage::DepthStencil,
        mip_levels: 1,
        array_layers: MAX_CASCADES as u32,
        samples: 1,
        data: None,
    })?;

    let bloom_mips = bloom_mip_count(width, height);
    let mut bloom_textures = Vec::with_capacity(3);
    for index in 0..3 {
        bloom_textures.push(device.create_texture(&TextureDesc {
            label: format!("bloom_{}", index),
            width,
            height,
            format: TextureFormat::R11G11B10_UFLOAT,
            usage: TextureUsage::Storage,
            mip_levels: bloom_mips,
            array_layers: 1,
            samples: 1,
            data: None,
        })?);
    }
    let bloom: [Arc<dyn Texture>; 3] = [
        bloom_textures[0].clone(),
        bloom_textures[1].clone(),
        bloom_textures[2].clone(),
    ];

    Ok(TargetSet {
        width,
        height,
        shadow_map_size,
        msaa_samples: settings.msaa_samples,
        render_scale: settings.render_scale,
        scene_colors,
        depth,
        ssao,
        shadow_map,
        bloom,
        bloom_mips,
    })
}

/// Per-frame render-pass pipeline driver
pub struct SceneRenderer {
    device: Arc<dyn GraphicsDevice>,
    shaders: Arc<dyn ShaderLibrary>,
    pipeline_cache: PipelineCache,

    surface_width: u32,
    surface_height: u32,
    width: u32,
    height: u32,
    shadow_map_size: u32,
    msaa_samples: u32,
    render_scale: f32,

    ring: PingPongRing,
    depth_target: Arc<dyn Texture>,
    ssao_targets: [Arc<dyn Texture>; 2],
    shadow_map: Arc<dyn Texture>,
    bloom_textures: [Arc<dyn Texture>; 3],
    bloom_mips: u32,
    bloom_strategy: BloomPass,

    default_texture: Arc<dyn Texture>,
    light_buffer: Arc<dyn Buffer>,
    cascade_buffer: Arc<dyn Buffer>,

    cascades: CascadeShadowMap,
    queues: FrameQueues,
    lights: LightArena,
    stats: FrameStats,

    sprite_batcher: QuadBatcher<QuadVertex>,
    particle_batcher: QuadBatcher<QuadVertex>,
    glyph_batcher: QuadBatcher<GlyphVertex>,

    frame_particles: Vec<FrameParticles>,
    frame_texts: Vec<FrameText>,
    debug_quads: Vec<(Vec3, Vec2, Vec4)>,

    camera: Option<Camera>,
    scene_ready: bool,
}

impl SceneRenderer {
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        shaders: Arc<dyn ShaderLibrary>,
        surface_width: u32,
        surface_height: u32,
        settings: &RenderSettings,
    ) -> Result<Self> {
        let targets = build_targets(&*device, surface_width, surface_height, settings)?;
        let bloom_strategy = BloomPass::select(device.caps());

        let default_texture = device.create_texture(&TextureDesc {
            label: "default_white".to_string(),
            width: 1,
            height: 1,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::Sampled,
            mip_levels: 1,
            array_layers: 1,
            samples: 1,
            data: Some(vec![255, 255, 255, 255]),
        })?;

        let light_buffer = device.create_buffer(&BufferDesc {
            label: "frame_lights".to_string(),
            size: ((4 + MAX_LIGHTS * LIGHT_STRIDE) * std::mem::size_of::<f32>()) as u64,
            usage: BufferUsage::Uniform,
        })?;
        let cascade_buffer = device.create_buffer(&BufferDesc {
            label: "frame_cascades".to_string(),
            size: ((MAX_CASCADES * 16 + 8) * std::mem::size_of::<f32>()) as u64,
            usage: BufferUsage::Uniform,
        })?;

        let sprite_batcher = QuadBatcher::new(&*device, "sprites", MAX_QUADS, MAX_BATCH_DRAW_CALLS)?;
        let particle_batcher =
            QuadBatcher::new(&*device, "particles", MAX_QUADS, MAX_BATCH_DRAW_CALLS)?;
        let glyph_batcher = QuadBatcher::new(&*device, "glyphs", MAX_QUADS, MAX_BATCH_DRAW_CALLS)?;

        crate::engine_info!(
            LOG_SRC,
            "initialized {}x{} ({} bloom mips, {:?} bloom)",
            targets.width,
            targets.height,
            targets.bloom_mips,
            bloom_strategy
        );

        Ok(Self {
            device,
            shaders,
            pipeline_cache: PipelineCache::new(),
            surface_width,
            surface_height,
            width: targets.width,
            height: targets.height,
            shadow_map_size: targets.shadow_map_size,
            msaa_samples: targets.msaa_samples,
            render_scale: targets.render_scale,
            ring: PingPongRing::new(
                targets.scene_colors[0].clone(),
                targets.scene_colors[1].clone(),
            ),
            depth_target: targets.depth,
            ssao_targets: targets.ssao,
            shadow_map: targets.shadow_map,
            bloom_textures: targets.bloom,
            bloom_mips: targets.bloom_mips,
            bloom_strategy,
            default_texture,
            light_buffer,
            cascade_buffer,
            cascades: CascadeShadowMap::new(),
            queues: FrameQueues::new(),
            lights: LightArena::new(),
            stats: FrameStats::default(),
            sprite_batcher,
            particle_batcher,
            glyph_batcher,
            frame_particles: Vec::new(),
            frame_texts: Vec::new(),
            debug_quads: Vec::new(),
            camera: None,
            scene_ready: false,
        })
    }

    // ===== FRAME SETUP =====

    /// Build this frame's queues: lights, cascades, culling, and the
    /// captured particle/text data the later passes consume
    pub fn begin_scene(&mut self, world: &World, camera: &Camera, settings: &RenderSettings) {
        self.stats.reset();

        VisibilityBuilder::collect_lights(world, &mut self.lights, &mut self.stats);

        let light_direction = if settings.shadows_enabled {
            self.lights.directional().map(|light| light.direction)
        } else {
            None
        };
        self.cascades.update(
            camera,
            light_direction,
            &settings.shadow_settings,
            self.shadow_map_size,
        );

        VisibilityBuilder::build(
            world,
            camera,
            &mut self.cascades,
            &mut self.queues,
            &mut self.stats,
        );

        let camera_position = camera.position();
        self.frame_particles.clear();
        for (_, transform, emitter) in world.query_emitters() {
            if emitter.particles.is_empty() {
                continue;
            }
            let mut particles = emitter.particles.clone();
            for particle in &mut particles {
                particle.position += transform.translation;
            }
            if emitter.sort_particles {
                sort_particles_back_to_front(&mut particles, camera_position);
            }
            self.frame_particles.push(FrameParticles {
                texture: emitter.texture.clone(),
                additive: emitter.additive,
                grid: emitter.animation_grid.max(1),
                particles,
            });
        }

        self.frame_texts = world
            .query_labels()
            .map(|(_, transform, label)| FrameText {
                font: label.font.clone(),
                text: label.text.clone(),
                color: label.color,
                scale: label.scale,
                world: transform.matrix(),
            })
            .collect();

        self.debug_quads.clear();
        self.camera = Some(camera.clone());
        self.scene_ready = true;
    }

    /// Queue a world-space quad for the debug overlay pass
    pub fn submit_debug_quad(&mut self, center: Vec3, size: Vec2, color: Vec4) {
        self.debug_quads.push((center, size, color));
    }

    // ===== FRAME EXECUTION =====

    /// Record and submit the full pass sequence for the prepared scene
    pub fn render(&mut self, settings: &RenderSettings) -> Result<()> {
        if !self.scene_ready {
            crate::engine_warn!(LOG_SRC, "render called without begin_scene; frame skipped");
            return Ok(());
        }
        self.apply_pending_resize(settings)?;

        let mut list = self.device.acquire_command_list()?;
        let cmd = &mut *list;
        cmd.begin()?;
        self.ring.reset();

        let prepass_ran = self.depth_prepass(cmd)?;
        if settings.ssao_enabled {
            self.ssao_pass(cmd, settings)?;
        }
        if settings.shadows_enabled {
            self.shadow_pass(cmd)?;
        }
        self.forward_pass(cmd, settings, prepass_ran)?;
        if settings.skybox_enabled {
            self.skybox_pass(cmd)?;
        }
        self.particle_pass(cmd)?;
        self.sprite_pass(cmd)?;
        if settings.debug_overlay_enabled {
            self.debug_pass(cmd)?;
        }
        if settings.depth_of_field_enabled {
            self.post_process(
                cmd,
                "depth_of_field",
                "depth_of_field",
                vec![BindingResource::SampledTexture(self.depth_target.clone())],
                &[
                    settings.dof_focal_distance,
                    settings.dof_focal_range,
                    self.width as f32,
                    self.height as f32,
                ],
            )?;
        }
        let bloom = if settings.bloom_enabled {
            self.bloom_pass(cmd, settings)?
        } else {
            None
        };
        if settings.debanding_enabled {
            self.post_process(cmd, "debanding", "debanding", Vec::new(), &[])?;
        }
        self.tone_mapping_pass(cmd, settings, bloom)?;
        if settings.sharpen_enabled {
            self.post_process(cmd, "sharpen", "sharpen", Vec::new(), &[])?;
        }
        if settings.fxaa_enabled {
            self.post_process(
                cmd,
                "fxaa",
                "fxaa",
                Vec::new(),
                &[1.0 / self.width as f32, 1.0 / self.height as f32],
            )?;
        }
        if settings.chromatic_aberration_enabled {
            self.post_process(cmd, "chromatic_aberration", "chromatic_aberration", Vec::new(), &[])?;
        }
        if settings.filmic_grain_enabled {
            self.post_process(cmd, "filmic_grain", "filmic_grain", Vec::new(), &[])?;
        }
        self.text_pass(cmd)?;
        self.final_pass(cmd)?;

        cmd.end()?;
        self.device.submit(list)?;
        Ok(())
    }

    /// Per-frame counters from the most recent begin_scene/render pair
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Cascade state, exposed for inspection
    pub fn cascades(&self) -> &CascadeShadowMap {
        &self.cascades
    }

    /// Camera-facing queues built by the last begin_scene
    pub fn queues(&self) -> &FrameQueues {
        &self.queues
    }

    /// Lights collected by the last begin_scene
    pub fn lights(&self) -> &LightArena {
        &self.lights
    }

    /// Current internal render resolution
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bloom mip levels at the current resolution
    pub fn bloom_mip_levels(&self) -> u32 {
        self.bloom_mips
    }

    /// Selected bloom execution strategy
    pub fn bloom_strategy(&self) -> BloomPass {
        self.bloom_strategy
    }

    // ===== RESIZE =====

    /// Rebuild all size-dependent targets for a new surface size
    pub fn on_resize(
        &mut self,
        surface_width: u32,
        surface_height: u32,
        settings: &RenderSettings,
    ) -> Result<()> {
        self.surface_width = surface_width;
        self.surface_height = surface_height;
        self.recreate_targets(settings)
    }

    /// Recreate targets when quality settings changed since the last frame
    fn apply_pending_resize(&mut self, settings: &RenderSettings) -> Result<()> {
        let dirty = self.msaa_samples != settings.msaa_samples
            || self.render_scale != settings.render_scale
            || self.shadow_map_size != settings.shadow_quality.map_size();
        if dirty {
            self.recreate_targets(settings)?;
        }
        Ok(())
    }

    fn recreate_targets(&mut self, settings: &RenderSettings) -> Result<()> {
        let targets = build_targets(&*self.device, self.surface_width, self.surface_height, settings)?;
        crate::engine_info!(
            LOG_SRC,
            "targets recreated: {}x{} scale {} shadow {} msaa {}",
            targets.width,
            targets.height,
            targets.render_scale,
            targets.shadow_map_size,
            targets.msaa_samples
        );

        self.width = targets.width;
        self.height = targets.height;
        self.shadow_map_size = targets.shadow_map_size;
        self.msaa_samples = targets.msaa_samples;
        self.render_scale = targets.render_scale;
        self.ring.replace(
            targets.scene_colors[0].clone(),
            targets.scene_colors[1].clone(),
        );
        self.depth_target = targets.depth;
        self.ssao_targets = targets.ssao;
        self.shadow_map = targets.shadow_map;
        self.bloom_textures = targets.bloom;
        self.bloom_mips = targets.bloom_mips;
        Ok(())
    }

    // ===== SHARED PASS PLUMBING =====

    /// Compiled shader lookup; None means "skip the pass"
    fn shader(&self, name: &str) -> Option<Arc<dyn Shader>> {
        match self.shaders.shader(name) {
            Some(shader) if shader.is_compiled() => Some(shader),
            Some(_) => {
                crate::engine_trace!(LOG_SRC, "shader '{}' not compiled yet, pass skipped", name);
                None
            }
            None => {
                crate::engine_trace!(LOG_SRC, "shader '{}' missing, pass skipped", name);
                None
            }
        }
    }

    /// Record one full-screen-triangle pass. Returns false (and records
    /// nothing) when the shader is unavailable.
    #[allow(clippy::too_many_arguments)]
    fn fullscreen_pass(
        &mut self,
        cmd: &mut dyn CommandList,
        label: &str,
        shader_name: &str,
        inputs: Vec<BindingResource>,
        output: &Arc<dyn Texture>,
        depth: Option<&Arc<dyn Texture>>,
        blend: BlendMode,
        push: &[f32],
    ) -> Result<bool> {
        let shader = match self.shader(shader_name) {
            Some(shader) => shader,
            None => return Ok(false),
        };

        let desc = PipelineDesc {
            shader: shader_name.to_string(),
            color_format: Some(output.info().format),
            depth_format: depth.map(|d| d.info().format),
            blend,
            depth_test: depth.is_some(),
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc {
            label: label.to_string(),
            color: Some(output.clone()),
            color_mip: 0,
            color_layer: 0,
            depth: depth.cloned(),
            clear_color: None,
            clear_depth: None,
        })?;
        cmd.set_viewport(Viewport::sized(
            output.info().width as f32,
            output.info().height as f32,
        ))?;
        cmd.bind_pipeline(&pipeline)?;
        if !inputs.is_empty() {
            let group = self.device.create_binding_group(&BindingGroupDesc {
                label: format!("{}_inputs", label),
                entries: inputs
                    .into_iter()
                    .enumerate()
                    .map(|(binding, resource)| BindingEntry {
                        binding: binding as u32,
                        resource,
                    })
                    .collect(),
            })?;
            cmd.bind_binding_group(0, &group)?;
        }
        if !push.is_empty() {
            cmd.push_constants(&[ShaderStage::Fragment], 0, bytemuck::cast_slice(push))?;
        }
        cmd.draw(3, 0)?;
        cmd.end_render_pass()?;
        self.stats.draw_calls += 1;
        self.stats.triangles += 1;
        Ok(true)
    }

    /// Full-screen pass over the ping-pong ring: read the source, write
    /// the destination, and advance the ring only when the pass ran
    fn post_process(
        &mut self,
        cmd: &mut dyn CommandList,
        label: &str,
        shader_name: &str,
        extra_inputs: Vec<BindingResource>,
        push: &[f32],
    ) -> Result<()> {
        let source = self.ring.source().clone();
        let destination = self.ring.destination().clone();
        let mut inputs = vec![BindingResource::SampledTexture(source)];
        inputs.extend(extra_inputs);
        if self.fullscreen_pass(
            cmd,
            label,
            shader_name,
            inputs,
            &destination,
            None,
            BlendMode::Opaque,
            push,
        )? {
            self.ring.swap();
        }
        Ok(())
    }

    fn view_projection(&self) -> Mat4 {
        self.camera
            .as_ref()
            .map(|camera| camera.view_projection())
            .unwrap_or(Mat4::IDENTITY)
    }

    // ===== GEOMETRY PASSES =====

    /// Depth-only pre-pass over the depth-tested forward commands
    fn depth_prepass(&mut self, cmd: &mut dyn CommandList) -> Result<bool> {
        let shader = match self.shader("depth_prepass") {
            Some(shader) => shader,
            None => return Ok(false),
        };
        if self.queues.forward.is_empty() {
            return Ok(false);
        }

        let desc = PipelineDesc {
            shader: "depth_prepass".to_string(),
            color_format: None,
            depth_format: Some(TextureFormat::D32_FLOAT),
            blend: BlendMode::Opaque,
            depth_test: true,
            depth_write: true,
            cull: CullMode::Back,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc {
            label: "depth_prepass".to_string(),
            color: None,
            color_mip: 0,
            color_layer: 0,
            depth: Some(self.depth_target.clone()),
            clear_color: None,
            clear_depth: Some(1.0),
        })?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        cmd.bind_pipeline(&pipeline)?;

        let view_projection = self.view_projection();
        for command in &self.queues.forward {
            if !command.depth_test {
                continue;
            }
            let mvp = view_projection * command.world;
            cmd.push_constants(
                &[ShaderStage::Vertex],
                0,
                bytemuck::cast_slice(&mvp.to_cols_array()),
            )?;
            cmd.bind_vertex_buffer(&command.mesh.vertex_buffer, 0)?;
            cmd.bind_index_buffer(&command.mesh.index_buffer, 0, IndexType::U32)?;
            cmd.draw_indexed(command.mesh.index_count, 0, 0)?;
            self.stats.draw_calls += 1;
            self.stats.triangles += command.mesh.index_count / 3;
        }
        cmd.end_render_pass()?;
        Ok(true)
    }

    /// SSAO into the half-resolution target, then two directional blurs
    fn ssao_pass(&mut self, cmd: &mut dyn CommandList, settings: &RenderSettings) -> Result<()> {
        let ssao_target = self.ssao_targets[0].clone();
        let ran = self.fullscreen_pass(
            cmd,
            "ssao",
            "ssao",
            vec![BindingResource::SampledTexture(self.depth_target.clone())],
            &ssao_target,
            None,
            BlendMode::Opaque,
            &[settings.ssao_radius, settings.ssao_strength, 0.0, 0.0],
        )?;
        if !ran {
            return Ok(());
        }

        // Horizontal then vertical blur, ping-ponging the two SSAO targets
        let first = self.ssao_targets[0].clone();
        let second = self.ssao_targets[1].clone();
        self.fullscreen_pass(
            cmd,
            "ssao_blur_h",
            "ssao_blur",
            vec![BindingResource::SampledTexture(first.clone())],
            &second,
            None,
            BlendMode::Opaque,
            &[1.0, 0.0],
        )?;
        self.fullscreen_pass(
            cmd,
            "ssao_blur_v",
            "ssao_blur",
            vec![BindingResource::SampledTexture(second)],
            &first,
            None,
            BlendMode::Opaque,
            &[0.0, 1.0],
        )?;
        Ok(())
    }

    /// One depth-only pass per active cascade, drawing that cascade's
    /// caster queue into its shadow-map layer
    fn shadow_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        if !self.cascades.is_active() {
            return Ok(());
        }
        let shader = match self.shader("shadow_depth") {
            Some(shader) => shader,
            None => return Ok(()),
        };

        let desc = PipelineDesc {
            shader: "shadow_depth".to_string(),
            color_format: None,
            depth_format: Some(TextureFormat::D32_FLOAT),
            blend: BlendMode::Opaque,
            depth_test: true,
            depth_write: true,
            cull: CullMode::Front,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        for cascade_index in 0..self.cascades.count() as usize {
            cmd.begin_render_pass(&RenderPassDesc {
                label: format!("shadow_cascade_{}", cascade_index),
                color: None,
                color_mip: 0,
                color_layer: cascade_index as u32,
                depth: Some(self.shadow_map.clone()),
                clear_color: None,
                clear_depth: Some(1.0),
            })?;
            cmd.set_viewport(Viewport::sized(
                self.shadow_map_size as f32,
                self.shadow_map_size as f32,
            ))?;
            cmd.bind_pipeline(&pipeline)?;

            let light_matrix = self.cascades.cascades()[cascade_index].light_matrix;
            for command in &self.cascades.cascades()[cascade_index].queue {
                let mvp = light_matrix * command.world;
                cmd.push_constants(
                    &[ShaderStage::Vertex],
                    0,
                    bytemuck::cast_slice(&mvp.to_cols_array()),
                )?;
                cmd.bind_vertex_buffer(&command.mesh.vertex_buffer, 0)?;
                cmd.bind_index_buffer(&command.mesh.index_buffer, 0, IndexType::U32)?;
                cmd.draw_indexed(command.mesh.index_count, 0, 0)?;
                self.stats.draw_calls += 1;
                self.stats.triangles += command.mesh.index_count / 3;
            }
            cmd.end_render_pass()?;
        }
        Ok(())
    }

    /// Upload this frame's light arena and cascade matrices
    fn upload_frame_uniforms(&mut self) -> Result<()> {
        let mut light_data: Vec<f32> = Vec::with_capacity(4 + MAX_LIGHTS * LIGHT_STRIDE);
        light_data.extend_from_slice(&[self.lights.len() as f32, 0.0, 0.0, 0.0]);
        for light in self.lights.lights() {
            let kind = match light.kind {
                LightKind::Directional => 0.0,
                LightKind::Point => 1.0,
                LightKind::Spot => 2.0,
            };
            light_data.extend_from_slice(&[
                light.position.x,
                light.position.y,
                light.position.z,
                light.intensity,
                light.direction.x,
                light.direction.y,
                light.direction.z,
                light.radius,
                light.color.x,
                light.color.y,
                light.color.z,
                kind,
                light.angle,
                0.0,
                0.0,
                0.0,
            ]);
        }
        self.light_buffer
            .update(0, bytemuck::cast_slice(&light_data))?;

        let mut cascade_data: Vec<f32> = Vec::with_capacity(MAX_CASCADES * 16 + 8);
        for cascade in self.cascades.cascades() {
            cascade_data.extend_from_slice(&cascade.light_matrix.to_cols_array());
        }
        for _ in self.cascades.count() as usize..MAX_CASCADES {
            cascade_data.extend_from_slice(&Mat4::IDENTITY.to_cols_array());
        }
        for index in 0..MAX_CASCADES {
            let split = self
                .cascades
                .cascades()
                .get(index)
                .map(|c| c.split_depth)
                .unwrap_or(0.0);
            cascade_data.push(split);
        }
        cascade_data.extend_from_slice(&[
            self.cascades.count() as f32,
            self.shadow_map_size as f32,
            0.0,
            0.0,
        ]);
        self.cascade_buffer
            .update(0, bytemuck::cast_slice(&cascade_data))?;
        Ok(())
    }

    /// Occlusion input for the forward pass; the SSAO target holds stale
    /// data whenever its pass is disabled, so shading reads white instead
    fn ssao_input(&self, settings: &RenderSettings) -> Arc<dyn Texture> {
        if settings.ssao_enabled {
            self.ssao_targets[0].clone()
        } else {
            self.default_texture.clone()
        }
    }

    /// Forward opaque/transparent pass into the ring's destination
    fn forward_pass(
        &mut self,
        cmd: &mut dyn CommandList,
        settings: &RenderSettings,
        prepass_ran: bool,
    ) -> Result<()> {
        let shader = match self.shader("forward_pbr") {
            Some(shader) => shader,
            None => return Ok(()),
        };
        self.upload_frame_uniforms()?;

        let target = self.ring.destination().clone();
        let desc = PipelineDesc {
            shader: "forward_pbr".to_string(),
            color_format: Some(SCENE_FORMAT),
            depth_format: Some(TextureFormat::D32_FLOAT),
            blend: BlendMode::Opaque,
            depth_test: true,
            depth_write: true,
            cull: CullMode::Back,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc {
            label: "forward".to_string(),
            color: Some(target.clone()),
            color_mip: 0,
            color_layer: 0,
            depth: Some(self.depth_target.clone()),
            clear_color: Some([0.0, 0.0, 0.0, 1.0]),
            clear_depth: if prepass_ran { None } else { Some(1.0) },
        })?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        cmd.bind_pipeline(&pipeline)?;

        let frame_group = self.device.create_binding_group(&BindingGroupDesc {
            label: "forward_frame".to_string(),
            entries: vec![
                BindingEntry {
                    binding: 0,
                    resource: BindingResource::UniformBuffer(self.light_buffer.clone()),
                },
                BindingEntry {
                    binding: 1,
                    resource: BindingResource::UniformBuffer(self.cascade_buffer.clone()),
                },
                BindingEntry {
                    binding: 2,
                    resource: BindingResource::SampledTexture(self.shadow_map.clone()),
                },
                BindingEntry {
                    binding: 3,
                    resource: BindingResource::SampledTexture(self.ssao_input(settings)),
                },
            ],
        })?;
        cmd.bind_binding_group(0, &frame_group)?;

        let view_projection = self.view_projection();
        for command in &self.queues.forward {
            let albedo = command
                .material
                .albedo
                .clone()
                .unwrap_or_else(|| self.default_texture.clone());
            let material_group = self.device.create_binding_group(&BindingGroupDesc {
                label: "forward_material".to_string(),
                entries: vec![BindingEntry {
                    binding: 0,
                    resource: BindingResource::SampledTexture(albedo),
                }],
            })?;
            cmd.bind_binding_group(1, &material_group)?;

            let mvp = view_projection * command.world;
            let mut push = [0.0f32; 36];
            push[..16].copy_from_slice(&mvp.to_cols_array());
            push[16..32].copy_from_slice(&command.world.to_cols_array());
            push[32..36].copy_from_slice(&command.material.color.to_array());
            cmd.push_constants(&[ShaderStage::Vertex, ShaderStage::Fragment], 0,
                bytemuck::cast_slice(&push))?;
            cmd.bind_vertex_buffer(&command.mesh.vertex_buffer, 0)?;
            cmd.bind_index_buffer(&command.mesh.index_buffer, 0, IndexType::U32)?;
            cmd.draw_indexed(command.mesh.index_count, 0, 0)?;
            self.stats.draw_calls += 1;
            self.stats.triangles += command.mesh.index_count / 3;
        }
        cmd.end_render_pass()?;

        // The scene target is now the just-written slot
        self.ring.swap();
        Ok(())
    }

    /// Skybox composited into the scene target behind existing depth
    fn skybox_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        let scene = self.ring.source().clone();
        let depth = self.depth_target.clone();
        self.fullscreen_pass(
            cmd,
            "skybox",
            "skybox",
            Vec::new(),
            &scene,
            Some(&depth),
            BlendMode::Opaque,
            &[],
        )?;
        Ok(())
    }

    // ===== BATCHED PASSES =====

    /// Billboarded particles batched into the scene target
    fn particle_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        if self.frame_particles.is_empty() {
            return Ok(());
        }
        let shader = match self.shader("particle_batch") {
            Some(shader) => shader,
            None => return Ok(()),
        };

        let scene = self.ring.source().clone();
        let mut pipelines: Vec<Arc<dyn Pipeline>> = Vec::with_capacity(2);
        for blend in [BlendMode::Alpha, BlendMode::Additive] {
            let desc = PipelineDesc {
                shader: "particle_batch".to_string(),
                color_format: Some(SCENE_FORMAT),
                depth_format: Some(TextureFormat::D32_FLOAT),
                blend,
                depth_test: true,
                depth_write: false,
                cull: CullMode::None,
                samples: 1,
                compute: false,
            };
            pipelines.push(
                self.pipeline_cache
                    .get_or_create(&*self.device, &desc, &shader)?,
            );
        }

        let (right, up) = self
            .camera
            .as_ref()
            .map(|camera| {
                let view = camera.view_matrix();
                (
                    Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x),
                    Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y),
                )
            })
            .unwrap_or((Vec3::X, Vec3::Y));

        cmd.begin_render_pass(&RenderPassDesc {
            label: "particles".to_string(),
            color: Some(scene),
            color_mip: 0,
            color_layer: 0,
            depth: Some(self.depth_target.clone()),
            clear_color: None,
            clear_depth: None,
        })?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        let view_projection = self.view_projection();
        cmd.push_constants(
            &[ShaderStage::Vertex],
            0,
            bytemuck::cast_slice(&view_projection.to_cols_array()),
        )?;

        self.particle_batcher.begin_batch(self.device.frame_index());
        for batch in &self.frame_particles {
            let pipeline = if batch.additive {
                pipelines[1].clone()
            } else {
                pipelines[0].clone()
            };
            let mut ctx = BatchContext {
                device: &*self.device,
                cmd: &mut *cmd,
                pipeline: &pipeline,
                default_texture: &self.default_texture,
                stats: &mut self.stats,
            };

            let slot = match &batch.texture {
                Some(texture) => self.particle_batcher.submit_texture(texture, &mut ctx)?,
                None => 0.0,
            };
            let cells = batch.grid as f32;
            for particle in &batch.particles {
                let cell = particle.frame % (batch.grid * batch.grid);
                let cell_u = (cell % batch.grid) as f32 / cells;
                let cell_v = (cell / batch.grid) as f32 / cells;
                let uv0 = Vec2::new(cell_u, cell_v);
                let uv1 = uv0 + Vec2::splat(1.0 / cells);

                let half_right = right * particle.size.x * 0.5;
                let half_up = up * particle.size.y * 0.5;
                let color = particle.color.to_array();
                let corners = [
                    (particle.position - half_right - half_up, Vec2::new(uv0.x, uv1.y)),
                    (particle.position + half_right - half_up, Vec2::new(uv1.x, uv1.y)),
                    (particle.position + half_right + half_up, Vec2::new(uv1.x, uv0.y)),
                    (particle.position - half_right + half_up, Vec2::new(uv0.x, uv0.y)),
                ];
                let quad = corners.map(|(position, uv)| QuadVertex {
                    position: position.to_array(),
                    uv: uv.to_array(),
                    texture_slot: slot,
                    color,
                });
                self.particle_batcher.push_quad(quad, &mut ctx)?;
            }
            // One flush per emitter so blend-mode pipelines never mix
            self.particle_batcher.flush(&mut ctx)?;
        }
        cmd.end_render_pass()?;
        Ok(())
    }

    /// 2D sprite queue batched back-to-front into the scene target
    fn sprite_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        if self.queues.queue_2d.is_empty() {
            return Ok(());
        }
        let shader = match self.shader("sprite_batch") {
            Some(shader) => shader,
            None => return Ok(()),
        };

        let scene = self.ring.source().clone();
        let desc = PipelineDesc {
            shader: "sprite_batch".to_string(),
            color_format: Some(SCENE_FORMAT),
            depth_format: None,
            blend: BlendMode::Alpha,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc::color_only("sprites_2d", &scene))?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        let view_projection = self.view_projection();
        cmd.push_constants(
            &[ShaderStage::Vertex],
            0,
            bytemuck::cast_slice(&view_projection.to_cols_array()),
        )?;

        self.sprite_batcher.begin_batch(self.device.frame_index());
        let mut ctx = BatchContext {
            device: &*self.device,
            cmd: &mut *cmd,
            pipeline: &pipeline,
            default_texture: &self.default_texture,
            stats: &mut self.stats,
        };
        for command in &self.queues.queue_2d {
            let slot = match &command.texture {
                Some(texture) => self.sprite_batcher.submit_texture(texture, &mut ctx)?,
                None => 0.0,
            };
            let half = command.size * 0.5;
            let color = command.color.to_array();
            let locals = [
                (Vec2::new(-half.x, -half.y), Vec2::new(command.uv_min.x, command.uv_max.y)),
                (Vec2::new(half.x, -half.y), Vec2::new(command.uv_max.x, command.uv_max.y)),
                (Vec2::new(half.x, half.y), Vec2::new(command.uv_max.x, command.uv_min.y)),
                (Vec2::new(-half.x, half.y), Vec2::new(command.uv_min.x, command.uv_min.y)),
            ];
            let quad = locals.map(|(local, uv)| {
                let world = command.world * local.extend(0.0).extend(1.0);
                QuadVertex {
                    position: [world.x, world.y, world.z],
                    uv: uv.to_array(),
                    texture_slot: slot,
                    color,
                }
            });
            self.sprite_batcher.push_quad(quad, &mut ctx)?;
        }
        self.sprite_batcher.flush(&mut ctx)?;
        cmd.end_render_pass()?;
        Ok(())
    }

    /// Host-submitted debug quads, drawn with the sprite batcher
    fn debug_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        if self.debug_quads.is_empty() {
            return Ok(());
        }
        let shader = match self.shader("debug_overlay") {
            Some(shader) => shader,
            None => return Ok(()),
        };

        let scene = self.ring.source().clone();
        let desc = PipelineDesc {
            shader: "debug_overlay".to_string(),
            color_format: Some(SCENE_FORMAT),
            depth_format: None,
            blend: BlendMode::Alpha,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc::color_only("debug_overlay", &scene))?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        let view_projection = self.view_projection();
        cmd.push_constants(
            &[ShaderStage::Vertex],
            0,
            bytemuck::cast_slice(&view_projection.to_cols_array()),
        )?;

        self.sprite_batcher.begin_batch(self.device.frame_index());
        let mut ctx = BatchContext {
            device: &*self.device,
            cmd: &mut *cmd,
            pipeline: &pipeline,
            default_texture: &self.default_texture,
            stats: &mut self.stats,
        };
        for (center, size, color) in &self.debug_quads {
            let half = *size * 0.5;
            let color = color.to_array();
            let locals = [
                Vec2::new(-half.x, -half.y),
                Vec2::new(half.x, -half.y),
                Vec2::new(half.x, half.y),
                Vec2::new(-half.x, half.y),
            ];
            let quad = locals.map(|local| {
                let world = *center + local.extend(0.0);
                QuadVertex {
                    position: world.to_array(),
                    uv: [0.0, 0.0],
                    texture_slot: 0.0,
                    color,
                }
            });
            self.sprite_batcher.push_quad(quad, &mut ctx)?;
        }
        self.sprite_batcher.flush(&mut ctx)?;
        cmd.end_render_pass()?;
        Ok(())
    }

    /// World-space text batched glyph by glyph into the scene target
    fn text_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        if self.frame_texts.is_empty() {
            return Ok(());
        }
        let shader = match self.shader("glyph_batch") {
            Some(shader) => shader,
            None => return Ok(()),
        };

        let scene = self.ring.source().clone();
        let desc = PipelineDesc {
            shader: "glyph_batch".to_string(),
            color_format: Some(scene.info().format),
            depth_format: None,
            blend: BlendMode::Alpha,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            samples: 1,
            compute: false,
        };
        let pipeline = self
            .pipeline_cache
            .get_or_create(&*self.device, &desc, &shader)?;

        cmd.begin_render_pass(&RenderPassDesc::color_only("text", &scene))?;
        cmd.set_viewport(Viewport::sized(self.width as f32, self.height as f32))?;
        let view_projection = self.view_projection();
        cmd.push_constants(
            &[ShaderStage::Vertex],
            0,
            bytemuck::cast_slice(&view_projection.to_cols_array()),
        )?;

        self.glyph_batcher.begin_batch(self.device.frame_index());
        let mut ctx = BatchContext {
            device: &*self.device,
            cmd: &mut *cmd,
            pipeline: &pipeline,
            default_texture: &self.default_texture,
            stats: &mut self.stats,
        };
        for run in &self.frame_texts {
            let slot = self.glyph_batcher.submit_texture(&run.font.atlas, &mut ctx)?;
            let color = run.color.to_array();
            let mut pen = Vec2::ZERO;
            for character in run.text.chars() {
                if character == '\n' {
                    pen.x = 0.0;
                    pen.y -= run.font.line_height * run.scale;
                    continue;
                }
                let glyph = match run.font.glyphs.get(&character) {
                    Some(glyph) => *glyph,
                    None => continue,
                };
                let origin = pen + glyph.offset * run.scale;
                let size = glyph.size * run.scale;
                let locals = [
                    (origin, Vec2::new(glyph.uv_min.x, glyph.uv_max.y)),
                    (origin + Vec2::new(size.x, 0.0), Vec2::new(glyph.uv_max.x, glyph.uv_max.y)),
                    (origin + size, Vec2::new(glyph.uv_max.x, glyph.uv_min.y)),
                    (origin + Vec2::new(0.0, size.y), Vec2::new(glyph.uv_min.x, glyph.uv_min.y)),
                ];
                let quad = locals.map(|(local, uv)| {
                    let world = run.world * local.extend(0.0).extend(1.0);
                    GlyphVertex {
                        position: [world.x, world.y, world.z],
                        uv: uv.to_array(),
                        texture_slot: slot,
                        color,
                        outline_color: [0.0, 0.0, 0.0, 0.0],
                    }
                });
                self.glyph_batcher.push_quad(quad, &mut ctx)?;
                pen.x += glyph.advance * run.scale;
            }
        }
        self.glyph_batcher.flush(&mut ctx)?;
        cmd.end_render_pass()?;
        Ok(())
    }

    // ===== POST-PROCESS PASSES =====

    /// Execute the bloom stage schedule; returns the (texture, mip)
    /// holding the result, or None when the pass was skipped
    fn bloom_pass(
        &mut self,
        cmd: &mut dyn CommandList,
        settings: &RenderSettings,
    ) -> Result<Option<(usize, u32)>> {
        let shader_name = self.bloom_strategy.shader_name();
        let shader = match self.shader(shader_name) {
            Some(shader) => shader,
            None => return Ok(None),
        };

        let schedule = bloom_schedule(self.bloom_mips);
        let scene = self.ring.source().clone();

        match self.bloom_strategy {
            BloomPass::Compute => {
                let desc = PipelineDesc::compute(shader_name);
                let pipeline = self
                    .pipeline_cache
                    .get_or_create(&*self.device, &desc, &shader)?;
                cmd.bind_pipeline(&pipeline)?;

                for (index, stage) in schedule.iter().enumerate() {
                    let source = if stage.kind == BloomStageKind::Prefilter {
                        BindingResource::SampledTexture(scene.clone())
                    } else {
                        BindingResource::SampledTextureMip(
                            self.bloom_textures[stage.src.0].clone(),
                            stage.src.1,
                        )
                    };
                    let destination = self.bloom_textures[stage.dst.0].clone();
                    let group = self.device.create_binding_group(&BindingGroupDesc {
                        label: format!("bloom_stage_{}", index),
                        entries: vec![
                            BindingEntry {
                                binding: 0,
                                resource: source,
                            },
                            BindingEntry {
                                binding: 1,
                                resource: BindingResource::StorageTextureMip(
                                    destination.clone(),
                                    stage.dst.1,
                                ),
                            },
                        ],
                    })?;
                    cmd.bind_binding_group(0, &group)?;

                    let push = self.bloom_stage_params(stage.kind, settings);
                    cmd.push_constants(&[ShaderStage::Compute], 0, bytemuck::cast_slice(&push))?;
                    let info = destination.info();
                    cmd.dispatch(
                        BloomPass::workgroups(info.mip_width(stage.dst.1)),
                        BloomPass::workgroups(info.mip_height(stage.dst.1)),
                        1,
                    )?;
                }
            }
            BloomPass::Raster => {
                for (index, stage) in schedule.iter().enumerate() {
                    let source = if stage.kind == BloomStageKind::Prefilter {
                        BindingResource::SampledTexture(scene.clone())
                    } else {
                        BindingResource::SampledTextureMip(
                            self.bloom_textures[stage.src.0].clone(),
                            stage.src.1,
                        )
                    };
                    let destination = self.bloom_textures[stage.dst.0].clone();
                    let desc = PipelineDesc::fullscreen(shader_name, destination.info().format);
                    let pipeline = self
                        .pipeline_cache
                        .get_or_create(&*self.device, &desc, &shader)?;

                    cmd.begin_render_pass(&RenderPassDesc {
                        label: format!("bloom_{}", index),
                        color: Some(destination.clone()),
                        color_mip: stage.dst.1,
                        color_layer: 0,
                        depth: None,
                        clear_color: None,
                        clear_depth: None,
                    })?;
                    let info = destination.info();
                    cmd.set_viewport(Viewport::sized(
                        info.mip_width(stage.dst.1) as f32,
                        info.mip_height(stage.dst.1) as f32,
                    ))?;
                    cmd.bind_pipeline(&pipeline)?;
                    let group = self.device.create_binding_group(&BindingGroupDesc {
                        label: format!("bloom_stage_{}", index),
                        entries: vec![BindingEntry {
                            binding: 0,
                            resource: source,
                        }],
                    })?;
                    cmd.bind_binding_group(0, &group)?;
                    let push = self.bloom_stage_params(stage.kind, settings);
                    cmd.push_constants(&[ShaderStage::Fragment], 0, bytemuck::cast_slice(&push))?;
                    cmd.draw(3, 0)?;
                    cmd.end_render_pass()?;
                    self.stats.draw_calls += 1;
                    self.stats.triangles += 1;
                }
            }
        }

        Ok(Some(bloom_result(&schedule)))
    }

    fn bloom_stage_params(&self, kind: BloomStageKind, settings: &RenderSettings) -> [f32; 4] {
        match kind {
            BloomStageKind::Prefilter => {
                prefilter_params(settings.bloom_threshold, settings.bloom_knee)
            }
            BloomStageKind::Downsample => [1.0, 0.0, 0.0, 0.0],
            BloomStageKind::FirstUpsample => [2.0, settings.bloom_intensity, 0.0, 0.0],
            BloomStageKind::Upsample => [3.0, settings.bloom_intensity, 0.0, 0.0],
        }
    }

    /// Tone mapping always runs when its shader exists; the bloom result
    /// is mixed in here
    fn tone_mapping_pass(
        &mut self,
        cmd: &mut dyn CommandList,
        settings: &RenderSettings,
        bloom: Option<(usize, u32)>,
    ) -> Result<()> {
        let bloom_input = match bloom {
            Some((texture, mip)) => {
                BindingResource::SampledTextureMip(self.bloom_textures[texture].clone(), mip)
            }
            None => BindingResource::SampledTexture(self.default_texture.clone()),
        };
        self.post_process(
            cmd,
            "tone_mapping",
            "tone_mapping",
            vec![bloom_input],
            &[
                settings.tone_map_index as f32,
                settings.exposure,
                if bloom.is_some() {
                    settings.bloom_intensity
                } else {
                    0.0
                },
                0.0,
            ],
        )
    }

    /// Composite the chain's current source into the backbuffer.
    /// Falls back to a plain copy when the composite shader is missing —
    /// presentation must always receive a frame.
    fn final_pass(&mut self, cmd: &mut dyn CommandList) -> Result<()> {
        let backbuffer = self.device.backbuffer()?;
        let source = self.ring.source().clone();
        let drawn = self.fullscreen_pass(
            cmd,
            "final_composite",
            "final_composite",
            vec![BindingResource::SampledTexture(source.clone())],
            &backbuffer,
            None,
            BlendMode::Opaque,
            &[],
        )?;
        if !drawn {
            // copy_texture requires identical extents; a render-scaled
            // internal target cannot be blitted to the backbuffer this way
            let src = source.info();
            let dst = backbuffer.info();
            if src.width == dst.width && src.height == dst.height {
                cmd.copy_texture(&source, &backbuffer)?;
            } else {
                crate::engine_warn!(
                    LOG_SRC,
                    "composite shader missing and {}x{} source cannot be copied to {}x{} backbuffer; frame dropped",
                    src.width,
                    src.height,
                    dst.width,
                    dst.height
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
