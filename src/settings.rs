//! Render settings consumed by the scene renderer.
//!
//! The renderer does not own these: the host application holds a
//! `RenderSettings` and passes it into the per-frame calls. Disabling an
//! effect skips its pass; it is never an error.

/// Shadow-map resolution tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowQuality {
    /// 1024x1024 per cascade
    Low,
    /// 2048x2048 per cascade
    Medium,
    /// 4096x4096 per cascade
    High,
}

impl ShadowQuality {
    /// Shadow-map edge length in pixels for this tier
    pub fn map_size(self) -> u32 {
        match self {
            ShadowQuality::Low => 1024,
            ShadowQuality::Medium => 2048,
            ShadowQuality::High => 4096,
        }
    }
}

/// Cascaded-shadow tunables
#[derive(Debug, Clone)]
pub struct ShadowSettings {
    /// Number of cascades, clamped to 1..=4 by the shadow system
    pub cascade_count: u32,
    /// Blend factor between logarithmic (1.0) and uniform (0.0) splits
    pub split_lambda: f32,
    /// Far limit of the shadowed depth range, in world units
    pub max_shadow_distance: f32,
    /// Constant depth bias applied when sampling
    pub initial_bias: f32,
    /// Light size for PCF/PCSS filtering
    pub light_size: f32,
    /// Distance over which shadows fade out
    pub shadow_fade: f32,
    /// Blend width between adjacent cascades
    pub cascade_fade: f32,
    /// Snap the light projection to shadow-map texels to suppress
    /// sub-texel flicker under camera movement
    pub stabilize: bool,
    /// Optional fixed value for the last split fraction. When set it
    /// replaces the computed value for the final cascade.
    pub last_split_override: Option<f32>,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            cascade_count: 4,
            split_lambda: 0.92,
            max_shadow_distance: 500.0,
            initial_bias: 0.0023,
            light_size: 1.5,
            shadow_fade: 40.0,
            cascade_fade: 3.0,
            stabilize: true,
            last_split_override: None,
        }
    }
}

/// Full render configuration consumed (not owned) by the renderer
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// MSAA sample count (1 = off)
    pub msaa_samples: u32,
    /// Shadow-map resolution tier
    pub shadow_quality: ShadowQuality,
    /// Internal resolution scale; final dimensions are rounded down to even
    pub render_scale: f32,

    // Per-pass enables. Tone mapping and the final composite always run.
    pub shadows_enabled: bool,
    pub ssao_enabled: bool,
    pub skybox_enabled: bool,
    pub bloom_enabled: bool,
    pub debanding_enabled: bool,
    pub depth_of_field_enabled: bool,
    pub sharpen_enabled: bool,
    pub fxaa_enabled: bool,
    pub chromatic_aberration_enabled: bool,
    pub filmic_grain_enabled: bool,
    pub debug_overlay_enabled: bool,

    /// Brightness threshold above which pixels contribute to bloom
    pub bloom_threshold: f32,
    /// Soft-knee width of the bloom threshold curve
    pub bloom_knee: f32,
    /// Strength of the bloom contribution in the final mix
    pub bloom_intensity: f32,
    /// SSAO sampling radius in view space
    pub ssao_radius: f32,
    /// SSAO darkening strength
    pub ssao_strength: f32,
    /// Depth-of-field focal plane distance
    pub dof_focal_distance: f32,
    /// Depth-of-field in-focus range around the focal plane
    pub dof_focal_range: f32,
    /// Tone-mapping operator index (0 = none, passthrough)
    pub tone_map_index: u32,
    /// Scene exposure applied during tone mapping
    pub exposure: f32,

    pub shadow_settings: ShadowSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            msaa_samples: 1,
            shadow_quality: ShadowQuality::Medium,
            render_scale: 1.0,
            shadows_enabled: true,
            ssao_enabled: false,
            skybox_enabled: true,
            bloom_enabled: true,
            debanding_enabled: false,
            depth_of_field_enabled: false,
            sharpen_enabled: false,
            fxaa_enabled: false,
            chromatic_aberration_enabled: false,
            filmic_grain_enabled: false,
            debug_overlay_enabled: false,
            bloom_threshold: 1.0,
            bloom_knee: 0.1,
            bloom_intensity: 1.0,
            ssao_radius: 0.25,
            ssao_strength: 1.0,
            dof_focal_distance: 25.0,
            dof_focal_range: 10.0,
            tone_map_index: 4,
            exposure: 1.0,
            shadow_settings: ShadowSettings::default(),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
