/// Cascaded shadow maps for a single directional light.
///
/// Two states: Idle (no directional light, or zero cascades — queues stay
/// empty and the shadow pass is skipped) and Active. On each Active frame
/// the split distances and fitted light-space projections are recomputed,
/// and each cascade's frustum is stored for the visibility builder.

use glam::{Mat4, Vec3, Vec4};
use crate::camera::{Camera, Frustum};
use crate::settings::ShadowSettings;
use super::command::RenderCommand;

/// Hard upper bound on cascades; `ShadowSettings::cascade_count` is
/// clamped to it
pub const MAX_CASCADES: usize = 4;

/// Extra room behind the light so casters between the light and the
/// frustum slice still land in the map
const CASCADE_NEAR_PLANE_OFFSET: f32 = -50.0;
const CASCADE_FAR_PLANE_OFFSET: f32 = 50.0;

/// Round up to the next multiple of 5.
///
/// Applied to each cascade's bounding-sphere radius so small per-frame
/// radius changes do not alter the projection, which would shimmer.
pub fn round_up_to_multiple_of_5(value: f32) -> f32 {
    (value / 5.0).ceil() * 5.0
}

/// Lambda-blended logarithmic/uniform split fractions.
///
/// For cascade `i` of `count`, with `p = (i+1)/count`:
/// `log = near·ratio^p`, `uniform = near + range·p`,
/// `d = lambda·(log − uniform) + uniform`, normalized over the clip range.
/// Fractions are strictly increasing for any lambda in [0, 1].
pub fn cascade_split_fractions(count: u32, lambda: f32, near: f32, max_distance: f32) -> Vec<f32> {
    let count = count.clamp(1, MAX_CASCADES as u32);
    let clip_range = max_distance - near;
    let min_z = near;
    let max_z = near + clip_range;
    let range = max_z - min_z;
    let ratio = max_z / min_z;

    (0..count)
        .map(|i| {
            let p = (i + 1) as f32 / count as f32;
            let log = min_z * ratio.powf(p);
            let uniform = min_z + range * p;
            let d = lambda * (log - uniform) + uniform;
            (d - near) / clip_range
        })
        .collect()
}

/// One shadow cascade: fitted matrices plus its per-frame caster queue
pub struct Cascade {
    /// View-space depth at the far edge of this cascade (negative,
    /// matching view-space convention), consumed by the shaders
    pub split_depth: f32,
    /// Light-space projection × view for this cascade
    pub light_matrix: Mat4,
    /// Frustum of `light_matrix`, used for caster culling
    pub frustum: Frustum,
    /// Casters to draw into this cascade, rebuilt every frame
    pub queue: Vec<RenderCommand>,
}

impl Cascade {
    fn idle() -> Self {
        Self {
            split_depth: 0.0,
            light_matrix: Mat4::IDENTITY,
            frustum: Frustum::from_view_projection(&Mat4::IDENTITY),
            queue: Vec::new(),
        }
    }
}

/// Cascaded shadow map state, recomputed once per frame
pub struct CascadeShadowMap {
    cascades: [Cascade; MAX_CASCADES],
    count: u32,
    active: bool,
    light_view: Mat4,
    light_direction: Vec3,
}

impl CascadeShadowMap {
    pub fn new() -> Self {
        Self {
            cascades: std::array::from_fn(|_| Cascade::idle()),
            count: 0,
            active: false,
            light_view: Mat4::IDENTITY,
            light_direction: Vec3::NEG_Y,
        }
    }

    /// Whether a directional light fed the system this frame
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of cascades in use this frame (0 when idle)
    pub fn count(&self) -> u32 {
        if self.active {
            self.count
        } else {
            0
        }
    }

    /// Light view matrix shared by all cascades
    pub fn light_view(&self) -> &Mat4 {
        &self.light_view
    }

    /// Light direction driving the cascades
    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// Active cascades
    pub fn cascades(&self) -> &[Cascade] {
        &self.cascades[..self.count() as usize]
    }

    /// Push a caster command into one cascade's queue
    pub fn push_caster(&mut self, cascade: usize, command: RenderCommand) {
        if cascade < self.count() as usize {
            self.cascades[cascade].queue.push(command);
        }
    }

    /// Clear every cascade queue (start of frame)
    pub fn clear_queues(&mut self) {
        for cascade in &mut self.cascades {
            cascade.queue.clear();
        }
    }

    /// Recompute cascades for this frame.
    ///
    /// `light_direction` is the directional light's direction, or `None`
    /// when the scene has no directional light — the system goes Idle and
    /// the shadow pass becomes a no-op, not an error.
    pub fn update(
        &mut self,
        camera: &Camera,
        light_direction: Option<Vec3>,
        settings: &ShadowSettings,
        map_size: u32,
    ) {
        self.clear_queues();

        let direction = match light_direction {
            Some(d) if settings.cascade_count > 0 => d.normalize_or_zero(),
            _ => {
                self.active = false;
                return;
            }
        };
        if direction == Vec3::ZERO {
            self.active = false;
            return;
        }

        self.active = true;
        self.count = settings.cascade_count.clamp(1, MAX_CASCADES as u32);
        self.light_direction = direction;

        let near = camera.near();
        let shadow_far = settings.max_shadow_distance.min(camera.far()).max(near + 1.0);
        let clip_range = shadow_far - near;

        let mut splits =
            cascade_split_fractions(self.count, settings.split_lambda, near, shadow_far);
        if let Some(last) = settings.last_split_override {
            let index = self.count as usize - 1;
            splits[index] = last;
        }

        // NDC corners of the shadowed slice of the camera frustum,
        // z in 0..1 to match the projection's clip-depth convention
        let slice_proj =
            Mat4::perspective_rh(camera.fov_y(), camera.aspect(), near, shadow_far);
        let inv_cam = (slice_proj * *camera.view_matrix()).inverse();

        let ndc_corners = [
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];
        let mut frustum_corners = [Vec3::ZERO; 8];
        for (corner, ndc) in frustum_corners.iter_mut().zip(ndc_corners.iter()) {
            let world = inv_cam * ndc.extend(1.0);
            *corner = world.truncate() / world.w;
        }

        let mut last_split = 0.0_f32;
        for (index, &split) in splits.iter().enumerate() {
            // Slice the full frustum between the previous and current split
            let mut corners = frustum_corners;
            for i in 0..4 {
                let dist = corners[i + 4] - corners[i];
                corners[i + 4] = corners[i] + dist * split;
                corners[i] = corners[i] + dist * last_split;
            }

            let center = corners.iter().sum::<Vec3>() / 8.0;
            let radius = corners
                .iter()
                .map(|c| c.distance(center))
                .fold(0.0_f32, f32::max);
            let radius = round_up_to_multiple_of_5(radius);

            let up = if direction.dot(Vec3::Y).abs() > 0.99 {
                Vec3::Z
            } else {
                Vec3::Y
            };
            let light_view = Mat4::look_at_rh(center - direction * radius, center, up);

            let mut light_ortho = Mat4::orthographic_rh(
                -radius,
                radius,
                -radius,
                radius,
                CASCADE_NEAR_PLANE_OFFSET,
                2.0 * radius + CASCADE_FAR_PLANE_OFFSET,
            );

            if settings.stabilize {
                // Snap the projection translation to the nearest shadow-map
                // texel so sub-texel camera movement does not flicker
                let shadow_matrix = light_ortho * light_view;
                let origin = shadow_matrix * Vec4::new(0.0, 0.0, 0.0, 1.0)
                    * (map_size as f32 / 2.0);
                let rounded = origin.round();
                let mut offset = (rounded - origin) * (2.0 / map_size as f32);
                offset.z = 0.0;
                offset.w = 0.0;
                light_ortho.w_axis += offset;
            }

            let light_matrix = light_ortho * light_view;
            let cascade = &mut self.cascades[index];
            cascade.split_depth = -(near + split * clip_range);
            cascade.light_matrix = light_matrix;
            cascade.frustum = Frustum::from_view_projection(&light_matrix);
            if index == 0 {
                self.light_view = light_view;
            }

            last_split = split;
        }
    }
}

impl Default for CascadeShadowMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cascades_tests.rs"]
mod tests;
