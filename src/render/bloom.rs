/// Bloom mip-chain scheduling and strategy selection.
///
/// The pass structure is fixed by the mip count: one prefilter, two
/// downsample steps per intermediate mip, one first upsample, then one
/// upsample per remaining mip walking back toward mip 0. Whether each
/// stage is a compute dispatch or a full-screen raster draw is a strategy
/// chosen once at initialization from the device capabilities, never
/// branched on per frame.

use crate::gpu::DeviceCaps;

/// Compute dispatches cover this many pixels per workgroup axis
pub const BLOOM_WORKGROUP_SIZE: u32 = 4;

/// How bloom stages are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloomPass {
    /// `ceil(dim / 4)` workgroup dispatches writing storage mips
    Compute,
    /// Full-screen-triangle draws into mip render targets
    Raster,
}

impl BloomPass {
    /// Pick the strategy once from the device capabilities
    pub fn select(caps: &DeviceCaps) -> Self {
        if caps.compute {
            BloomPass::Compute
        } else {
            BloomPass::Raster
        }
    }

    /// Shader looked up for every stage of this strategy
    pub fn shader_name(&self) -> &'static str {
        match self {
            BloomPass::Compute => "bloom_compute",
            BloomPass::Raster => "bloom",
        }
    }

    /// Workgroups needed to cover `dim` pixels (compute strategy)
    pub fn workgroups(dim: u32) -> u32 {
        dim.div_ceil(BLOOM_WORKGROUP_SIZE)
    }
}

/// Mip levels for a bloom chain over a target of the given size.
///
/// Clamped so the chain is always deep enough for the fixed pass
/// structure (mip_count >= 4).
pub fn bloom_mip_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    let mips = (largest as f32).log2().floor() as u32;
    mips.saturating_sub(2).max(4)
}

/// Closed-form stage count for a chain of `mip_count` levels:
/// prefilter + two downsamples per intermediate mip + first upsample +
/// one upsample per remaining mip
pub fn bloom_pass_count(mip_count: u32) -> u32 {
    1 + 2 * (mip_count - 2) + 1 + (mip_count - 3)
}

/// What one bloom stage computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloomStageKind {
    /// Threshold + soft knee on the scene color
    Prefilter,
    /// Half-resolution blur step
    Downsample,
    /// Smallest mip blended up one level
    FirstUpsample,
    /// Progressive tent-filter blend toward mip 0
    Upsample,
}

/// One scheduled stage. `src`/`dst` are (bloom texture index, mip level);
/// the prefilter's real source is the scene color, its `src` is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomStage {
    pub kind: BloomStageKind,
    pub src: (usize, u32),
    pub dst: (usize, u32),
}

/// Build the stage schedule for a chain of `mip_count` levels.
///
/// Textures 0 and 1 alternate during downsampling so no stage reads the
/// mip it writes; upsampling alternates textures 2 and 1 the same way.
/// The schedule length always equals [`bloom_pass_count`].
pub fn bloom_schedule(mip_count: u32) -> Vec<BloomStage> {
    let m = mip_count.max(4);
    let mut stages = Vec::with_capacity(bloom_pass_count(m) as usize);

    stages.push(BloomStage {
        kind: BloomStageKind::Prefilter,
        src: (0, 0),
        dst: (0, 0),
    });

    for mip in 1..=(m - 2) {
        stages.push(BloomStage {
            kind: BloomStageKind::Downsample,
            src: (0, mip - 1),
            dst: (1, mip),
        });
        stages.push(BloomStage {
            kind: BloomStageKind::Downsample,
            src: (1, mip),
            dst: (0, mip),
        });
    }

    stages.push(BloomStage {
        kind: BloomStageKind::FirstUpsample,
        src: (0, m - 2),
        dst: (2, m - 3),
    });

    let mut src_texture = 2;
    for (step, mip) in (0..=(m.saturating_sub(4))).rev().enumerate() {
        let dst_texture = if step % 2 == 0 { 1 } else { 2 };
        stages.push(BloomStage {
            kind: BloomStageKind::Upsample,
            src: (src_texture, mip + 1),
            dst: (dst_texture, mip),
        });
        src_texture = dst_texture;
    }

    stages
}

/// (texture index, mip) holding the finished bloom contribution
pub fn bloom_result(schedule: &[BloomStage]) -> (usize, u32) {
    schedule.last().map(|stage| stage.dst).unwrap_or((0, 0))
}

/// Push-constant block for the prefilter's threshold curve:
/// `{t, t − knee, 2·knee, 0.25/knee}`
pub fn prefilter_params(threshold: f32, knee: f32) -> [f32; 4] {
    [threshold, threshold - knee, 2.0 * knee, 0.25 / knee]
}

#[cfg(test)]
#[path = "bloom_tests.rs"]
mod tests;
