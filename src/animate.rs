//! Per-frame instance transforms.
//!
//! Each frame, every instance of every group gets one model matrix (and a
//! color) derived from the global morph progress and the elapsed time:
//!
//! 1. **Stagger** - `individual = clamp(progress * lead - (i / count) * penalty, 0, 1)`.
//!    Higher indices lag behind, so the tree assembles bottom-up instead of
//!    all instances moving in lockstep.
//! 2. **Blend** - lerp from the dispersed to the formed position.
//! 3. **Float** - a `sin`/`cos` drift of strength `(1 - individual) * amplitude`,
//!    strongest in the cloud and zero once an instance has settled.
//! 4. **Rotation** - X spins with `elapsed * spin_rate + i`, Y is the group's
//!    fixed rotation offset (XYZ Euler order).
//! 5. **Scale** - lerp across the group's scale range.
//!
//! Nothing here allocates: [`InstanceBatch`] is sized once for its group and
//! overwritten in place every frame.

use crate::error::ConfigError;
use crate::group::InstanceGroup;
use crate::{Mat4, Vec3};
use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

/// Tunables for the staggered morph and idle motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerParams {
    /// Multiplier on the global progress. Must be at least `1 + index_penalty`
    /// so every instance is fully formed at progress 1.
    pub lead: f32,
    /// How much the last instance lags behind the first.
    pub index_penalty: f32,
    /// Drift strength of a fully dispersed instance.
    pub float_amplitude: f32,
    /// Radians per second of the perpetual X spin.
    pub spin_rate: f32,
    /// Time multiplier of the Z drift.
    pub float_z_rate: f32,
}

impl Default for StaggerParams {
    fn default() -> Self {
        Self {
            lead: 1.5,
            index_penalty: 0.5,
            float_amplitude: 0.3,
            spin_rate: 0.2,
            float_z_rate: 0.8,
        }
    }
}

impl StaggerParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("lead", self.lead),
            ("index_penalty", self.index_penalty),
            ("float_amplitude", self.float_amplitude),
            ("spin_rate", self.spin_rate),
            ("float_z_rate", self.float_z_rate),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidStagger(format!("{} is {}", name, value)));
        }
        if self.index_penalty < 0.0 {
            return Err(ConfigError::InvalidStagger(format!(
                "index_penalty must not be negative, got {}",
                self.index_penalty
            )));
        }
        if self.lead < 1.0 + self.index_penalty {
            return Err(ConfigError::InvalidStagger(format!(
                "lead {} is below 1 + index_penalty ({}); some instances would never fully form",
                self.lead,
                1.0 + self.index_penalty
            )));
        }
        Ok(())
    }
}

/// Staggered progress of instance `index` out of `count`.
///
/// `progress` is clamped first, so out-of-range input can never leak into
/// the blend.
#[inline]
pub fn individual_progress(progress: f32, index: usize, count: usize, params: &StaggerParams) -> f32 {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let lag = if count == 0 { 0.0 } else { index as f32 / count as f32 };
    (progress * params.lead - lag * params.index_penalty).clamp(0.0, 1.0)
}

/// Model matrix of one instance for one frame.
pub fn instance_transform(
    group: &InstanceGroup,
    index: usize,
    progress: f32,
    elapsed: f32,
    params: &StaggerParams,
) -> Mat4 {
    let count = group.count();
    let p = individual_progress(progress, index, count, params);
    let i = index as f32;

    let target = group.formed_positions()[index];
    let scatter = group.dispersed_positions()[index];
    let float = (1.0 - p) * params.float_amplitude;

    let drift = Vec3::new(
        (elapsed + i).sin(),
        (elapsed + i).cos(),
        (elapsed * params.float_z_rate + i).sin(),
    ) * float;
    let position = scatter.lerp(target, p) + drift;

    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        elapsed * params.spin_rate + i,
        group.rotation_offset(),
        0.0,
    );

    let (dispersed_scale, formed_scale) = group.scale_range();
    let scale = dispersed_scale + (formed_scale - dispersed_scale) * p;

    Mat4::from_scale_rotation_translation(Vec3::splat(scale), rotation, position)
}

/// GPU-ready record for one instance: a column-major model matrix and an RGBA color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    fn with_color(color: Vec3) -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
        }
    }
}

/// Output buffer for one group, reused across frames.
///
/// Colors are written once at creation: per-instance colors when the group
/// has them, the material's base color otherwise. Only the matrices change
/// per frame.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    instances: Vec<InstanceRaw>,
    per_instance_colors: bool,
}

impl InstanceBatch {
    /// Allocate a batch sized for `group`.
    pub fn for_group(group: &InstanceGroup) -> Self {
        let instances = match group.colors() {
            Some(colors) => colors.iter().map(|&c| InstanceRaw::with_color(c)).collect(),
            None => vec![InstanceRaw::with_color(group.material().base_color); group.count()],
        };
        Self {
            instances,
            per_instance_colors: group.colors().is_some(),
        }
    }

    /// Recompute every matrix in place.
    ///
    /// `group` must be the group this batch was created for; a batch of the
    /// wrong length is left untouched.
    pub fn update(&mut self, group: &InstanceGroup, progress: f32, elapsed: f32, params: &StaggerParams) {
        if self.instances.len() != group.count() {
            log::warn!(
                "instance batch for {} has {} slots, group has {}; skipping",
                group.kind().name(),
                self.instances.len(),
                group.count()
            );
            return;
        }
        for (index, slot) in self.instances.iter_mut().enumerate() {
            slot.model = instance_transform(group, index, progress, elapsed, params).to_cols_array_2d();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Whether colors differ per instance (otherwise all equal the material color).
    pub fn has_instance_colors(&self) -> bool {
        self.per_instance_colors
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    /// Raw bytes for a single GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn transform(&self, index: usize) -> Mat4 {
        Mat4::from_cols_array_2d(&self.instances[index].model)
    }

    /// Translation part of an instance's matrix.
    pub fn position(&self, index: usize) -> Vec3 {
        self.transform(index).w_axis.truncate()
    }

    pub fn color(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.instances[index].color[..3])
    }
}
