//! Static per-group instance data.
//!
//! An [`InstanceGroup`] is created once when the scene starts and never
//! changes afterwards: toggling the morph state only changes how the two
//! stored arrangements are blended, it never regenerates them.

use crate::error::ConfigError;
use crate::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Visual category of a group. Each kind maps to one mesh in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Leaves,
    Lights,
    Ornaments,
    Gifts,
}

impl GroupKind {
    pub const ALL: [GroupKind; 4] = [
        GroupKind::Leaves,
        GroupKind::Lights,
        GroupKind::Ornaments,
        GroupKind::Gifts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GroupKind::Leaves => "leaves",
            GroupKind::Lights => "lights",
            GroupKind::Ornaments => "ornaments",
            GroupKind::Gifts => "gifts",
        }
    }
}

/// Per-instance random variation assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceJitter {
    /// Speed multiplier in `[0.5, 1.0)`.
    pub speed: f32,
    /// Phase offset in radians, `[0, 2π)`.
    pub phase: f32,
}

impl InstanceJitter {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            speed: rng.gen::<f32>() * 0.5 + 0.5,
            phase: rng.gen::<f32>() * TAU,
        }
    }
}

/// Shared surface parameters for every instance of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Color used when the group has no per-instance colors.
    pub base_color: Vec3,
    /// Self-illumination color.
    pub emissive: Vec3,
    /// Self-illumination strength.
    pub emissive_intensity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec3::ONE,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
        }
    }
}

/// Validated, immutable data for one group of instances.
#[derive(Debug, Clone)]
pub struct InstanceGroup {
    kind: GroupKind,
    formed: Vec<Vec3>,
    dispersed: Vec<Vec3>,
    scale_range: (f32, f32),
    rotation_offset: f32,
    colors: Option<Vec<Vec3>>,
    jitter: Vec<InstanceJitter>,
    material: Material,
}

impl InstanceGroup {
    /// Assemble a group, rejecting mismatched array lengths and bad scales.
    ///
    /// The instance count is taken from `formed`; every other per-instance
    /// array must have the same length.
    pub fn new(
        kind: GroupKind,
        formed: Vec<Vec3>,
        dispersed: Vec<Vec3>,
        scale_range: (f32, f32),
        rotation_offset: f32,
        colors: Option<Vec<Vec3>>,
        jitter: Vec<InstanceJitter>,
        material: Material,
    ) -> Result<Self, ConfigError> {
        let count = formed.len();
        check_len("dispersed positions", count, dispersed.len())?;
        if let Some(colors) = &colors {
            check_len("colors", count, colors.len())?;
        }
        check_len("jitter values", count, jitter.len())?;

        let (min, max) = scale_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ConfigError::InvalidScaleRange { min, max });
        }
        if !rotation_offset.is_finite() {
            return Err(ConfigError::InvalidDimension {
                field: "rotation_offset",
                value: rotation_offset,
            });
        }
        if formed
            .iter()
            .chain(dispersed.iter())
            .any(|p| !p.is_finite())
        {
            return Err(ConfigError::InvalidDimension {
                field: "position",
                value: f32::NAN,
            });
        }

        Ok(Self {
            kind,
            formed,
            dispersed,
            scale_range,
            rotation_offset,
            colors,
            jitter,
            material,
        })
    }

    #[inline]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Number of instances.
    #[inline]
    pub fn count(&self) -> usize {
        self.formed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.formed.is_empty()
    }

    pub fn formed_positions(&self) -> &[Vec3] {
        &self.formed
    }

    pub fn dispersed_positions(&self) -> &[Vec3] {
        &self.dispersed
    }

    /// `(scale when dispersed, scale when formed)`.
    pub fn scale_range(&self) -> (f32, f32) {
        self.scale_range
    }

    pub fn rotation_offset(&self) -> f32 {
        self.rotation_offset
    }

    /// Per-instance colors, or `None` when the group uses [`Material::base_color`].
    pub fn colors(&self) -> Option<&[Vec3]> {
        self.colors.as_deref()
    }

    pub fn jitter(&self) -> &[InstanceJitter] {
        &self.jitter
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ConfigError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn jitter(n: usize) -> Vec<InstanceJitter> {
        let mut rng = SmallRng::seed_from_u64(0);
        (0..n).map(|_| InstanceJitter::random(&mut rng)).collect()
    }

    #[test]
    fn test_valid_group() {
        let group = InstanceGroup::new(
            GroupKind::Ornaments,
            vec![Vec3::ZERO; 3],
            vec![Vec3::ONE; 3],
            (0.1, 0.25),
            0.0,
            None,
            jitter(3),
            Material::default(),
        )
        .unwrap();
        assert_eq!(group.count(), 3);
        assert!(group.colors().is_none());
    }

    #[test]
    fn test_dispersed_length_mismatch() {
        let err = InstanceGroup::new(
            GroupKind::Leaves,
            vec![Vec3::ZERO; 3],
            vec![Vec3::ONE; 2],
            (0.1, 0.2),
            0.0,
            None,
            jitter(3),
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LengthMismatch { what: "dispersed positions", expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_color_length_mismatch() {
        let err = InstanceGroup::new(
            GroupKind::Lights,
            vec![Vec3::ZERO; 4],
            vec![Vec3::ONE; 4],
            (0.05, 0.12),
            0.0,
            Some(vec![Vec3::X; 5]),
            jitter(4),
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::LengthMismatch { what: "colors", .. }));
    }

    #[test]
    fn test_inverted_scale_range_allowed() {
        let group = InstanceGroup::new(
            GroupKind::Gifts,
            vec![],
            vec![],
            (0.6, 0.1),
            0.0,
            None,
            vec![],
            Material::default(),
        );
        assert!(group.is_ok());
    }

    #[test]
    fn test_non_finite_scale_range() {
        let err = InstanceGroup::new(
            GroupKind::Gifts,
            vec![],
            vec![],
            (f32::NAN, 0.1),
            0.0,
            None,
            vec![],
            Material::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScaleRange { .. }));
    }

    #[test]
    fn test_jitter_ranges() {
        for j in jitter(1000) {
            assert!(j.speed >= 0.5 && j.speed < 1.0);
            assert!(j.phase >= 0.0 && j.phase < TAU);
        }
    }
}
