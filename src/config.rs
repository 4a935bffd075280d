//! Scene configuration.
//!
//! [`SceneConfig::default`] reproduces the reference scene: a 6000-leaf tree
//! with lights, ornaments and a ring of gifts. Every field can be overridden
//! from JSON; omitted fields keep their defaults.
//!
//! ```json
//! {
//!   "particle_count": 3000,
//!   "seed": 42,
//!   "stagger": { "lead": 2.0 }
//! }
//! ```

use crate::animate::StaggerParams;
use crate::error::ConfigError;
use crate::group::{GroupKind, InstanceGroup, InstanceJitter, Material};
use crate::morph::{MorphState, DEFAULT_MORPH_RATE};
use crate::palette::{gift_swatches, gold, leaf_swatches, light_swatches, Palette, Rgb, Swatch};
use crate::positions::{
    generate_base_ring_positions, generate_dispersed_positions, generate_formed_positions,
};
use crate::pulse::{Emblem, Pulse};
use crate::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest instance count a single group may resolve to.
pub const MAX_INSTANCES: usize = 1 << 20;

fn default_particle_count() -> u32 {
    6000
}

/// Complete scene configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Base instance count; groups with a [`InstanceCount::Share`] scale from it.
    pub particle_count: u32,
    /// Seed for all procedural placement. `None` draws from entropy.
    pub seed: Option<u64>,
    /// State the scene starts settled in.
    pub initial_state: MorphState,
    /// Easing rate of the morph progress, per second.
    pub morph_rate: f32,
    pub stagger: StaggerParams,
    /// Shared brightness of the light bulbs.
    pub twinkle: Pulse,
    pub emblem: Emblem,
    pub groups: Vec<GroupConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: default_particle_count(),
            seed: None,
            initial_state: MorphState::Formed,
            morph_rate: DEFAULT_MORPH_RATE,
            stagger: StaggerParams::default(),
            twinkle: Pulse::TWINKLE,
            emblem: Emblem::default(),
            groups: GroupKind::ALL.iter().map(|&k| GroupConfig::reference(k)).collect(),
        }
    }
}

impl SceneConfig {
    /// Parse a configuration from JSON text and validate it.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every parameter without generating anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.morph_rate.is_finite() || self.morph_rate <= 0.0 {
            return Err(ConfigError::InvalidRate(self.morph_rate));
        }
        self.stagger.validate()?;
        validate_emblem(&self.emblem)?;
        for group in &self.groups {
            group.validate(self.particle_count)?;
        }
        Ok(())
    }
}

fn validate_emblem(emblem: &Emblem) -> Result<(), ConfigError> {
    if emblem.points < 2 {
        return Err(ConfigError::InvalidDimension {
            field: "emblem.points",
            value: emblem.points as f32,
        });
    }
    positive("emblem.outer_radius", emblem.outer_radius)?;
    positive("emblem.inner_radius", emblem.inner_radius)?;
    if !emblem.position.is_finite() {
        return Err(ConfigError::InvalidDimension {
            field: "emblem.position",
            value: f32::NAN,
        });
    }
    Ok(())
}

/// How many instances a group has.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InstanceCount {
    /// An absolute count.
    Fixed(i64),
    /// `floor(particle_count * share)`.
    Share(f64),
}

impl InstanceCount {
    pub fn resolve(&self, particle_count: u32, group: GroupKind) -> Result<usize, ConfigError> {
        match *self {
            InstanceCount::Fixed(n) if n < 0 => Err(ConfigError::NegativeCount {
                group: group.name().to_string(),
                value: n,
            }),
            InstanceCount::Fixed(n) => usize::try_from(n)
                .ok()
                .filter(|&count| count <= MAX_INSTANCES)
                .ok_or_else(|| ConfigError::CountTooLarge {
                    group: group.name().to_string(),
                    value: n as f64,
                }),
            InstanceCount::Share(share) if !share.is_finite() || share < 0.0 => {
                Err(ConfigError::InvalidShare {
                    group: group.name().to_string(),
                    value: share,
                })
            }
            InstanceCount::Share(share) => {
                let count = (particle_count as f64 * share).floor();
                if count > MAX_INSTANCES as f64 {
                    return Err(ConfigError::CountTooLarge {
                        group: group.name().to_string(),
                        value: count,
                    });
                }
                Ok(count as usize)
            }
        }
    }
}

/// Shape of a group's formed arrangement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Layout {
    /// Golden-angle spiral on a cone.
    Cone { height: f32, radius: f32 },
    /// Flat annulus around the foot of the tree.
    BaseRing {
        inner_radius: f32,
        outer_radius: f32,
        floor: f32,
        thickness: f32,
    },
}

impl Layout {
    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Layout::Cone { height, radius } => {
                positive("cone.height", height)?;
                positive("cone.radius", radius)
            }
            Layout::BaseRing {
                inner_radius,
                outer_radius,
                floor,
                thickness,
            } => {
                non_negative("base_ring.inner_radius", inner_radius)?;
                positive("base_ring.outer_radius", outer_radius)?;
                if inner_radius > outer_radius {
                    return Err(ConfigError::InvalidDimension {
                        field: "base_ring.inner_radius",
                        value: inner_radius,
                    });
                }
                if !floor.is_finite() {
                    return Err(ConfigError::InvalidDimension {
                        field: "base_ring.floor",
                        value: floor,
                    });
                }
                non_negative("base_ring.thickness", thickness)
            }
        }
    }

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Vec3> {
        match *self {
            Layout::Cone { height, radius } => generate_formed_positions(rng, count, height, radius),
            Layout::BaseRing {
                inner_radius,
                outer_radius,
                floor,
                thickness,
            } => generate_base_ring_positions(rng, count, inner_radius, outer_radius, floor, thickness),
        }
    }
}

/// Where instance colors come from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// One material color for the whole group.
    Shared(Rgb),
    /// One swatch drawn per instance.
    Palette(Vec<Swatch>),
}

/// Configuration of one instance group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    pub kind: GroupKind,
    pub count: InstanceCount,
    pub layout: Layout,
    /// Side length of the dispersed cloud.
    pub scatter_range: f32,
    /// `(dispersed scale, formed scale)`.
    pub scale_range: (f32, f32),
    #[serde(default)]
    pub rotation_offset: f32,
    pub colors: ColorScheme,
    #[serde(default)]
    pub emissive: Option<Rgb>,
    #[serde(default)]
    pub emissive_intensity: f32,
}

impl GroupConfig {
    /// Parameters of the reference scene for `kind`.
    pub fn reference(kind: GroupKind) -> Self {
        match kind {
            GroupKind::Leaves => Self {
                kind,
                count: InstanceCount::Share(1.0),
                layout: Layout::Cone { height: 12.0, radius: 5.0 },
                scatter_range: 30.0,
                scale_range: (0.08, 0.16),
                rotation_offset: 0.0,
                colors: ColorScheme::Palette(leaf_swatches()),
                emissive: Some(Rgb::from_u8(0x02, 0x2c, 0x1e)),
                emissive_intensity: 0.2,
            },
            GroupKind::Lights => Self {
                kind,
                count: InstanceCount::Share(0.15),
                layout: Layout::Cone { height: 11.5, radius: 4.8 },
                scatter_range: 35.0,
                scale_range: (0.05, 0.12),
                rotation_offset: 0.0,
                colors: ColorScheme::Palette(light_swatches()),
                // Bulbs glow in their own color; intensity comes from the twinkle pulse.
                emissive: None,
                emissive_intensity: 0.0,
            },
            GroupKind::Ornaments => Self {
                kind,
                count: InstanceCount::Share(0.08),
                layout: Layout::Cone { height: 11.0, radius: 4.5 },
                scatter_range: 25.0,
                scale_range: (0.1, 0.25),
                rotation_offset: 0.0,
                colors: ColorScheme::Shared(gold()),
                emissive: Some(Rgb::from_u8(0x4d, 0x3b, 0x0a)),
                emissive_intensity: 0.5,
            },
            GroupKind::Gifts => Self {
                kind,
                count: InstanceCount::Fixed(40),
                layout: Layout::BaseRing {
                    inner_radius: 1.0,
                    outer_radius: 5.0,
                    floor: -5.5,
                    thickness: 1.0,
                },
                scatter_range: 40.0,
                scale_range: (0.1, 0.6),
                rotation_offset: std::f32::consts::FRAC_PI_4,
                colors: ColorScheme::Palette(gift_swatches()),
                emissive: None,
                emissive_intensity: 0.0,
            },
        }
    }

    /// Check this group's parameters against `particle_count`.
    pub fn validate(&self, particle_count: u32) -> Result<usize, ConfigError> {
        let count = self.count.resolve(particle_count, self.kind)?;
        self.layout.validate()?;
        positive("scatter_range", self.scatter_range)?;
        let (min, max) = self.scale_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ConfigError::InvalidScaleRange { min, max });
        }
        non_negative("emissive_intensity", self.emissive_intensity)?;
        if let ColorScheme::Palette(swatches) = &self.colors {
            Palette::new(swatches.clone())?;
        }
        Ok(count)
    }

    /// Generate positions, colors and jitter, producing a validated group.
    pub fn build<R: Rng + ?Sized>(
        &self,
        particle_count: u32,
        rng: &mut R,
    ) -> Result<InstanceGroup, ConfigError> {
        let count = self.validate(particle_count)?;

        let formed = self.layout.generate(rng, count);
        let dispersed = generate_dispersed_positions(rng, count, self.scatter_range);

        let (colors, base_color) = match &self.colors {
            ColorScheme::Shared(color) => (None, color.vec3()),
            ColorScheme::Palette(swatches) => {
                let palette = Palette::new(swatches.clone())?;
                (Some(palette.assign(rng, count)), Vec3::ONE)
            }
        };

        let jitter = (0..count).map(|_| InstanceJitter::random(&mut *rng)).collect();

        let material = Material {
            base_color,
            emissive: self.emissive.map(Rgb::vec3).unwrap_or(Vec3::ZERO),
            emissive_intensity: self.emissive_intensity,
        };

        InstanceGroup::new(
            self.kind,
            formed,
            dispersed,
            self.scale_range,
            self.rotation_offset,
            colors,
            jitter,
            material,
        )
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reference_counts() {
        let config = SceneConfig::default();
        let counts: Vec<usize> = config
            .groups
            .iter()
            .map(|g| g.validate(config.particle_count).unwrap())
            .collect();
        assert_eq!(counts, vec![6000, 900, 480, 40]);
    }

    #[test]
    fn test_share_floors() {
        let count = InstanceCount::Share(0.15).resolve(1001, GroupKind::Lights).unwrap();
        assert_eq!(count, 150);
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = InstanceCount::Fixed(-3).resolve(100, GroupKind::Gifts).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeCount { value: -3, .. }));
        assert!(InstanceCount::Share(-0.1).resolve(100, GroupKind::Lights).is_err());
    }

    #[test]
    fn test_oversized_counts_rejected() {
        let err = InstanceCount::Fixed(i64::MAX).resolve(100, GroupKind::Gifts).unwrap_err();
        assert!(matches!(err, ConfigError::CountTooLarge { .. }));

        let err = InstanceCount::Share(1e30).resolve(6000, GroupKind::Leaves).unwrap_err();
        assert!(matches!(err, ConfigError::CountTooLarge { .. }));

        let at_cap = InstanceCount::Fixed(MAX_INSTANCES as i64).resolve(0, GroupKind::Gifts);
        assert_eq!(at_cap.unwrap(), MAX_INSTANCES);
        assert!(InstanceCount::Fixed(MAX_INSTANCES as i64 + 1)
            .resolve(0, GroupKind::Gifts)
            .is_err());
    }

    #[test]
    fn test_oversized_share_fails_validation() {
        let mut config = SceneConfig::default();
        config.groups[0].count = InstanceCount::Share(1e30);
        assert!(matches!(config.validate(), Err(ConfigError::CountTooLarge { .. })));
    }

    #[test]
    fn test_build_matches_counts() {
        let mut rng = SmallRng::seed_from_u64(21);
        let group = GroupConfig::reference(GroupKind::Ornaments).build(1000, &mut rng).unwrap();
        assert_eq!(group.count(), 80);
        assert!(group.colors().is_none());
        assert_eq!(group.material().base_color, gold().vec3());

        let gifts = GroupConfig::reference(GroupKind::Gifts).build(1000, &mut rng).unwrap();
        assert_eq!(gifts.count(), 40);
        assert_eq!(gifts.colors().map(|c| c.len()), Some(40));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut config = GroupConfig::reference(GroupKind::Leaves);
        config.layout = Layout::Cone { height: -1.0, radius: 5.0 };
        assert!(matches!(
            config.validate(10),
            Err(ConfigError::InvalidDimension { field: "cone.height", .. })
        ));
    }

    #[test]
    fn test_json_partial_override() {
        let config = SceneConfig::from_json_str(r#"{ "particle_count": 100, "stagger": { "lead": 2.0 } }"#).unwrap();
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.stagger.lead, 2.0);
        assert_eq!(config.stagger.index_penalty, 0.5);
        assert_eq!(config.groups.len(), 4);
    }

    #[test]
    fn test_json_roundtrip_of_default() {
        let config = SceneConfig::default();
        let text = config.to_json().unwrap();
        let back: SceneConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.groups, config.groups);
        assert_eq!(back.initial_state, config.initial_state);
    }

    #[test]
    fn test_json_rejects_bad_rate() {
        let err = SceneConfig::from_json_str(r#"{ "morph_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRate(_)));
    }
}
