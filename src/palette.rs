//! Colors and palettes for instance groups.
//!
//! Colors are written as `#rrggbb` strings in configuration and carried as
//! [`Vec3`] (RGB, 0.0-1.0) everywhere else. A [`Palette`] is a weighted list
//! of swatches; each instance draws one swatch at scene start.
//!
//! ```ignore
//! let palette = Palette::uniform(&["#ff0000", "#ffd700"])?;
//! let colors = palette.assign(&mut rng, 1000);
//! ```

use crate::error::ConfigError;
use crate::Vec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An sRGB color parsed from `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub Vec3);

impl Rgb {
    /// Parse `#rrggbb` (leading `#` optional).
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor(text.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ConfigError::InvalidColor(text.to_string()))
        };
        Ok(Rgb(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)))
    }

    /// Build a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Rgb(Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
    }

    /// The color as an RGB vector.
    #[inline]
    pub fn vec3(self) -> Vec3 {
        self.0
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        let c = (self.0.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        format!("#{:02x}{:02x}{:02x}", c.x as u8, c.y as u8, c.z as u8)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// One palette entry and its relative likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub color: Rgb,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

/// Weighted set of colors sampled once per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
    index: WeightedIndex<f32>,
}

impl Palette {
    /// Build a palette, rejecting empty or zero-weight swatch lists.
    pub fn new(swatches: Vec<Swatch>) -> Result<Self, ConfigError> {
        let total: f32 = swatches.iter().map(|s| s.weight).sum();
        if !total.is_finite() {
            return Err(ConfigError::EmptyPalette);
        }
        let index = WeightedIndex::new(swatches.iter().map(|s| s.weight))
            .map_err(|_| ConfigError::EmptyPalette)?;
        Ok(Self { swatches, index })
    }

    /// Equal-weight palette from hex strings.
    pub fn uniform(colors: &[&str]) -> Result<Self, ConfigError> {
        let swatches = colors
            .iter()
            .map(|c| {
                Ok(Swatch {
                    color: Rgb::parse(c)?,
                    weight: 1.0,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::new(swatches)
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// Draw one color.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.swatches[self.index.sample(rng)].color.vec3()
    }

    /// Draw `count` colors, one per instance.
    pub fn assign<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Vec3> {
        (0..count).map(|_| self.sample(&mut *rng)).collect()
    }
}

/// Deep greens for foliage: dark forest, emerald, sea green, mint highlight.
pub fn leaf_swatches() -> Vec<Swatch> {
    vec![
        Swatch { color: Rgb::from_u8(0x06, 0x4e, 0x3b), weight: 0.2 },
        Swatch { color: Rgb::from_u8(0x10, 0xb9, 0x81), weight: 0.3 },
        Swatch { color: Rgb::from_u8(0x05, 0x96, 0x69), weight: 0.3 },
        Swatch { color: Rgb::from_u8(0x34, 0xd3, 0x99), weight: 0.2 },
    ]
}

/// String-light bulbs.
pub fn light_swatches() -> Vec<Swatch> {
    [
        Rgb::from_u8(0xff, 0x00, 0x00),
        Rgb::from_u8(0xff, 0xd7, 0x00),
        Rgb::from_u8(0x00, 0x00, 0xff),
        Rgb::from_u8(0xff, 0xff, 0xff),
        Rgb::from_u8(0xff, 0x69, 0xb4),
        Rgb::from_u8(0x00, 0xff, 0xcc),
    ]
    .into_iter()
    .map(|color| Swatch { color, weight: 1.0 })
    .collect()
}

/// Wrapping paper.
pub fn gift_swatches() -> Vec<Swatch> {
    [
        Rgb::from_u8(0xdc, 0x26, 0x26),
        Rgb::from_u8(0xd4, 0xaf, 0x37),
        Rgb::from_u8(0x25, 0x63, 0xeb),
        Rgb::from_u8(0xff, 0xff, 0xff),
        Rgb::from_u8(0x10, 0xb9, 0x81),
    ]
    .into_iter()
    .map(|color| Swatch { color, weight: 1.0 })
    .collect()
}

/// Gold used for ornaments and the star.
pub fn gold() -> Rgb {
    Rgb::from_u8(0xff, 0xcc, 0x33)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_hex() {
        let c = Rgb::parse("#ff8000").unwrap();
        assert!((c.0.x - 1.0).abs() < 1e-6);
        assert!((c.0.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.0.z, 0.0);
        assert_eq!(Rgb::parse("10b981").unwrap().to_hex(), "#10b981");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#gg0000").is_err());
        assert!(Rgb::parse("").is_err());
        assert!(Rgb::parse("#+f+f+f").is_err());
        assert!(Rgb::parse("+fffff").is_err());
    }

    #[test]
    fn test_serde_hex_string() {
        let c: Rgb = serde_json::from_str("\"#ffcc33\"").unwrap();
        assert_eq!(c, gold());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ffcc33\"");
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(ConfigError::EmptyPalette)));
        let zero = vec![Swatch { color: gold(), weight: 0.0 }];
        assert!(Palette::new(zero).is_err());
        let negative = vec![
            Swatch { color: gold(), weight: 1.0 },
            Swatch { color: gold(), weight: -1.0 },
        ];
        assert!(Palette::new(negative).is_err());
        let infinite = vec![Swatch { color: gold(), weight: f32::INFINITY }];
        assert!(Palette::new(infinite).is_err());
        let nan = vec![Swatch { color: gold(), weight: f32::NAN }];
        assert!(Palette::new(nan).is_err());
    }

    #[test]
    fn test_weighted_sampling_follows_weights() {
        let palette = Palette::new(vec![
            Swatch { color: Rgb::from_u8(255, 0, 0), weight: 3.0 },
            Swatch { color: Rgb::from_u8(0, 0, 255), weight: 1.0 },
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let colors = palette.assign(&mut rng, 4000);
        let reds = colors.iter().filter(|c| c.x > 0.5).count();
        assert!(reds > 2700 && reds < 3300, "got {} reds", reds);
    }

    #[test]
    fn test_sample_never_picks_zero_weight() {
        let palette = Palette::new(vec![
            Swatch { color: Rgb::from_u8(0, 255, 0), weight: 1.0 },
            Swatch { color: Rgb::from_u8(255, 0, 0), weight: 0.0 },
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(12);
        assert!(palette.assign(&mut rng, 500).iter().all(|c| c.x == 0.0));
    }
}
