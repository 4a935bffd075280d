//! Oscillating intensities and the star emblem.
//!
//! Two values pulse independently of the morph: the shared brightness of the
//! light bulbs ("twinkle") and the glow of the star on top of the tree. The
//! star itself never moves; it has a fixed transform.

use crate::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// `base + amplitude * sin(t * frequency)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub base: f32,
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
}

impl Pulse {
    pub const fn new(base: f32, amplitude: f32, frequency: f32) -> Self {
        Self {
            base,
            amplitude,
            frequency,
        }
    }

    /// Bulb brightness: `10 + 5 sin(5t)`.
    pub const TWINKLE: Pulse = Pulse::new(10.0, 5.0, 5.0);

    /// Star glow around its static emissive strength of 5.
    pub const STAR_GLOW: Pulse = Pulse::new(5.0, 1.5, 2.0);

    #[inline]
    pub fn sample(&self, elapsed: f32) -> f32 {
        self.base + self.amplitude * (elapsed * self.frequency).sin()
    }

    /// Lowest and highest value the pulse reaches.
    pub fn bounds(&self) -> (f32, f32) {
        let a = self.amplitude.abs();
        (self.base - a, self.base + a)
    }
}

/// Outline of a regular star in the XY plane, starting at angle 0.
///
/// Returns `2 * points` vertices alternating between `outer` and `inner`
/// radius, spaced `π / points` apart.
pub fn star_outline(points: usize, outer: f32, inner: f32) -> Vec<Vec2> {
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = i as f32 * PI / points as f32;
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// The decorative star: static placement plus a pulsing glow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emblem {
    pub position: Vec3,
    pub points: usize,
    pub outer_radius: f32,
    pub inner_radius: f32,
    /// Extrusion depth of the star prism.
    pub depth: f32,
    pub glow: Pulse,
}

impl Default for Emblem {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.6, 0.0),
            points: 5,
            outer_radius: 1.0,
            inner_radius: 0.4,
            depth: 0.3,
            glow: Pulse::STAR_GLOW,
        }
    }
}

impl Emblem {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    pub fn outline(&self) -> Vec<Vec2> {
        star_outline(self.points, self.outer_radius, self.inner_radius)
    }

    #[inline]
    pub fn brightness(&self, elapsed: f32) -> f32 {
        self.glow.sample(elapsed)
    }
}
