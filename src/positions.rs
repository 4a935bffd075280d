//! Procedural placement of instances.
//!
//! Every group has two fixed arrangements generated once at scene start:
//! a *formed* arrangement (the tree) and a *dispersed* one (a loose cloud).
//! The animation only ever blends between them.
//!
//! Generators take the random source as an argument so callers decide
//! between entropy and a fixed seed:
//!
//! ```ignore
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! let formed = generate_formed_positions(&mut rng, 6000, 12.0, 5.0);
//! let dispersed = generate_dispersed_positions(&mut rng, 6000, 30.0);
//! ```

use crate::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Golden ratio, used as the angular step multiplier of the cone spiral.
pub const GOLDEN_RATIO: f32 = 1.618_034;

/// Multiplicative radial jitter applied to formed positions (total width).
pub const RADIAL_JITTER: f32 = 0.15;

/// Additive vertical jitter applied to formed positions (total width).
pub const VERTICAL_JITTER: f32 = 0.2;

/// Points on a conical spiral, vertically centered on the origin.
///
/// Index `i` maps to the height fraction `t = i / count`; the radius shrinks
/// linearly from `radius` at the base to zero at the apex. Consecutive points
/// are `2π·φ` apart in angle, which spreads them around the cone without
/// visible banding. Each point gets ±7.5% radial and ±0.1 vertical jitter.
pub fn generate_formed_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    height: f32,
    radius: f32,
) -> Vec<Vec3> {
    let angle_step = TAU * GOLDEN_RATIO;
    let mut positions = Vec::with_capacity(count);

    for i in 0..count {
        let t = i as f32 / count as f32;
        let ring_radius = (1.0 - t) * radius;
        let angle = i as f32 * angle_step;

        let radial = 1.0 + (rng.gen::<f32>() - 0.5) * RADIAL_JITTER;
        let lift = (rng.gen::<f32>() - 0.5) * VERTICAL_JITTER;

        positions.push(Vec3::new(
            angle.cos() * ring_radius * radial,
            t * height + lift - height / 2.0,
            angle.sin() * ring_radius * radial,
        ));
    }

    positions
}

/// Points uniformly distributed in an axis-aligned cube of side `range`
/// centered on the origin.
pub fn generate_dispersed_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    range: f32,
) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                (rng.gen::<f32>() - 0.5) * range,
                (rng.gen::<f32>() - 0.5) * range,
                (rng.gen::<f32>() - 0.5) * range,
            )
        })
        .collect()
}

/// Points scattered on a flat annulus around the foot of the tree.
///
/// * `inner_radius`..`outer_radius` - radial band in the XZ plane
/// * `floor`..`floor + thickness` - vertical band
pub fn generate_base_ring_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    inner_radius: f32,
    outer_radius: f32,
    floor: f32,
    thickness: f32,
) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let r = inner_radius + rng.gen::<f32>() * (outer_radius - inner_radius);
            let y = floor + rng.gen::<f32>() * thickness;
            Vec3::new(angle.cos() * r, y, angle.sin() * r)
        })
        .collect()
}

/// Distance of a point from the vertical (Y) axis.
#[inline]
pub fn radial_distance(p: Vec3) -> f32 {
    (p.x * p.x + p.z * p.z).sqrt()
}
