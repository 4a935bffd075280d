//! Orbit camera around the tree.

use crate::{Mat4, Vec3};
use std::f32::consts::TAU;

/// Closest the camera may zoom in.
pub const MIN_DISTANCE: f32 = 12.0;
/// Farthest the camera may zoom out.
pub const MAX_DISTANCE: f32 = 45.0;
/// Seconds per full auto-rotation.
pub const AUTO_ROTATE_PERIOD: f32 = 120.0;

const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera looking at a fixed target.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.15,
            distance: 24.0,
            target: Vec3::new(0.0, 0.5, 0.0),
            fov_y: 45.0_f32.to_radians(),
        }
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, aspect, 0.1, 200.0);
        proj * self.view_matrix()
    }

    /// Apply a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Zoom by wheel `scroll`; positive moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance the idle rotation by `delta` seconds.
    pub fn auto_rotate(&mut self, delta: f32) {
        if delta > 0.0 {
            self.yaw = (self.yaw + delta * TAU / AUTO_ROTATE_PERIOD) % TAU;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
