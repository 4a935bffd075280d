//! The global morph progress.
//!
//! A single scalar in `[0, 1]` drives every group: `1.0` is the assembled
//! tree, `0.0` the scattered cloud. The UI only ever supplies a target
//! [`MorphState`]; [`MorphController::advance`] eases toward it once per frame.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Reference easing rate, per second.
pub const DEFAULT_MORPH_RATE: f32 = 1.8;

/// Which arrangement the scene is heading toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphState {
    /// Assembled into the tree.
    #[default]
    Formed,
    /// Scattered into a cloud.
    Dispersed,
}

impl MorphState {
    /// Progress value this state pulls toward.
    #[inline]
    pub fn target(self) -> f32 {
        match self {
            MorphState::Formed => 1.0,
            MorphState::Dispersed => 0.0,
        }
    }

    /// The other state.
    pub fn toggled(self) -> Self {
        match self {
            MorphState::Formed => MorphState::Dispersed,
            MorphState::Dispersed => MorphState::Formed,
        }
    }
}

/// Owns the morph progress and eases it toward the requested state.
///
/// The update is frame-rate independent exponential smoothing:
///
/// ```text
/// progress += (target - progress) * (1 - e^(-rate * dt))
/// ```
///
/// The factor is always in `[0, 1]`, so progress approaches the target
/// monotonically and never overshoots, whatever the frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphController {
    progress: f32,
    rate: f32,
}

impl MorphController {
    /// Start settled in `initial` at the reference rate.
    pub fn new(initial: MorphState) -> Self {
        Self {
            progress: initial.target(),
            rate: DEFAULT_MORPH_RATE,
        }
    }

    /// Start settled in `initial` with a custom easing rate (per second).
    pub fn with_rate(initial: MorphState, rate: f32) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::InvalidRate(rate));
        }
        Ok(Self {
            progress: initial.target(),
            rate,
        })
    }

    /// Current progress, always within `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Overwrite the progress, clamped into `[0, 1]`. NaN is ignored.
    pub fn set_progress(&mut self, progress: f32) {
        if !progress.is_nan() {
            self.progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Interpolation factor for a frame of `delta_time` seconds.
    ///
    /// Zero, negative and non-finite deltas yield `0.0`; huge deltas yield `1.0`.
    pub fn blend_factor(&self, delta_time: f32) -> f32 {
        if delta_time.is_nan() || delta_time <= 0.0 {
            return 0.0;
        }
        (1.0 - (-self.rate * delta_time).exp()).clamp(0.0, 1.0)
    }

    /// Ease toward `target` by one frame. Returns the new progress.
    pub fn advance(&mut self, target: MorphState, delta_time: f32) -> f32 {
        let factor = self.blend_factor(delta_time);
        if factor > 0.0 {
            let goal = target.target();
            self.progress = (self.progress + (goal - self.progress) * factor).clamp(0.0, 1.0);
        }
        self.progress
    }

    /// Whether progress is within `epsilon` of `state`'s target.
    pub fn is_settled(&self, state: MorphState, epsilon: f32) -> bool {
        (self.progress - state.target()).abs() <= epsilon
    }
}

impl Default for MorphController {
    fn default() -> Self {
        Self::new(MorphState::Formed)
    }
}
