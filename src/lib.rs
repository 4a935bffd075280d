//! # Evergreen
//!
//! A morphing particle tree: thousands of instanced primitives that blend
//! between a golden-angle cone spiral (the *formed* tree) and a scattered
//! cloud (the *dispersed* state).
//!
//! The crate is split into a renderer-agnostic core and an optional wgpu
//! viewer:
//!
//! - [`positions`] generates both arrangements once, from an injectable RNG.
//! - [`group`] holds each group's static data (positions, scales, colors).
//! - [`morph`] eases a single progress scalar toward the requested state.
//! - [`animate`] turns progress and time into per-instance matrices.
//! - [`scene`] ties it together and hands each frame to a [`RenderSink`].
//! - [`viewer`] is a winit/wgpu window implementing that sink.
//!
//! ## Quick Start
//!
//! ```ignore
//! use evergreen::prelude::*;
//!
//! let config = SceneConfig { seed: Some(1), ..SceneConfig::default() };
//! let mut scene = Scene::new(&config)?;
//!
//! // Once per frame, with any RenderSink:
//! scene.render_frame(MorphState::Dispersed, FrameTime::new(elapsed, delta), &mut sink);
//! ```
//!
//! ## Staggered assembly
//!
//! Instances do not move in lockstep. Instance `i` of `count` follows
//! `clamp(progress * 1.5 - (i / count) * 0.5, 0, 1)`, so low indices (the
//! bottom of the tree) settle first. Both constants live in
//! [`StaggerParams`](animate::StaggerParams).

pub mod animate;
pub mod config;
pub mod error;
pub mod group;
pub mod morph;
pub mod palette;
pub mod positions;
pub mod pulse;
pub mod scene;
pub mod time;
pub mod viewer;

pub use bytemuck;
pub use glam::{Mat4, Quat, Vec2, Vec3};

pub use animate::{individual_progress, instance_transform, InstanceBatch, InstanceRaw, StaggerParams};
pub use config::{ColorScheme, GroupConfig, InstanceCount, Layout, SceneConfig, MAX_INSTANCES};
pub use error::{ConfigError, ViewerError};
pub use group::{GroupKind, InstanceGroup, InstanceJitter, Material};
pub use morph::{MorphController, MorphState};
pub use palette::{Palette, Rgb, Swatch};
pub use positions::{generate_dispersed_positions, generate_formed_positions};
pub use pulse::{Emblem, Pulse};
pub use scene::{RenderSink, Scene};
pub use time::{FrameTime, Time};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use evergreen::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animate::{InstanceBatch, StaggerParams};
    pub use crate::config::SceneConfig;
    pub use crate::error::ConfigError;
    pub use crate::group::{GroupKind, InstanceGroup, Material};
    pub use crate::morph::{MorphController, MorphState};
    pub use crate::scene::{RenderSink, Scene};
    pub use crate::time::FrameTime;
    pub use crate::{Mat4, Vec3};
}
