//! Frame orchestration.
//!
//! [`Scene`] owns everything that persists across frames: the morph
//! controller, the static instance groups and one pre-sized output batch per
//! group. [`Scene::render_frame`] is the only per-frame entry point; it runs
//! the whole update synchronously and hands the results to a [`RenderSink`].
//!
//! # Frame order
//!
//! 1. If the sink is not ready, nothing happens (the morph does not advance).
//! 2. The controller advances toward the requested [`MorphState`].
//! 3. Progress is read once; every group is updated with that same value.
//! 4. Each batch is submitted whole, then the emblem, then the twinkle.

use crate::animate::{InstanceBatch, StaggerParams};
use crate::config::SceneConfig;
use crate::error::ConfigError;
use crate::group::{GroupKind, InstanceGroup, Material};
use crate::morph::{MorphController, MorphState};
use crate::pulse::{Emblem, Pulse};
use crate::time::FrameTime;
use crate::Mat4;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Consumer of a frame's output, usually a GPU backend.
///
/// Every `submit_group` call carries the complete batch for one group. A sink
/// must apply it atomically; the scene never sends partial batches.
pub trait RenderSink {
    /// Whether render targets and instance buffers exist. When `false` the
    /// frame is skipped entirely.
    fn is_ready(&self) -> bool;

    /// Full instance batch for one group.
    fn submit_group(&mut self, kind: GroupKind, batch: &InstanceBatch, material: &Material);

    /// Static emblem transform and its current glow strength.
    fn submit_emblem(&mut self, transform: Mat4, brightness: f32);

    /// Shared intensity of the light bulbs.
    fn submit_twinkle(&mut self, intensity: f32);
}

/// All state carried from one frame to the next.
#[derive(Debug, Clone)]
pub struct Scene {
    controller: MorphController,
    groups: Vec<InstanceGroup>,
    batches: Vec<InstanceBatch>,
    stagger: StaggerParams,
    twinkle: Pulse,
    emblem: Emblem,
    last_state: Option<MorphState>,
}

impl Scene {
    /// Build a scene from `config`, seeding placement from `config.seed` or entropy.
    pub fn new(config: &SceneConfig) -> Result<Self, ConfigError> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Build a scene drawing all randomness from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let controller = MorphController::with_rate(config.initial_state, config.morph_rate)?;

        let groups = config
            .groups
            .iter()
            .map(|g| g.build(config.particle_count, &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;

        let total: usize = groups.iter().map(InstanceGroup::count).sum();
        log::info!(
            "Scene built: {} groups, {} instances, starting {:?}",
            groups.len(),
            total,
            config.initial_state
        );
        for group in &groups {
            log::debug!("  {}: {} instances", group.kind().name(), group.count());
        }

        Ok(Self::from_parts(
            controller,
            groups,
            config.stagger,
            config.twinkle,
            config.emblem.clone(),
        ))
    }

    /// Assemble a scene from already-built groups.
    pub fn from_parts(
        controller: MorphController,
        groups: Vec<InstanceGroup>,
        stagger: StaggerParams,
        twinkle: Pulse,
        emblem: Emblem,
    ) -> Self {
        let batches = groups.iter().map(InstanceBatch::for_group).collect();
        Self {
            controller,
            groups,
            batches,
            stagger,
            twinkle,
            emblem,
            last_state: None,
        }
    }

    /// Run one frame. Returns `false` if the sink was not ready and nothing changed.
    pub fn render_frame<S: RenderSink + ?Sized>(
        &mut self,
        state: MorphState,
        time: FrameTime,
        sink: &mut S,
    ) -> bool {
        if !sink.is_ready() {
            log::debug!("sink not ready, skipping frame {}", time.frame);
            return false;
        }

        self.note_state(state);
        let progress = self.controller.advance(state, time.delta);

        for (group, batch) in self.groups.iter().zip(self.batches.iter_mut()) {
            batch.update(group, progress, time.elapsed, &self.stagger);
        }
        for (group, batch) in self.groups.iter().zip(self.batches.iter()) {
            sink.submit_group(group.kind(), batch, group.material());
        }

        sink.submit_emblem(self.emblem.transform(), self.emblem.brightness(time.elapsed));
        sink.submit_twinkle(self.twinkle.sample(time.elapsed));
        true
    }

    fn note_state(&mut self, state: MorphState) {
        if self.last_state != Some(state) {
            if let Some(previous) = self.last_state {
                log::debug!(
                    "morph target {:?} -> {:?} at progress {:.3}",
                    previous,
                    state,
                    self.controller.progress()
                );
            }
            self.last_state = Some(state);
        }
    }

    /// Current morph progress.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.controller.progress()
    }

    pub fn controller(&self) -> &MorphController {
        &self.controller
    }

    pub fn groups(&self) -> &[InstanceGroup] {
        &self.groups
    }

    /// Output of the most recent frame, in group order.
    pub fn batches(&self) -> &[InstanceBatch] {
        &self.batches
    }

    pub fn group(&self, kind: GroupKind) -> Option<&InstanceGroup> {
        self.groups.iter().find(|g| g.kind() == kind)
    }

    pub fn batch(&self, kind: GroupKind) -> Option<&InstanceBatch> {
        self.groups
            .iter()
            .position(|g| g.kind() == kind)
            .map(|i| &self.batches[i])
    }

    pub fn emblem(&self) -> &Emblem {
        &self.emblem
    }

    pub fn twinkle(&self) -> &Pulse {
        &self.twinkle
    }

    pub fn stagger(&self) -> &StaggerParams {
        &self.stagger
    }

    /// Total instances across all groups.
    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(InstanceGroup::count).sum()
    }
}
