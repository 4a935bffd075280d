//! End-to-end tests of the morph pipeline: generators, controller, updater
//! and scene wiring, without a graphics context.

use evergreen::prelude::*;
use evergreen::{
    generate_dispersed_positions, generate_formed_positions, individual_progress, InstanceJitter,
    Pulse, Emblem,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ============================================================================
// Helpers
// ============================================================================

/// Four instances on the X axis, all scattered to (10, 10, 10).
fn line_group() -> InstanceGroup {
    InstanceGroup::new(
        GroupKind::Ornaments,
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ],
        vec![Vec3::splat(10.0); 4],
        (0.1, 0.2),
        0.0,
        None,
        vec![InstanceJitter { speed: 1.0, phase: 0.0 }; 4],
        Material::default(),
    )
    .unwrap()
}

fn line_scene(initial: MorphState) -> Scene {
    Scene::from_parts(
        MorphController::new(initial),
        vec![line_group()],
        StaggerParams::default(),
        Pulse::TWINKLE,
        Emblem::default(),
    )
}

#[derive(Default)]
struct CountingSink {
    ready: bool,
    batches: usize,
    emblems: usize,
    twinkles: Vec<f32>,
}

impl RenderSink for CountingSink {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn submit_group(&mut self, _kind: GroupKind, _batch: &InstanceBatch, _material: &Material) {
        self.batches += 1;
    }

    fn submit_emblem(&mut self, _transform: Mat4, _brightness: f32) {
        self.emblems += 1;
    }

    fn submit_twinkle(&mut self, intensity: f32) {
        self.twinkles.push(intensity);
    }
}

fn ready_sink() -> CountingSink {
    CountingSink {
        ready: true,
        ..CountingSink::default()
    }
}

// ============================================================================
// Generators
// ============================================================================

#[test]
fn test_dispersed_positions_stay_in_range() {
    let mut rng = SmallRng::seed_from_u64(3);
    for count in [0, 1, 17, 500] {
        let points = generate_dispersed_positions(&mut rng, count, 30.0);
        assert_eq!(points.len(), count);
        for p in points {
            assert!(p.abs().max_element() <= 15.0);
        }
    }
}

#[test]
fn test_formed_positions_shape() {
    let mut rng = SmallRng::seed_from_u64(4);
    let points = generate_formed_positions(&mut rng, 1000, 12.0, 5.0);
    assert_eq!(points.len(), 1000);

    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    assert!(min_y >= -6.1 && min_y < -5.8);
    assert!(max_y <= 6.1 && max_y > 5.8);

    // Mean radius of the lower half exceeds that of the upper half.
    let radius = |p: &Vec3| (p.x * p.x + p.z * p.z).sqrt();
    let lower: f32 = points[..500].iter().map(radius).sum::<f32>() / 500.0;
    let upper: f32 = points[500..].iter().map(radius).sum::<f32>() / 500.0;
    assert!(lower > upper);
}

// ============================================================================
// Updater end-to-end
// ============================================================================

#[test]
fn test_formed_group_resolves_to_targets() {
    let group = line_group();
    let params = StaggerParams::default();
    let mut batch = InstanceBatch::for_group(&group);
    batch.update(&group, 1.0, 0.0, &params);

    assert_eq!(individual_progress(1.0, 0, 4, &params), 1.0);
    assert_eq!(individual_progress(1.0, 3, 4, &params), 1.0);

    assert!(batch.position(0).abs_diff_eq(Vec3::ZERO, 1e-6));
    for i in 0..4 {
        let expected = Vec3::new(i as f32, 0.0, 0.0);
        assert!(batch.position(i).abs_diff_eq(expected, 1e-5), "instance {}", i);
        let (scale, _, _) = batch.transform(i).to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(0.2), 1e-5));
    }
}

#[test]
fn test_dispersed_group_floats_around_scatter_point() {
    let group = line_group();
    let params = StaggerParams::default();
    let mut batch = InstanceBatch::for_group(&group);
    batch.update(&group, 0.0, 0.0, &params);

    for i in 0..4 {
        assert_eq!(individual_progress(0.0, i, 4, &params), 0.0);
        let offset = batch.position(i) - Vec3::splat(10.0);
        let phase = i as f32;
        let expected = Vec3::new(phase.sin(), phase.cos(), phase.sin()) * 0.3;
        assert!(offset.abs_diff_eq(expected, 1e-5), "instance {}", i);
        assert!(offset.length() > 0.0);
        let (scale, _, _) = batch.transform(i).to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(0.1), 1e-5));
    }
}

#[test]
fn test_update_is_idempotent() {
    let group = line_group();
    let params = StaggerParams::default();
    let mut first = InstanceBatch::for_group(&group);
    first.update(&group, 0.42, 3.3, &params);
    let snapshot = first.instances().to_vec();
    first.update(&group, 0.42, 3.3, &params);
    assert_eq!(first.instances(), snapshot.as_slice());
}

// ============================================================================
// Scene wiring
// ============================================================================

#[test]
fn test_scene_converges_without_overshoot() {
    let mut scene = line_scene(MorphState::Dispersed);
    let mut sink = ready_sink();
    let mut last = scene.progress();
    for frame in 0..200 {
        scene.render_frame(MorphState::Formed, FrameTime::new(frame as f32 / 60.0, 1.0 / 60.0), &mut sink);
        let p = scene.progress();
        assert!(p >= last);
        assert!(p <= 1.0);
        last = p;
    }
    assert!(last > 0.99);
    assert_eq!(sink.batches, 200);
    assert_eq!(sink.emblems, 200);
}

#[test]
fn test_zero_delta_frame_keeps_progress() {
    let mut scene = line_scene(MorphState::Formed);
    let mut sink = ready_sink();
    scene.render_frame(MorphState::Dispersed, FrameTime::new(1.0, 0.25), &mut sink);
    let before = scene.progress();
    scene.render_frame(MorphState::Dispersed, FrameTime::new(1.0, 0.0), &mut sink);
    assert_eq!(scene.progress(), before);
}

#[test]
fn test_unready_sink_leaves_scene_untouched() {
    let mut scene = line_scene(MorphState::Formed);
    let mut sink = CountingSink::default();
    let before = scene.batches()[0].instances().to_vec();

    assert!(!scene.render_frame(MorphState::Dispersed, FrameTime::new(5.0, 1.0), &mut sink));
    assert_eq!(scene.progress(), 1.0);
    assert_eq!(scene.batches()[0].instances(), before.as_slice());
    assert_eq!(sink.batches, 0);
    assert!(sink.twinkles.is_empty());
}

#[test]
fn test_twinkle_follows_reference_formula() {
    let mut scene = line_scene(MorphState::Formed);
    let mut sink = ready_sink();
    for t in [0.0f32, 0.3, 1.7] {
        scene.render_frame(MorphState::Formed, FrameTime::new(t, 0.016), &mut sink);
    }
    for (got, t) in sink.twinkles.iter().zip([0.0f32, 0.3, 1.7]) {
        assert!((got - (10.0 + 5.0 * (t * 5.0).sin())).abs() < 1e-4);
    }
}

#[test]
fn test_default_scene_from_seed() {
    let config = SceneConfig {
        particle_count: 100,
        seed: Some(99),
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(&config).unwrap();
    let mut sink = ready_sink();
    assert!(scene.render_frame(MorphState::Formed, FrameTime::new(0.0, 0.016), &mut sink));
    assert_eq!(sink.batches, 4);
    assert_eq!(scene.instance_count(), 100 + 15 + 8 + 40);
}

#[test]
fn test_invalid_config_rejected_before_build() {
    let mut config = SceneConfig::default();
    config.groups[0].count = evergreen::InstanceCount::Fixed(-1);
    assert!(matches!(
        Scene::new(&config),
        Err(ConfigError::NegativeCount { value: -1, .. })
    ));
}
