//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use evergreen::config::GroupConfig;
use evergreen::{
    generate_formed_positions, FrameTime, GroupKind, InstanceBatch, Mat4, Material, MorphState,
    RenderSink, Scene, SceneConfig, StaggerParams,
};

fn bench_batch_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_update");
    let params = StaggerParams::default();

    for count in [1_000u32, 6_000, 20_000] {
        let mut rng = SmallRng::seed_from_u64(1);
        let leaves = GroupConfig::reference(GroupKind::Leaves)
            .build(count, &mut rng)
            .unwrap();
        let mut batch = InstanceBatch::for_group(&leaves);

        group.bench_with_input(BenchmarkId::new("leaves", count), &count, |b, _| {
            let mut elapsed = 0.0f32;
            b.iter(|| {
                elapsed += 0.016;
                batch.update(&leaves, black_box(0.5), elapsed, &params);
                black_box(batch.as_bytes().len())
            })
        });
    }

    group.finish();
}

fn bench_generators(c: &mut Criterion) {
    c.bench_function("generate_formed_6000", |b| {
        let mut rng = SmallRng::seed_from_u64(2);
        b.iter(|| black_box(generate_formed_positions(&mut rng, 6000, 12.0, 5.0)))
    });
}

/// Accepts every frame and discards it.
struct NullSink;

impl RenderSink for NullSink {
    fn is_ready(&self) -> bool {
        true
    }

    fn submit_group(&mut self, _kind: GroupKind, batch: &InstanceBatch, _material: &Material) {
        black_box(batch.as_bytes());
    }

    fn submit_emblem(&mut self, transform: Mat4, brightness: f32) {
        black_box((transform, brightness));
    }

    fn submit_twinkle(&mut self, intensity: f32) {
        black_box(intensity);
    }
}

fn bench_full_frame(c: &mut Criterion) {
    let config = SceneConfig {
        seed: Some(3),
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(&config).unwrap();
    let mut sink = NullSink;

    c.bench_function("reference_scene_frame", |b| {
        let mut elapsed = 0.0f32;
        let mut state = MorphState::Formed;
        b.iter(|| {
            elapsed += 0.016;
            if scene.controller().is_settled(state, 1e-3) {
                state = state.toggled();
            }
            scene.render_frame(state, FrameTime::new(elapsed, 0.016), &mut sink)
        })
    });
}

criterion_group!(benches, bench_batch_update, bench_generators, bench_full_frame);
criterion_main!(benches);
