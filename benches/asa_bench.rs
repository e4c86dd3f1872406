//! Criterion benchmarks for the ASA engine.
//!
//! Uses the Sphere function so the numbers measure engine overhead
//! (scheduling, generation, acceptance, reannealing), not the objective.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use u_anneal::asa::{generate_candidate, Anneal, AsaConfig, AsaRunner, Bounds};

fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

fn bench_asa_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_sphere");
    group.sample_size(10);

    for &dim in &[2usize, 5, 10] {
        let initial = vec![4.0; dim];
        let bounds = vec![(-5.0, 5.0); dim];
        let config = AsaConfig::default().with_seed(42).with_max_steps(2000);

        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| {
                AsaRunner::run(&sphere, &initial, &bounds, config.clone())
                    .map(|r| black_box(r.best_objective))
            })
        });
    }
    group.finish();
}

fn bench_protocol_step(c: &mut Criterion) {
    c.bench_function("asa_protocol_500_steps_d3", |b| {
        b.iter(|| {
            let mut engine = Anneal::new(
                &[1.0, 1.0, 1.0],
                &[(-2.0, 2.0), (-2.0, 2.0), (-2.0, 2.0)],
                AsaConfig::default().with_seed(1).with_max_steps(500),
            )
            .expect("valid engine");
            AsaRunner::drive(&mut engine, &sphere, None).map(|r| black_box(r.steps))
        })
    });
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("asa_generate");
    for &width in &[10.0, 1.0, 0.1] {
        let bounds = Bounds::new(&[(-width / 2.0, width / 2.0); 4]).expect("valid bounds");
        let current = [0.0; 4];
        let t_k = [0.5; 4];
        let mut rng = StdRng::seed_from_u64(7);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                black_box(generate_candidate(&current, &t_k, &bounds, 1_000_000, &mut rng))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_asa_sphere, bench_protocol_step, bench_generation);
criterion_main!(benches);
