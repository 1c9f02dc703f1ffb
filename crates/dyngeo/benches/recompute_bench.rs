//! Criterion benches for recomputation and the numeric hot paths.
//!
//! - drag: move every free point of a random construction (20–200 steps),
//!   with and without continuous mode.
//! - roots: bounded root search on a transcendental intersection.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use dyngeo::api::{
    drag_free_points, find_roots, populate, Conic, Construction, Expr, Function, RandomCfg,
    ReplayToken, RootCfg,
};
use nalgebra::Vector2;

fn random_construction(steps: usize, continuous: bool) -> Construction {
    let mut cons = Construction::new();
    cons.set_continuous_mode(continuous);
    let cfg = RandomCfg {
        free_points: 8,
        steps,
        extent: 5.0,
    };
    populate(&mut cons, cfg, ReplayToken::new(42, steps as u64)).expect("random construction");
    cons
}

fn bench_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag");
    for &steps in &[20usize, 50, 200] {
        for continuous in [false, true] {
            let id = format!("{steps}/{}", if continuous { "continuous" } else { "canonical" });
            group.bench_with_input(BenchmarkId::new("drag_free_points", id), &steps, |b, &steps| {
                b.iter_batched(
                    || random_construction(steps, continuous),
                    |mut cons| {
                        let _ = drag_free_points(&mut cons, 0.1, ReplayToken::new(7, 0));
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.bench_function(BenchmarkId::new("recompute_all", 200), |b| {
        b.iter_batched(
            || random_construction(200, false),
            |mut cons| {
                let _ = cons.recompute_all();
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("roots");
    let f = Function::new(Expr::Sin(Box::new(Expr::X)), -4.0, 4.0);
    let circle = Conic::circle(Vector2::new(0.5, 0.0), 1.0);
    let cfg = RootCfg::default();
    group.bench_function("sin_vs_circle", |b| {
        b.iter(|| find_roots(|t| circle.eval(t, f.eval(t)), -1.0, 2.0, &cfg))
    });
    group.finish();
}

criterion_group!(benches, bench_drag, bench_roots);
criterion_main!(benches);
