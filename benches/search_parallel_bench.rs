//! Sequential vs parallel trial batches, plus a full allocation search.
//!
//! Run with: `cargo bench --bench search_parallel`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use psi_optimizer::data::DifficultyRegistry;
use psi_optimizer::dice::Rng;
use psi_optimizer::optimizer::search::{find_best_with, SearchOptions};
use psi_optimizer::parallel::count_hits;

fn bench_count_hits(c: &mut Criterion) {
    let trials = 200_000;
    let seed = 42_u64;
    let hit = |rng: &mut Rng| (20..=30).contains(&rng.roll_sum(8));

    let mut group = c.benchmark_group("count_hits");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(count_hits(trials, seed, false, hit)))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(count_hits(trials, seed, true, hit)))
    });

    group.finish();
}

fn bench_find_best(c: &mut Criterion) {
    let registry = DifficultyRegistry::builtin();
    let mut options = SearchOptions::default();
    options.probability = options.probability.with_seed(7);

    let mut group = c.benchmark_group("find_best");
    group.sample_size(10);

    group.bench_function("schwer_12_parallel", |b| {
        b.iter(|| black_box(find_best_with(registry, 12, "schwer", 1, &options)))
    });

    let sequential = SearchOptions {
        probability: psi_optimizer::optimizer::ProbabilityConfig {
            parallel: false,
            ..options.probability
        },
        ..options
    };
    group.bench_function("schwer_12_sequential", |b| {
        b.iter(|| black_box(find_best_with(registry, 12, "schwer", 1, &sequential)))
    });

    group.finish();
}

criterion_group!(benches, bench_count_hits, bench_find_best);
criterion_main!(benches);
