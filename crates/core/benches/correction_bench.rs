mod common;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use linesnap_core::tools::correct_batch;
use linesnap_core::{FixationSequence, Method, Strategy, correct};

use common::{
    BenchTier, bench_config, bench_criterion, configure_group, fixations_throughput,
    synthetic_reading,
};

fn bench_methods(c: &mut Criterion) {
    let cfg = bench_config();
    let sizes: &[(usize, usize)] = if cfg.tier == BenchTier::Quick {
        &[(8, 10), (20, 12)]
    } else {
        &[(8, 10), (20, 12), (40, 15)]
    };

    for method in Method::ALL {
        let mut group = c.benchmark_group(format!("correct_{method}"));
        configure_group(&mut group, &cfg);
        let strategy = Strategy::from_method(method);

        for &(lines, per_line) in sizes {
            let (fixations, geometry) =
                synthetic_reading(cfg.seed ^ lines as u64, lines, per_line);
            group.throughput(fixations_throughput(fixations.len()));
            group.bench_with_input(
                BenchmarkId::new("lines", lines),
                &fixations,
                |b, fixations| {
                    b.iter(|| {
                        let result = correct(fixations, &geometry, &strategy);
                        black_box(result.map(|r| r.line_indices.len()).unwrap_or(0));
                    })
                },
            );
        }

        group.finish();
    }
}

fn bench_batch(c: &mut Criterion) {
    let cfg = bench_config();
    let trials = if cfg.tier == BenchTier::Quick { 32 } else { 128 };

    let (_, geometry) = synthetic_reading(cfg.seed, 12, 10);
    let batch: Vec<FixationSequence> = (0..trials as u64)
        .map(|i| synthetic_reading(cfg.seed ^ i, 12, 10).0)
        .collect();

    let mut group = c.benchmark_group("correct_batch");
    configure_group(&mut group, &cfg);
    group.throughput(fixations_throughput(batch.iter().map(FixationSequence::len).sum()));
    group.bench_function("warp", |b| {
        let strategy = Strategy::default();
        b.iter(|| black_box(correct_batch(&batch, &geometry, &strategy).len()))
    });
    group.finish();
}

criterion_group!(
    name = correction_benches;
    config = bench_criterion();
    targets = bench_methods, bench_batch
);
criterion_main!(correction_benches);
