use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Criterion, Throughput};

use linesnap_core::{Fixation, FixationSequence, LineGeometry};

#[path = "../../tests/common/rng.rs"]
mod rng;

pub use rng::XorShift64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("LINESNAP_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tier: BenchTier,
    pub seed: u64,
    pub sample_size: usize,
    pub measurement: Duration,
}

pub fn bench_config() -> BenchConfig {
    let tier = BenchTier::from_env();
    let seed = env::var("LINESNAP_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    let (sample_size, measurement) = match tier {
        BenchTier::Quick => (20, Duration::from_secs(3)),
        BenchTier::Full => (40, Duration::from_secs(8)),
    };
    BenchConfig {
        tier,
        seed,
        sample_size,
        measurement,
    }
}

pub fn bench_criterion() -> Criterion {
    Criterion::default().configure_from_args()
}

pub fn configure_group<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, cfg: &BenchConfig) {
    group.sample_size(cfg.sample_size);
    group.measurement_time(cfg.measurement);
}

pub fn fixations_throughput(n: usize) -> Throughput {
    Throughput::Elements(n as u64)
}

/// A synthetic passage: `lines` lines 40px apart starting at y=200, read
/// left to right with `per_line` fixations each, progressive downward drift
/// and occasional regressions to the previous line.
pub fn synthetic_reading(
    seed: u64,
    lines: usize,
    per_line: usize,
) -> (FixationSequence, LineGeometry) {
    let mut rng = XorShift64::new(seed);
    let line_ys: Vec<f64> = (0..lines).map(|i| 200.0 + 40.0 * i as f64).collect();
    let mut fixations = Vec::with_capacity(lines * per_line);
    for (line, &y) in line_ys.iter().enumerate() {
        for k in 0..per_line {
            let target = if line > 0 && rng.one_in(20) {
                line_ys[line - 1]
            } else {
                y
            };
            let drift = 0.8 * fixations.len() as f64 / per_line as f64;
            let x = 80.0 + 90.0 * k as f64 + rng.gen_f64(-20.0, 20.0);
            let fy = target + drift + rng.gen_f64(-8.0, 8.0);
            let duration = rng.duration(120, 250);
            fixations.push(Fixation::new(x, fy, duration));
        }
    }
    let geometry = LineGeometry::new(line_ys).unwrap_or_else(|e| panic!("bench geometry: {e}"));
    (FixationSequence::new(fixations), geometry)
}
