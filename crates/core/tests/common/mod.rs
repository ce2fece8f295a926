#![allow(dead_code)]

use linesnap_core::{Fixation, FixationSequence, LineGeometry};

mod rng;

pub use rng::XorShift64;

pub const LINES: [f64; 3] = [500.0, 560.0, 620.0];

pub fn three_lines() -> LineGeometry {
    LineGeometry::new(LINES.to_vec()).unwrap()
}

pub fn seq(points: &[(f64, f64)]) -> FixationSequence {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Fixation::new(x, y, 150 + 10 * i as u32))
        .collect()
}

/// Ten fixations reading three lines top to bottom with +-5px noise and a
/// return sweep between lines.
pub fn monotonic_reading() -> FixationSequence {
    seq(&[
        (100.0, 503.0),
        (260.0, 497.0),
        (420.0, 505.0),
        (580.0, 499.0),
        (110.0, 556.0),
        (270.0, 565.0),
        (430.0, 559.0),
        (105.0, 624.0),
        (265.0, 615.0),
        (425.0, 621.0),
    ])
}

pub const MONOTONIC_LINES: [usize; 10] = [0, 0, 0, 0, 1, 1, 1, 2, 2, 2];

/// Uniformly random fixations over a wide area, no reading structure.
pub fn random_trial(seed: u64, n: usize) -> FixationSequence {
    let mut rng = XorShift64::new(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_f64(0.0, 1200.0);
            let y = rng.gen_f64(0.0, 1000.0);
            let duration = rng.duration(80, 400);
            Fixation::new(x, y, duration)
        })
        .collect()
}
