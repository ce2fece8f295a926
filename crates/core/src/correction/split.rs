//! Split method.
//!
//! Like segment, but boundaries are return sweeps: large leftward jumps in x
//! that do not rise by more than `rise_ratio` line spacings. Segments are
//! assigned to lines in order with the same policy and fallback as segment.
//!
//! The leftward threshold is either fixed (`sweep_x_thresh`) or derived per
//! trial by splitting the x-displacements into two clusters and taking the
//! more negative one as sweeps.

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::SplitParams;
use crate::utils::{diffs, lloyd_1d};

use super::segment::assign_in_order;
use super::{Assignment, LineAssigner};

const SWEEP_CLUSTER_ITERATIONS: usize = 100;

/// Marks which x-displacements are leftward sweeps by two-means clustering.
fn adaptive_sweeps(dx: &[f64]) -> Vec<bool> {
    let lo = dx.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = dx.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if dx.is_empty() || lo >= hi {
        return vec![false; dx.len()];
    }
    let fit = lloyd_1d(dx, &[lo, hi], SWEEP_CLUSTER_ITERATIONS);
    fit.labels
        .iter()
        .zip(dx)
        .map(|(&label, &d)| label == 0 && d < 0.0)
        .collect()
}

fn sweep_starts(
    fixations: &[Fixation],
    geometry: &LineGeometry,
    params: &SplitParams,
) -> Vec<usize> {
    let dx = diffs(fixations.iter().map(|f| f.x));
    let dy = diffs(fixations.iter().map(|f| f.y));
    let rise_limit = params.rise_ratio * geometry.median_spacing();

    let leftward: Vec<bool> = match params.sweep_x_thresh {
        Some(t) => dx.iter().map(|&d| d <= -t).collect(),
        None => adaptive_sweeps(&dx),
    };

    leftward
        .iter()
        .zip(&dy)
        .enumerate()
        .filter(|(_, (left, rise))| **left && **rise >= -rise_limit)
        .map(|(i, _)| i + 1)
        .collect()
}

impl LineAssigner for SplitParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let starts = sweep_starts(fixations, geometry, self);
        tracing::debug!(
            fixations = fixations.len(),
            sweeps = starts.len(),
            "split"
        );
        Ok(assign_in_order(
            fixations,
            geometry,
            &starts,
            self.count_tolerance,
        ))
    }
}
