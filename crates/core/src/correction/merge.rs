//! Merge method.
//!
//! Temporally adjacent fixations within `y_thresh` of each other are merged
//! into runs, which absorbs micro-saccade noise within a line. A step of at
//! least the smallest line spacing always starts a new run. Runs are then
//! walked in order while tracking the current line:
//! - a run nearest the current line or a later one moves the reader there;
//! - a run nearest an earlier line, but within `hold_ratio` times the gap
//!   between the current line and the one above it, stays on the current line;
//! - any other run is a regression and is snapped to its nearest line. Those
//!   runs are reported as a `RegressiveRuns` fallback.

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::MergeParams;
use crate::utils::{mean, split_at_starts};

use super::snap::breaks_vertically;
use super::{Assignment, Fallback, FallbackReason, LineAssigner};

fn run_starts(fixations: &[Fixation], y_thresh: f64, min_spacing: f64) -> Vec<usize> {
    fixations
        .windows(2)
        .enumerate()
        .filter(|(_, w)| breaks_vertically(w[1].y - w[0].y, y_thresh, min_spacing))
        .map(|(i, _)| i + 1)
        .collect()
}

impl MergeParams {
    /// Largest upward offset from line `current` that still counts as
    /// staying on it.
    fn hold(&self, geometry: &LineGeometry, current: usize) -> f64 {
        self.hold_ratio * (geometry.line_y(current) - geometry.line_y(current - 1))
    }
}

impl LineAssigner for MergeParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let starts = run_starts(fixations, self.y_thresh, geometry.min_spacing());
        let runs = split_at_starts(fixations.len(), &starts);

        let mut lines = Vec::with_capacity(fixations.len());
        let mut current: Option<usize> = None;
        let mut regressive = 0;
        for run in &runs {
            let ys: Vec<f64> = fixations[run.clone()].iter().map(|f| f.y).collect();
            let y = mean(&ys).unwrap_or(0.0);
            let nearest = geometry.nearest_line(y);
            let held = |c: usize| (y - geometry.line_y(c)).abs() <= self.hold(geometry, c);
            let line = match current {
                Some(c) if nearest < c && held(c) => c,
                Some(c) if nearest < c => {
                    regressive += run.len();
                    nearest
                }
                _ => nearest,
            };
            current = Some(line);
            lines.extend(std::iter::repeat_n(line, run.len()));
        }
        tracing::debug!(
            fixations = fixations.len(),
            runs = runs.len(),
            regressive,
            "merge"
        );

        let fallback = (regressive > 0).then_some(Fallback {
            reason: FallbackReason::RegressiveRuns,
            affected: regressive,
        });
        Ok(Assignment { lines, fallback })
    }
}
