//! Chain method.
//!
//! Consecutive fixations that stay within `x_thresh` horizontally and
//! `y_thresh` vertically of their predecessor form a chain. A return sweep or
//! a vertical jump breaks the chain, and so does any vertical jump of at least
//! the smallest line spacing, so fixations already on different lines never
//! share a chain. Each chain is snapped, as a unit, to the line nearest its
//! mean y.

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::ChainParams;
use crate::utils::split_at_starts;

use super::snap::{breaks_vertically, nearest_to_mean};
use super::{Assignment, LineAssigner};

/// Indices at which a new chain starts.
fn chain_starts(fixations: &[Fixation], params: &ChainParams, min_spacing: f64) -> Vec<usize> {
    fixations
        .windows(2)
        .enumerate()
        .filter(|(_, w)| {
            (w[1].x - w[0].x).abs() > params.x_thresh
                || breaks_vertically(w[1].y - w[0].y, params.y_thresh, min_spacing)
        })
        .map(|(i, _)| i + 1)
        .collect()
}

impl LineAssigner for ChainParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let starts = chain_starts(fixations, self, geometry.min_spacing());
        let chains = split_at_starts(fixations.len(), &starts);
        tracing::debug!(fixations = fixations.len(), chains = chains.len(), "chain");

        let mut lines = Vec::with_capacity(fixations.len());
        for chain in chains {
            let line = nearest_to_mean(&fixations[chain.clone()], geometry);
            lines.extend(std::iter::repeat_n(line, chain.len()));
        }
        Ok(Assignment::exact(lines))
    }
}
