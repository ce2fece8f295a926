//! Segment method.
//!
//! A line boundary is hypothesised wherever y jumps down by more than
//! `boundary_ratio` median line spacings between consecutive fixations. The
//! resulting segments are assigned to lines strictly in order (segment k to
//! line k, clipped to the last line), whatever their raw y-values.
//!
//! When the number of segments differs from the number of lines by more than
//! `count_tolerance`, the reading-order assumption is considered broken and
//! every fixation is snapped to its nearest line instead.

use std::ops::Range;

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::SegmentParams;
use crate::utils::split_at_starts;

use super::{Assignment, FallbackReason, LineAssigner};

/// Assigns contiguous segments to lines in reading order.
///
/// Shared by segment and split. `starts` are the indices at which new
/// segments begin.
pub(crate) fn assign_in_order(
    fixations: &[Fixation],
    geometry: &LineGeometry,
    starts: &[usize],
    count_tolerance: usize,
) -> Assignment {
    let segments: Vec<Range<usize>> = split_at_starts(fixations.len(), starts);
    let expected = geometry.len();
    if segments.len().abs_diff(expected) > count_tolerance {
        return Assignment::nearest(
            fixations,
            geometry,
            FallbackReason::SegmentCountMismatch {
                detected: segments.len(),
                expected,
            },
        );
    }

    let mut lines = Vec::with_capacity(fixations.len());
    for (k, segment) in segments.iter().enumerate() {
        lines.extend(std::iter::repeat_n(k.min(expected - 1), segment.len()));
    }
    Assignment::exact(lines)
}

fn boundary_starts(fixations: &[Fixation], threshold: f64) -> Vec<usize> {
    fixations
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1].y - w[0].y > threshold)
        .map(|(i, _)| i + 1)
        .collect()
}

impl LineAssigner for SegmentParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let threshold = self.boundary_ratio * geometry.median_spacing();
        let starts = boundary_starts(fixations, threshold);
        tracing::debug!(
            fixations = fixations.len(),
            segments = starts.len() + 1,
            threshold,
            "segment"
        );
        Ok(assign_in_order(
            fixations,
            geometry,
            &starts,
            self.count_tolerance,
        ))
    }
}
