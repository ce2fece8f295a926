//! Drift correction engine.
//!
//! This module contains:
//! - The `LineAssigner` capability implemented by every method
//! - The seven methods (chain, cluster, merge, regress, segment, split, warp)
//! - The `correct` dispatcher and the name-based `snap_to_lines` entry point
//! - Result and fallback reporting types

pub mod chain;
pub mod cluster;
pub mod merge;
pub mod regress;
pub mod segment;
pub mod snap;
pub mod split;
pub mod warp;

use std::fmt;

use crate::error::Result;
use crate::fixation::{Fixation, FixationSequence};
use crate::geometry::LineGeometry;
use crate::method::Method;
use crate::params::{MethodParams, Strategy};

/// Why a method degraded to nearest-line snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Some fixation had a NaN or infinite coordinate.
    NonFiniteCoordinates,
    /// Fixations lay far above or below the text block.
    FarFromText,
    /// k-means did not settle within the iteration cap.
    ClusterNotConverged { iterations: usize },
    /// Too few non-outlier fixations remained to fit a drift trend.
    InsufficientInliers { inliers: usize },
    /// The detected segment count was too far from the line count.
    SegmentCountMismatch { detected: usize, expected: usize },
    /// Runs that moved back above the current line were snapped directly.
    RegressiveRuns,
    /// The method produced an assignment of the wrong shape.
    InvalidAssignment,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NonFiniteCoordinates => f.write_str("non-finite fixation coordinates"),
            FallbackReason::FarFromText => f.write_str("fixations far outside the text block"),
            FallbackReason::ClusterNotConverged { iterations } => {
                write!(f, "clustering did not converge after {iterations} iterations")
            }
            FallbackReason::InsufficientInliers { inliers } => {
                write!(f, "only {inliers} inliers available for the drift fit")
            }
            FallbackReason::SegmentCountMismatch { detected, expected } => {
                write!(f, "detected {detected} segments for {expected} lines")
            }
            FallbackReason::RegressiveRuns => f.write_str("regressive runs snapped to nearest line"),
            FallbackReason::InvalidAssignment => f.write_str("method returned an invalid assignment"),
        }
    }
}

/// Record of nearest-line fallback use on one correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    pub reason: FallbackReason,
    /// Number of fixations placed by the fallback rather than the method.
    pub affected: usize,
}

/// Line index per fixation, as produced by a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub lines: Vec<usize>,
    pub fallback: Option<Fallback>,
}

impl Assignment {
    pub fn exact(lines: Vec<usize>) -> Self {
        Self {
            lines,
            fallback: None,
        }
    }

    /// Every fixation snapped to its nearest line, recorded as a fallback.
    pub fn nearest(fixations: &[Fixation], geometry: &LineGeometry, reason: FallbackReason) -> Self {
        Self {
            lines: snap::nearest_lines(fixations, geometry),
            fallback: Some(Fallback {
                reason,
                affected: fixations.len(),
            }),
        }
    }
}

/// Fixations farther than this many median line spacings above the first
/// line or below the last are snapped to their nearest line and kept out of
/// the method.
pub const FAR_FROM_TEXT_SPACINGS: f64 = 1.0;

/// Capability shared by every correction method: assign each fixation to a
/// line index.
///
/// Implementations may assume at least one fixation, at least two lines and
/// finite coordinates. The dispatcher handles the degenerate cases.
pub trait LineAssigner {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment>;
}

impl LineAssigner for Strategy {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        match self {
            Strategy::Chain(p) => p.assign(fixations, geometry),
            Strategy::Cluster(p) => p.assign(fixations, geometry),
            Strategy::Merge(p) => p.assign(fixations, geometry),
            Strategy::Regress(p) => p.assign(fixations, geometry),
            Strategy::Segment(p) => p.assign(fixations, geometry),
            Strategy::Split(p) => p.assign(fixations, geometry),
            Strategy::Warp(p) => p.assign(fixations, geometry),
        }
    }
}

/// A corrected fixation sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    /// Same length and order as the input. Every y is a line y.
    pub fixations: FixationSequence,
    /// Line index assigned to each fixation.
    pub line_indices: Vec<usize>,
    pub method: Method,
    pub fallback: Option<Fallback>,
}

impl CorrectionResult {
    /// True when any fixation was placed by the nearest-line fallback.
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Corrects vertical drift in `fixations` using `strategy`.
///
/// Returns a new sequence of identical length and order where every y is
/// snapped to one of the geometry's lines and x and duration are copied
/// unchanged. Fails only on invalid parameters or, for warp, when the DP
/// table would exceed its cell cap.
pub fn correct(
    fixations: &FixationSequence,
    geometry: &LineGeometry,
    strategy: &Strategy,
) -> Result<CorrectionResult> {
    strategy.validate()?;
    let method = strategy.method();
    let input = fixations.as_slice();
    let n = input.len();

    let assignment = if n == 0 {
        Assignment::exact(Vec::new())
    } else if geometry.len() == 1 {
        Assignment::exact(vec![0; n])
    } else if input.iter().any(|f| !f.is_finite()) {
        Assignment::nearest(input, geometry, FallbackReason::NonFiniteCoordinates)
    } else {
        assign_near_text(strategy, input, geometry)?
    };

    let assignment = if is_valid(&assignment, n, geometry.len()) {
        assignment
    } else {
        Assignment::nearest(input, geometry, FallbackReason::InvalidAssignment)
    };

    if let Some(fallback) = &assignment.fallback {
        tracing::warn!(
            method = %method,
            reason = %fallback.reason,
            affected = fallback.affected,
            fixations = n,
            "drift correction fell back to nearest-line snapping"
        );
    }

    let corrected = input
        .iter()
        .zip(&assignment.lines)
        .map(|(f, &line)| f.with_y(geometry.line_y(line)))
        .collect();

    Ok(CorrectionResult {
        fixations: corrected,
        line_indices: assignment.lines,
        method,
        fallback: assignment.fallback,
    })
}

/// Runs `strategy` on the fixations near the text block and snaps the rest to
/// their nearest line.
///
/// The far fixations are reported as a fallback. When the method itself also
/// fell back, its reason is kept and the affected counts are added.
fn assign_near_text(
    strategy: &Strategy,
    input: &[Fixation],
    geometry: &LineGeometry,
) -> Result<Assignment> {
    let margin = FAR_FROM_TEXT_SPACINGS * geometry.median_spacing();
    let top = geometry.line_y(0) - margin;
    let bottom = geometry.line_y(geometry.len() - 1) + margin;
    let far: Vec<bool> = input.iter().map(|f| f.y < top || f.y > bottom).collect();

    let far_count = far.iter().filter(|&&is_far| is_far).count();
    if far_count == 0 {
        return strategy.assign(input, geometry);
    }
    if far_count == input.len() {
        return Ok(Assignment::nearest(input, geometry, FallbackReason::FarFromText));
    }

    let near: Vec<Fixation> = input
        .iter()
        .zip(&far)
        .filter(|(_, is_far)| !**is_far)
        .map(|(f, _)| *f)
        .collect();
    let inner = strategy.assign(&near, geometry)?;
    if !is_valid(&inner, near.len(), geometry.len()) {
        return Ok(Assignment::nearest(input, geometry, FallbackReason::InvalidAssignment));
    }
    tracing::debug!(far = far_count, near = near.len(), "fixations far from text");

    let mut near_lines = inner.lines.into_iter();
    let lines = input
        .iter()
        .zip(&far)
        .map(|(f, &is_far)| {
            if is_far {
                geometry.nearest_line(f.y)
            } else {
                near_lines.next().unwrap_or(0)
            }
        })
        .collect();
    let fallback = match inner.fallback {
        Some(Fallback { reason, affected }) => Fallback {
            reason,
            affected: affected + far_count,
        },
        None => Fallback {
            reason: FallbackReason::FarFromText,
            affected: far_count,
        },
    };
    Ok(Assignment {
        lines,
        fallback: Some(fallback),
    })
}

fn is_valid(assignment: &Assignment, n: usize, m: usize) -> bool {
    assignment.lines.len() == n && assignment.lines.iter().all(|&line| line < m)
}

/// Name-based entry point: builds the geometry from raw line positions and
/// parses the method name before dispatching.
///
/// # Errors
/// `InvalidGeometry` for an empty or non-increasing line list,
/// `InvalidMethod` for an unknown name, plus anything `correct` returns.
pub fn snap_to_lines(
    fixations: &FixationSequence,
    line_ys: &[f64],
    method: &str,
    params: &MethodParams,
) -> Result<CorrectionResult> {
    let geometry = LineGeometry::new(line_ys.to_vec())?;
    let method: Method = method.parse()?;
    correct(fixations, &geometry, &params.strategy(method))
}
