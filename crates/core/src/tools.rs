//! Procedures built on top of the correction engine.

use rayon::prelude::*;

use crate::correction::{CorrectionResult, correct};
use crate::dtw::dynamic_time_warping;
use crate::error::Result;
use crate::fixation::{Fixation, FixationSequence};
use crate::geometry::LineGeometry;
use crate::params::Strategy;
use crate::utils::{Point, distance};

/// Default distance (px) used by [`discard_out_of_bounds`].
pub const DEFAULT_BOUNDS_THRESHOLD: f64 = 128.0;

/// Dynamic time warping distance between two fixation sequences.
pub fn sequence_distance(a: &FixationSequence, b: &FixationSequence) -> f64 {
    let a: Vec<Point> = a.iter().map(Fixation::xy).collect();
    let b: Vec<Point> = b.iter().map(Fixation::xy).collect();
    dynamic_time_warping(&a, &b).cost
}

/// Returns a copy of `fixations` without those far from the text.
///
/// A fixation is kept when it lies within `threshold` of some word centre.
/// Geometries without words only constrain y: the fixation must lie within
/// `threshold` of some line.
pub fn discard_out_of_bounds(
    fixations: &FixationSequence,
    geometry: &LineGeometry,
    threshold: f64,
) -> FixationSequence {
    let in_bounds = |f: &Fixation| {
        if geometry.has_words() {
            geometry
                .words()
                .iter()
                .any(|w| distance(f.xy(), (w.x, w.y)) <= threshold)
        } else {
            let line = geometry.line_y(geometry.nearest_line(f.y));
            (f.y - line).abs() <= threshold
        }
    };
    let kept: FixationSequence = fixations.iter().copied().filter(in_bounds).collect();
    if kept.len() < fixations.len() {
        tracing::debug!(
            discarded = fixations.len() - kept.len(),
            kept = kept.len(),
            "discarded out-of-bounds fixations"
        );
    }
    kept
}

/// Corrects many trials against the same geometry in parallel.
///
/// Each trial is an independent call to [`correct`]; results come back in
/// input order.
pub fn correct_batch(
    trials: &[FixationSequence],
    geometry: &LineGeometry,
    strategy: &Strategy,
) -> Vec<Result<CorrectionResult>> {
    trials
        .par_iter()
        .map(|trial| correct(trial, geometry, strategy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WordCenter;

    fn seq(points: &[(f64, f64)]) -> FixationSequence {
        points
            .iter()
            .map(|&(x, y)| Fixation::new(x, y, 100))
            .collect()
    }

    #[test]
    fn distance_between_shifted_sequences() {
        let a = seq(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = seq(&[(0.0, 3.0), (10.0, 3.0)]);
        assert_eq!(sequence_distance(&a, &b), 6.0);
        assert_eq!(sequence_distance(&a, &a), 0.0);
        assert!(sequence_distance(&a, &FixationSequence::default()).is_infinite());
    }

    #[test]
    fn discards_by_line_distance_without_words() {
        let g = LineGeometry::new(vec![100.0, 200.0]).unwrap();
        let s = seq(&[(0.0, 90.0), (0.0, 400.0), (0.0, -50.0), (0.0, 320.0)]);
        let kept = discard_out_of_bounds(&s, &g, DEFAULT_BOUNDS_THRESHOLD);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].y, 90.0);
        assert_eq!(kept[1].y, 320.0);
    }

    #[test]
    fn discards_by_word_distance() {
        let words = vec![WordCenter {
            x: 100.0,
            y: 100.0,
            line: 0,
        }];
        let g = LineGeometry::with_words(vec![100.0], words).unwrap();
        let s = seq(&[(150.0, 120.0), (900.0, 100.0)]);
        let kept = discard_out_of_bounds(&s, &g, 64.0);
        assert_eq!(kept.as_slice(), &[Fixation::new(150.0, 120.0, 100)]);
    }
}
