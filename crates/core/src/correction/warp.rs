//! Warp method.
//!
//! Treats correction as sequence alignment. Fixation `i` is assigned to line
//! `j` so that the total vertical displacement is minimal, subject to line
//! indices never decreasing between consecutive fixations and advancing by
//! at most one line per fixation:
//!
//! ```text
//! cost[i][j] = |y_i - line_j| + min(cost[i-1][j], cost[i-1][j-1], regress)
//! regress    = min(cost[i-1][k] for k > j) + regression_cost * spacing
//! ```
//!
//! The regression term admits deliberate regressions at bounded cost; an
//! infinite `regression_cost` removes it. The table is a flat n × m arena.
//! The path is recovered by replaying the predecessor choice from the cost
//! table, with ties resolved as stay, then advance, then the uppermost
//! regression target.
//!
//! With `align_words` set and word centres available, fixations are instead
//! aligned to the word sequence by dynamic time warping and take the most
//! common line among their matched words.

use crate::dtw::dynamic_time_warping;
use crate::error::{DriftError, Result};
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::WarpParams;
use crate::utils::{Point, argmin};

use super::{Assignment, LineAssigner};

fn check_size(rows: usize, cols: usize, limit: usize) -> Result<()> {
    let cells = rows.saturating_mul(cols);
    if cells > limit {
        return Err(DriftError::InputTooLarge { cells, limit });
    }
    Ok(())
}

/// Best regression predecessor strictly below each line: `(cost, line)`.
fn regression_candidates(prev: &[f64]) -> Vec<(f64, usize)> {
    let m = prev.len();
    let mut below = vec![(f64::INFINITY, usize::MAX); m];
    for j in (0..m.saturating_sub(1)).rev() {
        let next = below[j + 1];
        below[j] = if prev[j + 1] <= next.0 {
            (prev[j + 1], j + 1)
        } else {
            next
        };
    }
    below
}

/// Cheapest way into line `j` from the previous row: `(cost, line)`.
fn predecessor(prev: &[f64], below: &[(f64, usize)], j: usize, penalty: f64) -> (f64, usize) {
    let mut best = (prev[j], j);
    if j > 0 && prev[j - 1] < best.0 {
        best = (prev[j - 1], j - 1);
    }
    let (cost, line) = below[j];
    if cost + penalty < best.0 {
        best = (cost + penalty, line);
    }
    best
}

/// Monotone-preferring line alignment by dynamic programming.
fn align_to_lines(fixations: &[Fixation], lines: &[f64], penalty: f64) -> Vec<usize> {
    let n = fixations.len();
    let m = lines.len();
    let mut cost = vec![0.0; n * m];

    for (j, &line) in lines.iter().enumerate() {
        cost[j] = (fixations[0].y - line).abs();
    }
    for i in 1..n {
        let (done, rest) = cost.split_at_mut(i * m);
        let prev = &done[(i - 1) * m..];
        let below = regression_candidates(prev);
        for (j, &line) in lines.iter().enumerate() {
            let (step, _) = predecessor(prev, &below, j, penalty);
            rest[j] = (fixations[i].y - line).abs() + step;
        }
    }

    let mut path = vec![0; n];
    let mut j = argmin(cost[(n - 1) * m..].iter().copied()).unwrap_or(0);
    path[n - 1] = j;
    for i in (1..n).rev() {
        let prev = &cost[(i - 1) * m..i * m];
        let below = regression_candidates(prev);
        j = predecessor(prev, &below, j, penalty).1;
        path[i - 1] = j;
    }
    path
}

/// Word-level alignment: DTW against word centres, then the modal line of
/// the words each fixation matched.
fn align_to_words(fixations: &[Fixation], geometry: &LineGeometry) -> Vec<usize> {
    let points: Vec<Point> = fixations.iter().map(Fixation::xy).collect();
    let words: Vec<Point> = geometry.words().iter().map(|w| (w.x, w.y)).collect();
    let warping = dynamic_time_warping(&points, &words);

    let mut votes = vec![0usize; geometry.len()];
    warping
        .path
        .iter()
        .zip(fixations)
        .map(|(matched, f)| {
            if matched.is_empty() {
                return geometry.nearest_line(f.y);
            }
            votes.fill(0);
            for &w in matched {
                votes[geometry.words()[w].line] += 1;
            }
            // Earliest (uppermost) line wins ties.
            let top = votes.iter().copied().max().unwrap_or(0);
            votes.iter().position(|&v| v == top).unwrap_or(0)
        })
        .collect()
}

impl LineAssigner for WarpParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        if self.align_words && geometry.has_words() {
            check_size(fixations.len() + 1, geometry.words().len() + 1, self.max_cells)?;
            tracing::debug!(
                fixations = fixations.len(),
                words = geometry.words().len(),
                "warp (word alignment)"
            );
            return Ok(Assignment::exact(align_to_words(fixations, geometry)));
        }

        check_size(fixations.len(), geometry.len(), self.max_cells)?;
        let penalty = self.regression_cost * geometry.median_spacing();
        tracing::debug!(
            fixations = fixations.len(),
            lines = geometry.len(),
            penalty,
            "warp"
        );
        Ok(Assignment::exact(align_to_lines(
            fixations,
            geometry.lines(),
            penalty,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::WordCenter;

    fn at(ys: &[f64]) -> Vec<Fixation> {
        ys.iter()
            .enumerate()
            .map(|(i, &y)| Fixation::new(i as f64 * 60.0, y, 200))
            .collect()
    }

    #[test]
    fn hand_computed_monotone_path() {
        // Nearest-line snapping would give [0, 2, 0, 2]. The cheapest
        // monotone path that advances one line at a time is [0, 1, 1, 2]
        // with cost 20 + 60 + 60 + 10 = 150.
        let f = at(&[120.0, 260.0, 140.0, 290.0]);
        let path = align_to_lines(&f, &[100.0, 200.0, 300.0], f64::INFINITY);
        assert_eq!(path, vec![0, 1, 1, 2]);
    }

    #[test]
    fn cheap_regression_is_taken() {
        let f = at(&[100.0, 200.0, 300.0, 100.0, 100.0, 200.0, 300.0]);
        let lines = [100.0, 200.0, 300.0];
        assert_eq!(align_to_lines(&f, &lines, 50.0), vec![0, 1, 2, 0, 0, 1, 2]);
        // Forbidding regressions settles on the middle line for the
        // re-read (cost 300; [0, 0, 0, 0, 0, 1, 2] ties and loses to staying).
        assert_eq!(
            align_to_lines(&f, &lines, f64::INFINITY),
            vec![0, 1, 1, 1, 1, 1, 2]
        );
    }

    #[test]
    fn path_may_start_below_the_first_line() {
        let f = at(&[305.0, 298.0]);
        assert_eq!(align_to_lines(&f, &[100.0, 200.0, 300.0], 200.0), vec![2, 2]);
    }

    #[test]
    fn regression_candidates_pick_uppermost_minimum() {
        let below = regression_candidates(&[5.0, 3.0, 1.0, 1.0]);
        assert_eq!(below[0], (1.0, 2));
        assert_eq!(below[2], (1.0, 3));
        assert_eq!(below[3].1, usize::MAX);
    }

    #[test]
    fn oversized_table_is_rejected() {
        let g = LineGeometry::new(vec![100.0, 200.0, 300.0]).unwrap();
        let f = at(&[100.0; 10]);
        let p = WarpParams {
            max_cells: 29,
            ..Default::default()
        };
        assert_eq!(
            p.assign(&f, &g),
            Err(DriftError::InputTooLarge {
                cells: 30,
                limit: 29
            })
        );
    }

    #[test]
    fn word_alignment_uses_modal_line() {
        let words = vec![
            WordCenter {
                x: 100.0,
                y: 100.0,
                line: 0,
            },
            WordCenter {
                x: 300.0,
                y: 100.0,
                line: 0,
            },
            WordCenter {
                x: 100.0,
                y: 200.0,
                line: 1,
            },
            WordCenter {
                x: 300.0,
                y: 200.0,
                line: 1,
            },
        ];
        let g = LineGeometry::with_words(vec![100.0, 200.0], words).unwrap();
        // Second-line fixations drift up to 160, nearer line 0 by y alone.
        let f = vec![
            Fixation::new(105.0, 110.0, 200),
            Fixation::new(295.0, 120.0, 200),
            Fixation::new(110.0, 145.0, 200),
            Fixation::new(290.0, 160.0, 200),
        ];
        let p = WarpParams {
            align_words: true,
            ..Default::default()
        };
        assert_eq!(p.assign(&f, &g).unwrap().lines, vec![0, 0, 1, 1]);
    }
}
