//! Dynamic time warping over 2D point series.
//!
//! Used by word-level warp alignment and by `tools::sequence_distance`.

use crate::utils::{Point, argmin, distance};

/// Result of aligning series `a` to series `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Warping {
    /// Total Euclidean cost of the optimal alignment.
    pub cost: f64,
    /// For each point of `a`, the ascending indices of `b` matched to it.
    pub path: Vec<Vec<usize>>,
}

/// Classic DTW with unit steps (diagonal, down, right).
///
/// Two empty series align at zero cost. If exactly one is empty the cost is
/// infinite and every path entry is empty. Ties during backtracking prefer
/// the diagonal step, then the step that consumes `a`.
pub fn dynamic_time_warping(a: &[Point], b: &[Point]) -> Warping {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        let cost = if n == m { 0.0 } else { f64::INFINITY };
        return Warping {
            cost,
            path: vec![Vec::new(); n],
        };
    }

    // (n + 1) x (m + 1) table with an infinite border except the origin.
    let width = m + 1;
    let mut cost = vec![f64::INFINITY; (n + 1) * width];
    cost[0] = 0.0;
    for i in 1..=n {
        for j in 1..=m {
            let best = cost[(i - 1) * width + j - 1]
                .min(cost[(i - 1) * width + j])
                .min(cost[i * width + j - 1]);
            cost[i * width + j] = distance(a[i - 1], b[j - 1]) + best;
        }
    }

    let mut path = vec![Vec::new(); n];
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        path[i - 1].push(j - 1);
        let moves = [
            cost[(i - 1) * width + j - 1],
            cost[(i - 1) * width + j],
            cost[i * width + j - 1],
        ];
        match argmin(moves) {
            Some(0) => {
                i -= 1;
                j -= 1;
            }
            Some(1) => i -= 1,
            _ => j -= 1,
        }
    }
    for matched in &mut path {
        matched.reverse();
    }

    Warping {
        cost: cost[n * width + m],
        path,
    }
}
