//! Numeric helpers shared by the correction algorithms.
//!
//! Provides:
//! - Point distance
//! - Mean and median over f64 slices
//! - Consecutive differences and run splitting
//! - One-dimensional Lloyd (k-means) iteration

use std::ops::Range;

use itertools::Itertools;
use ordered_float::OrderedFloat;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Arithmetic mean, or None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, or None for an empty slice. Even lengths average the middle pair.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted: Vec<OrderedFloat<f64>> =
        values.iter().copied().map(OrderedFloat).sorted().collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid].0)
    } else {
        Some((sorted[mid - 1].0 + sorted[mid].0) / 2.0)
    }
}

/// Signed differences `values[i + 1] - values[i]`.
pub fn diffs(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values
        .into_iter()
        .tuple_windows()
        .map(|(a, b)| b - a)
        .collect()
}

/// Splits `0..n` into contiguous ranges, starting a new range at every index
/// in `starts`. `starts` must be ascending and lie in `1..n`.
pub fn split_at_starts(n: usize, starts: &[usize]) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    std::iter::once(0)
        .chain(starts.iter().copied())
        .chain(std::iter::once(n))
        .tuple_windows()
        .map(|(start, end)| start..end)
        .collect()
}

/// Index of the smallest value; the earliest index wins ties.
pub fn argmin(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v >= b || v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Outcome of one-dimensional Lloyd iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Lloyd1d {
    /// Cluster index per input value.
    pub labels: Vec<usize>,
    /// Final centroid per cluster. Empty clusters keep their last centroid.
    pub centroids: Vec<f64>,
    /// Number of member values per cluster.
    pub sizes: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
}

/// Runs Lloyd's k-means on scalar values from the given starting centroids.
///
/// Each value joins the nearest centroid (earliest centroid on ties). With
/// ascending starting centroids the clusters stay ordered along the axis.
pub fn lloyd_1d(values: &[f64], initial: &[f64], max_iterations: usize) -> Lloyd1d {
    let k = initial.len();
    let mut centroids = initial.to_vec();
    let mut labels = vec![usize::MAX; values.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let mut changed = false;
        for (label, &v) in labels.iter_mut().zip(values) {
            let nearest = argmin(centroids.iter().map(|c| (v - c).abs())).unwrap_or(0);
            if *label != nearest {
                *label = nearest;
                changed = true;
            }
        }
        if !changed {
            converged = true;
            break;
        }

        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (&label, &v) in labels.iter().zip(values) {
            sums[label] += v;
            counts[label] += 1;
        }
        for ((c, sum), count) in centroids.iter_mut().zip(sums).zip(&counts) {
            if *count > 0 {
                *c = sum / *count as f64;
            }
        }
    }

    let mut sizes = vec![0usize; k];
    for &label in &labels {
        if label < k {
            sizes[label] += 1;
        }
    }

    Lloyd1d {
        labels,
        centroids,
        sizes,
        iterations,
        converged,
    }
}
