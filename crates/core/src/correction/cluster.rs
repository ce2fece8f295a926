//! Cluster method.
//!
//! Partitions fixation y-values into one cluster per line with 1-D k-means,
//! seeded with the line positions so cluster order follows line order. The
//! non-empty clusters are then matched to lines by an order-preserving
//! assignment that puts each cluster on its nearest unclaimed line.

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::ClusterParams;
use crate::utils::lloyd_1d;

use super::{Assignment, FallbackReason, LineAssigner};

/// A non-empty cluster, in axis order.
#[derive(Debug, Clone, Copy)]
struct Cluster {
    centroid: f64,
    size: usize,
}

/// Matches ordered clusters to ordered lines, one cluster per line at most,
/// minimising the total displacement of their members.
///
/// Requires `clusters.len() <= lines.len()`. Equal costs resolve towards the
/// upper line.
fn match_clusters(clusters: &[Cluster], lines: &[f64]) -> Vec<usize> {
    let c = clusters.len();
    let m = lines.len();
    let cost = |a: usize, b: usize| {
        let cluster = clusters[a];
        cluster.size as f64 * (cluster.centroid - lines[b]).abs()
    };

    // table[a * (m + 1) + b]: best cost placing the first a clusters on the first b lines.
    let width = m + 1;
    let mut table = vec![f64::INFINITY; (c + 1) * width];
    table[..width].fill(0.0);
    for a in 1..=c {
        for b in a..=m {
            let skip = table[a * width + b - 1];
            let take = table[(a - 1) * width + b - 1] + cost(a - 1, b - 1);
            table[a * width + b] = skip.min(take);
        }
    }

    let mut mapping = vec![0; c];
    let (mut a, mut b) = (c, m);
    while a > 0 {
        let skip = table[a * width + b - 1];
        let take = table[(a - 1) * width + b - 1] + cost(a - 1, b - 1);
        if b > a && skip <= take {
            b -= 1;
        } else {
            mapping[a - 1] = b - 1;
            a -= 1;
            b -= 1;
        }
    }
    mapping
}

impl LineAssigner for ClusterParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let ys: Vec<f64> = fixations.iter().map(|f| f.y).collect();
        let fit = lloyd_1d(&ys, geometry.lines(), self.max_iterations);
        if !fit.converged {
            return Ok(Assignment::nearest(
                fixations,
                geometry,
                FallbackReason::ClusterNotConverged {
                    iterations: fit.iterations,
                },
            ));
        }

        let occupied: Vec<usize> = (0..fit.sizes.len()).filter(|&k| fit.sizes[k] > 0).collect();
        let clusters: Vec<Cluster> = occupied
            .iter()
            .map(|&k| Cluster {
                centroid: fit.centroids[k],
                size: fit.sizes[k],
            })
            .collect();
        let matched = match_clusters(&clusters, geometry.lines());

        let mut line_of_cluster = vec![0; fit.sizes.len()];
        for (&k, &line) in occupied.iter().zip(&matched) {
            line_of_cluster[k] = line;
        }
        tracing::debug!(
            fixations = fixations.len(),
            clusters = clusters.len(),
            iterations = fit.iterations,
            "cluster"
        );

        Ok(Assignment::exact(
            fit.labels.iter().map(|&k| line_of_cluster[k]).collect(),
        ))
    }
}
