//! Regress method.
//!
//! Models vertical drift as a linear trend over the course of the trial:
//! `y_i = line(i) + a + b * i`. Starting from nearest-line assignments, the
//! residuals of the inlier fixations are fitted by least squares, every
//! fixation is re-snapped using its drift-corrected y, and the fit is
//! repeated until neither the assignment nor the inlier set changes.
//!
//! Fixations whose residual from the trend exceeds `outlier_ratio` line
//! spacings are left out of the fit. With fewer than two inliers there is no
//! trend to fit and every fixation is snapped to its nearest line.

use crate::error::Result;
use crate::fixation::Fixation;
use crate::geometry::LineGeometry;
use crate::params::RegressParams;

use super::snap::nearest_lines;
use super::{Assignment, FallbackReason, LineAssigner};

/// Linear drift `intercept + slope * index`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Trend {
    intercept: f64,
    slope: f64,
}

impl Trend {
    fn at(&self, index: usize) -> f64 {
        self.slope.mul_add(index as f64, self.intercept)
    }

    /// Ordinary least squares of `residuals` on their indices, restricted to
    /// the selected points. Needs at least two selected points.
    fn fit(residuals: &[f64], selected: &[bool]) -> Self {
        let points: Vec<(f64, f64)> = residuals
            .iter()
            .zip(selected)
            .enumerate()
            .filter(|(_, (_, keep))| **keep)
            .map(|(i, (r, _))| (i as f64, *r))
            .collect();
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for &(x, y) in &points {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Self {
            intercept: mean_y - slope * mean_x,
            slope,
        }
    }
}

impl LineAssigner for RegressParams {
    fn assign(&self, fixations: &[Fixation], geometry: &LineGeometry) -> Result<Assignment> {
        let limit = self.outlier_ratio * geometry.median_spacing();
        let mut lines = nearest_lines(fixations, geometry);
        let mut inliers: Vec<bool> = Vec::new();
        let mut trend = Trend::default();
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let residuals: Vec<f64> = fixations
                .iter()
                .zip(&lines)
                .map(|(f, &line)| f.y - geometry.line_y(line))
                .collect();
            let next_inliers: Vec<bool> = residuals
                .iter()
                .enumerate()
                .map(|(i, r)| (r - trend.at(i)).abs() <= limit)
                .collect();
            let count = next_inliers.iter().filter(|&&keep| keep).count();
            if count < 2 {
                return Ok(Assignment::nearest(
                    fixations,
                    geometry,
                    FallbackReason::InsufficientInliers { inliers: count },
                ));
            }

            trend = Trend::fit(&residuals, &next_inliers);
            let next_lines: Vec<usize> = fixations
                .iter()
                .enumerate()
                .map(|(i, f)| geometry.nearest_line(f.y - trend.at(i)))
                .collect();

            let stable = next_lines == lines && next_inliers == inliers;
            lines = next_lines;
            inliers = next_inliers;
            if stable {
                break;
            }
        }
        tracing::debug!(
            fixations = fixations.len(),
            iterations,
            intercept = trend.intercept,
            slope = trend.slope,
            outliers = inliers.iter().filter(|&&keep| !keep).count(),
            "regress"
        );

        Ok(Assignment::exact(lines))
    }
}
