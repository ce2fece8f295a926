//! Nearest-line snapping: the fallback shared by every method.

use crate::fixation::Fixation;
use crate::geometry::LineGeometry;

/// Nearest line index for each fixation's raw y.
pub fn nearest_lines(fixations: &[Fixation], geometry: &LineGeometry) -> Vec<usize> {
    fixations.iter().map(|f| geometry.nearest_line(f.y)).collect()
}

/// Nearest line to the mean y of a group of fixations.
pub(crate) fn nearest_to_mean(fixations: &[Fixation], geometry: &LineGeometry) -> usize {
    let ys: Vec<f64> = fixations.iter().map(|f| f.y).collect();
    crate::utils::mean(&ys).map_or(0, |y| geometry.nearest_line(y))
}

/// True when a vertical step `dy` separates two fixations: it exceeds
/// `y_thresh`, or spans at least `min_spacing` so the two may sit on
/// different lines.
pub(crate) fn breaks_vertically(dy: f64, y_thresh: f64, min_spacing: f64) -> bool {
    let dy = dy.abs();
    dy > y_thresh || dy >= min_spacing
}
