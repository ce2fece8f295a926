//! Fixation types: Fixation and FixationSequence.
//!
//! A sequence is kept in temporal order and is never reordered or resized by
//! the correction engine. Corrections produce a new sequence.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A single gaze fixation.
///
/// Identity is positional: a fixation is only meaningful as an element of a
/// [`FixationSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    pub x: f64,
    pub y: f64,
    /// Duration in milliseconds. Expected to be positive.
    pub duration: u32,
}

impl Fixation {
    pub const fn new(x: f64, y: f64, duration: u32) -> Self {
        Self { x, y, duration }
    }

    /// Returns a copy with only the y-coordinate replaced.
    pub const fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub const fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64, u32)> for Fixation {
    fn from((x, y, duration): (f64, f64, u32)) -> Self {
        Self::new(x, y, duration)
    }
}

/// Temporally ordered collection of fixations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixationSequence {
    fixations: Vec<Fixation>,
}

impl FixationSequence {
    pub fn new(fixations: Vec<Fixation>) -> Self {
        Self { fixations }
    }

    pub fn len(&self) -> usize {
        self.fixations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Fixation> {
        self.fixations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fixation> {
        self.fixations.iter()
    }

    pub fn as_slice(&self) -> &[Fixation] {
        &self.fixations
    }

    /// Returns an owned copy of a contiguous sub-range.
    ///
    /// The range is clamped to the sequence bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self::new(self.fixations[start..end].to_vec())
    }

    /// Sum of all fixation durations.
    pub fn total_duration(&self) -> u64 {
        self.fixations.iter().map(|f| u64::from(f.duration)).sum()
    }

    pub fn into_inner(self) -> Vec<Fixation> {
        self.fixations
    }
}

impl std::ops::Index<usize> for FixationSequence {
    type Output = Fixation;

    fn index(&self, index: usize) -> &Self::Output {
        &self.fixations[index]
    }
}

impl From<Vec<Fixation>> for FixationSequence {
    fn from(fixations: Vec<Fixation>) -> Self {
        Self::new(fixations)
    }
}

impl FromIterator<Fixation> for FixationSequence {
    fn from_iter<I: IntoIterator<Item = Fixation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FixationSequence {
    type Item = &'a Fixation;
    type IntoIter = std::slice::Iter<'a, Fixation>;

    fn into_iter(self) -> Self::IntoIter {
        self.fixations.iter()
    }
}
