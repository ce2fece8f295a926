//! Line geometry supplied by the text layout.
//!
//! Holds the ordered line y-coordinates of a text block (top to bottom) and,
//! optionally, the centres of the words on each line.

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, Result};
use crate::utils::median;

/// Centre of a single word, tagged with the line it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordCenter {
    pub x: f64,
    pub y: f64,
    pub line: usize,
}

/// Validated set of candidate line positions.
///
/// Invariants: at least one line, every y finite, strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    lines: Vec<f64>,
    words: Vec<WordCenter>,
}

impl LineGeometry {
    /// Creates a geometry from line y-coordinates alone.
    pub fn new(lines: Vec<f64>) -> Result<Self> {
        Self::with_words(lines, Vec::new())
    }

    /// Creates a geometry with per-word centres for word-level alignment.
    pub fn with_words(lines: Vec<f64>, words: Vec<WordCenter>) -> Result<Self> {
        if lines.is_empty() {
            return Err(DriftError::InvalidGeometry("no lines".to_string()));
        }
        if let Some(i) = lines.iter().position(|y| !y.is_finite()) {
            return Err(DriftError::InvalidGeometry(format!(
                "line {i} has non-finite y {}",
                lines[i]
            )));
        }
        if let Some(i) = lines.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DriftError::InvalidGeometry(format!(
                "lines {i} and {} are not strictly increasing ({} >= {})",
                i + 1,
                lines[i],
                lines[i + 1]
            )));
        }
        for w in &words {
            if w.line >= lines.len() {
                return Err(DriftError::InvalidGeometry(format!(
                    "word at ({}, {}) refers to line {} of {}",
                    w.x,
                    w.y,
                    w.line,
                    lines.len()
                )));
            }
            if !(w.x.is_finite() && w.y.is_finite()) {
                return Err(DriftError::InvalidGeometry(
                    "word centre is not finite".to_string(),
                ));
            }
        }
        Ok(Self { lines, words })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false for a constructed geometry.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[f64] {
        &self.lines
    }

    pub fn line_y(&self, index: usize) -> f64 {
        self.lines[index]
    }

    pub fn words(&self) -> &[WordCenter] {
        &self.words
    }

    pub fn has_words(&self) -> bool {
        !self.words.is_empty()
    }

    /// Index of the line closest to `y`.
    ///
    /// Equal distances resolve to the upper line. NaN maps to the first
    /// line, infinities to the outermost line on their side.
    pub fn nearest_line(&self, y: f64) -> usize {
        let below = self.lines.partition_point(|&l| l < y);
        if below == 0 {
            return 0;
        }
        if below == self.lines.len() {
            return below - 1;
        }
        let upper = below - 1;
        if (y - self.lines[upper]) <= (self.lines[below] - y) {
            upper
        } else {
            below
        }
    }

    /// Index of the line whose y equals `y` exactly, if any.
    pub fn line_index_of(&self, y: f64) -> Option<usize> {
        self.lines.binary_search_by(|l| l.total_cmp(&y)).ok()
    }

    /// Median distance between adjacent lines, or 0.0 for a single line.
    pub fn median_spacing(&self) -> f64 {
        let gaps: Vec<f64> = self.lines.windows(2).map(|w| w[1] - w[0]).collect();
        median(&gaps).unwrap_or(0.0)
    }

    /// Smallest distance between adjacent lines, or 0.0 for a single line.
    pub fn min_spacing(&self) -> f64 {
        self.lines
            .windows(2)
            .map(|w| w[1] - w[0])
            .reduce(f64::min)
            .unwrap_or(0.0)
    }
}

impl<'de> Deserialize<'de> for LineGeometry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lines: Vec<f64>,
            #[serde(default)]
            words: Vec<WordCenter>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::with_words(raw.lines, raw.words).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> LineGeometry {
        LineGeometry::new(vec![500.0, 560.0, 620.0]).unwrap()
    }

    #[test]
    fn rejects_empty_and_unordered() {
        assert!(matches!(
            LineGeometry::new(vec![]),
            Err(DriftError::InvalidGeometry(_))
        ));
        assert!(matches!(
            LineGeometry::new(vec![100.0, 100.0]),
            Err(DriftError::InvalidGeometry(_))
        ));
        assert!(matches!(
            LineGeometry::new(vec![200.0, 100.0]),
            Err(DriftError::InvalidGeometry(_))
        ));
        assert!(matches!(
            LineGeometry::new(vec![100.0, f64::NAN]),
            Err(DriftError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_word_on_missing_line() {
        let words = vec![WordCenter {
            x: 10.0,
            y: 100.0,
            line: 3,
        }];
        assert!(LineGeometry::with_words(vec![100.0, 150.0], words).is_err());
    }

    #[test]
    fn nearest_line_prefers_upper_on_tie() {
        let g = three();
        assert_eq!(g.nearest_line(530.0), 0);
        assert_eq!(g.nearest_line(531.0), 1);
        assert_eq!(g.nearest_line(590.0), 1);
        assert_eq!(g.nearest_line(-1e9), 0);
        assert_eq!(g.nearest_line(10_000.0), 2);
        assert_eq!(g.nearest_line(f64::INFINITY), 2);
        assert_eq!(g.nearest_line(f64::NAN), 0);
    }

    #[test]
    fn spacing_of_uneven_lines() {
        let g = LineGeometry::new(vec![0.0, 10.0, 30.0, 60.0]).unwrap();
        assert_eq!(g.median_spacing(), 20.0);
        assert_eq!(g.min_spacing(), 10.0);
        let single = LineGeometry::new(vec![5.0]).unwrap();
        assert_eq!(single.median_spacing(), 0.0);
        assert_eq!(single.min_spacing(), 0.0);
    }

    #[test]
    fn deserialize_validates() {
        let ok: LineGeometry = serde_json::from_str(r#"{"lines":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_json::from_str::<LineGeometry>(r#"{"lines":[]}"#).is_err());
    }
}
