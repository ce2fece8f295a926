//! Correction parameters.
//!
//! One parameter struct per method, the `MethodParams` aggregate used as the
//! configuration object, and the `Strategy` tagged variant that pairs a
//! method with its parameters.
//!
//! Thresholds that depend on typical line spacing are given as ratios of the
//! median spacing of the geometry being corrected, so one config works for
//! any font size.

use serde::{Deserialize, Deserializer, de};

use crate::error::{DriftError, Result};
use crate::method::Method;

fn positive(name: &'static str, v: f64) -> Result<()> {
    if v.is_nan() || v <= 0.0 {
        return Err(DriftError::InvalidParameter {
            name,
            reason: "must be a positive number",
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, v: f64) -> Result<()> {
    if v.is_nan() || v < 0.0 {
        return Err(DriftError::InvalidParameter {
            name,
            reason: "must be zero or positive",
        });
    }
    Ok(())
}

fn at_least_one(name: &'static str, v: usize) -> Result<()> {
    if v == 0 {
        return Err(DriftError::InvalidParameter {
            name,
            reason: "must be at least 1",
        });
    }
    Ok(())
}

/// Reads a number, or `"inf"`/`"infinity"` (any case) for `f64::INFINITY`,
/// which JSON has no literal for.
fn finite_or_inf<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Name(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(v) => Ok(v),
        Raw::Name(s) if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity") => {
            Ok(f64::INFINITY)
        }
        Raw::Name(s) => Err(de::Error::invalid_value(
            de::Unexpected::Str(&s),
            &"a number or \"inf\"",
        )),
    }
}

/// Parameters for `chain`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChainParams {
    /// Horizontal jump (px) above which a new chain starts.
    pub x_thresh: f64,
    /// Vertical jump (px) above which a new chain starts. A jump of at least
    /// the smallest line spacing always starts one.
    pub y_thresh: f64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            x_thresh: 192.0,
            y_thresh: 32.0,
        }
    }
}

impl ChainParams {
    pub fn validate(&self) -> Result<()> {
        positive("chain.x_thresh", self.x_thresh)?;
        positive("chain.y_thresh", self.y_thresh)
    }
}

/// Parameters for `cluster`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Lloyd iterations allowed before giving up and falling back.
    pub max_iterations: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_iterations: 300,
        }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> Result<()> {
        at_least_one("cluster.max_iterations", self.max_iterations)
    }
}

/// Parameters for `merge`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeParams {
    /// Consecutive fixations closer than this vertically (px) join one run,
    /// unless the step reaches the smallest line spacing.
    pub y_thresh: f64,
    /// A run whose nearest line lies above the current line stays on the
    /// current line if it is within this fraction of the gap between the
    /// current line and the line above it.
    pub hold_ratio: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            y_thresh: 32.0,
            hold_ratio: 0.75,
        }
    }
}

impl MergeParams {
    pub fn validate(&self) -> Result<()> {
        positive("merge.y_thresh", self.y_thresh)?;
        non_negative("merge.hold_ratio", self.hold_ratio)
    }
}

/// Parameters for `regress`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegressParams {
    /// Residuals beyond this fraction of the median line spacing mark a
    /// fixation as an outlier and exclude it from the trend fit.
    pub outlier_ratio: f64,
    /// Maximum number of refits.
    pub max_iterations: usize,
}

impl Default for RegressParams {
    fn default() -> Self {
        Self {
            outlier_ratio: 0.5,
            max_iterations: 20,
        }
    }
}

impl RegressParams {
    pub fn validate(&self) -> Result<()> {
        positive("regress.outlier_ratio", self.outlier_ratio)?;
        at_least_one("regress.max_iterations", self.max_iterations)
    }
}

/// Parameters for `segment`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// A downward jump larger than this fraction of the median line spacing
    /// starts a new segment.
    pub boundary_ratio: f64,
    /// Largest allowed difference between the segment count and the line
    /// count before falling back to nearest-line snapping.
    pub count_tolerance: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            boundary_ratio: 0.5,
            count_tolerance: 1,
        }
    }
}

impl SegmentParams {
    pub fn validate(&self) -> Result<()> {
        positive("segment.boundary_ratio", self.boundary_ratio)
    }
}

/// Parameters for `split`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    /// Leftward jump (px) that counts as a return sweep. None derives the
    /// split adaptively by two-means clustering of the x-displacements.
    pub sweep_x_thresh: Option<f64>,
    /// A sweep that rises by more than this fraction of the median line
    /// spacing is treated as a regression, not a line change.
    pub rise_ratio: f64,
    /// Same meaning as [`SegmentParams::count_tolerance`].
    pub count_tolerance: usize,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            sweep_x_thresh: None,
            rise_ratio: 0.5,
            count_tolerance: 1,
        }
    }
}

impl SplitParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.sweep_x_thresh {
            positive("split.sweep_x_thresh", t)?;
        }
        non_negative("split.rise_ratio", self.rise_ratio)
    }
}

/// Parameters for `warp`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WarpParams {
    /// Cost of moving back to an earlier line, as a multiple of the median
    /// line spacing. `f64::INFINITY` forbids regressions entirely; in JSON
    /// it is spelled `"inf"`.
    #[serde(deserialize_with = "finite_or_inf")]
    pub regression_cost: f64,
    /// Upper bound on DP table cells (fixations × lines, or × words).
    pub max_cells: usize,
    /// Align against word centres instead of lines when the geometry has them.
    pub align_words: bool,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            regression_cost: 2.0,
            max_cells: 4_000_000,
            align_words: false,
        }
    }
}

impl WarpParams {
    pub fn validate(&self) -> Result<()> {
        non_negative("warp.regression_cost", self.regression_cost)?;
        at_least_one("warp.max_cells", self.max_cells)
    }
}

/// Configuration for every method, with documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct MethodParams {
    pub chain: ChainParams,
    pub cluster: ClusterParams,
    pub merge: MergeParams,
    pub regress: RegressParams,
    pub segment: SegmentParams,
    pub split: SplitParams,
    pub warp: WarpParams,
}

impl MethodParams {
    /// Selects the strategy for `method` carrying this config's parameters.
    pub fn strategy(&self, method: Method) -> Strategy {
        match method {
            Method::Chain => Strategy::Chain(self.chain),
            Method::Cluster => Strategy::Cluster(self.cluster),
            Method::Merge => Strategy::Merge(self.merge),
            Method::Regress => Strategy::Regress(self.regress),
            Method::Segment => Strategy::Segment(self.segment),
            Method::Split => Strategy::Split(self.split),
            Method::Warp => Strategy::Warp(self.warp),
        }
    }
}

/// A method together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    Chain(ChainParams),
    Cluster(ClusterParams),
    Merge(MergeParams),
    Regress(RegressParams),
    Segment(SegmentParams),
    Split(SplitParams),
    Warp(WarpParams),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Warp(WarpParams::default())
    }
}

impl Strategy {
    /// The strategy for `method` with default parameters.
    pub fn from_method(method: Method) -> Self {
        MethodParams::default().strategy(method)
    }

    pub fn method(&self) -> Method {
        match self {
            Strategy::Chain(_) => Method::Chain,
            Strategy::Cluster(_) => Method::Cluster,
            Strategy::Merge(_) => Method::Merge,
            Strategy::Regress(_) => Method::Regress,
            Strategy::Segment(_) => Method::Segment,
            Strategy::Split(_) => Method::Split,
            Strategy::Warp(_) => Method::Warp,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Strategy::Chain(p) => p.validate(),
            Strategy::Cluster(p) => p.validate(),
            Strategy::Merge(p) => p.validate(),
            Strategy::Regress(p) => p.validate(),
            Strategy::Segment(p) => p.validate(),
            Strategy::Split(p) => p.validate(),
            Strategy::Warp(p) => p.validate(),
        }
    }
}
