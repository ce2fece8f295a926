//! linesnap - vertical drift correction for eye-tracking data on multiline text.
//!
//! Given a temporally ordered fixation sequence and the y-positions of the
//! text lines, each method reassigns every fixation to the line the reader
//! most plausibly intended, leaving x, duration and order untouched.
//!
//! ```ignore
//! use linesnap_core::{FixationSequence, LineGeometry, Method, Strategy, correct};
//!
//! let lines = LineGeometry::new(vec![500.0, 560.0, 620.0])?;
//! let result = correct(&fixations, &lines, &Strategy::from_method(Method::Warp))?;
//! ```

pub mod correction;
pub mod dtw;
pub mod error;
pub mod fixation;
pub mod geometry;
pub mod method;
pub mod params;
pub mod tools;
pub mod utils;

pub use correction::{
    Assignment, CorrectionResult, Fallback, FallbackReason, LineAssigner, correct, snap_to_lines,
};
pub use error::{DriftError, Result};
pub use fixation::{Fixation, FixationSequence};
pub use geometry::{LineGeometry, WordCenter};
pub use method::Method;
pub use params::{
    ChainParams, ClusterParams, MergeParams, MethodParams, RegressParams, SegmentParams,
    SplitParams, Strategy, WarpParams,
};
