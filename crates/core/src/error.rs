//! Error types for linesnap drift correction.

use thiserror::Error;

/// Primary error type for correction operations.
///
/// Only caller mistakes surface here. Numerical trouble inside an algorithm
/// degrades to the nearest-line fallback and is reported on the result
/// instead (see [`crate::correction::Fallback`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftError {
    #[error("invalid line geometry: {0}")]
    InvalidGeometry(String),

    #[error("unknown correction method: {0:?}")]
    InvalidMethod(String),

    #[error("input too large: {cells} cells exceeds limit of {limit}")]
    InputTooLarge { cells: usize, limit: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}

/// Convenience Result type alias for DriftError.
pub type Result<T> = std::result::Result<T, DriftError>;
