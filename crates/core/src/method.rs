//! Correction method names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DriftError;

/// The seven drift correction methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Chain nearby consecutive fixations, snap each chain to its nearest line.
    Chain,
    /// One-dimensional k-means on y with one cluster per line.
    Cluster,
    /// Merge vertically close fixations into runs, assign runs monotonically.
    Merge,
    /// Remove a linear drift trend over time, then snap.
    Regress,
    /// Cut at downward jumps, assign segments to lines in order.
    Segment,
    /// Cut at return sweeps, assign segments to lines in order.
    Split,
    /// Dynamic-programming alignment with non-decreasing line assignment.
    #[default]
    Warp,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Chain,
        Method::Cluster,
        Method::Merge,
        Method::Regress,
        Method::Segment,
        Method::Split,
        Method::Warp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Chain => "chain",
            Method::Cluster => "cluster",
            Method::Merge => "merge",
            Method::Regress => "regress",
            Method::Segment => "segment",
            Method::Split => "split",
            Method::Warp => "warp",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| DriftError::InvalidMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_name() {
        for m in Method::ALL {
            assert_eq!(m.as_str().parse::<Method>().unwrap(), m);
            assert_eq!(m.to_string().to_uppercase().parse::<Method>().unwrap(), m);
        }
        assert_eq!(" warp ".parse::<Method>().unwrap(), Method::Warp);
    }

    #[test]
    fn unknown_name_fails() {
        assert_eq!(
            "slice".parse::<Method>(),
            Err(DriftError::InvalidMethod("slice".to_string()))
        );
        assert!("".parse::<Method>().is_err());
    }
}
