//! Scoring outcomes.
//!
//! A layer that cannot be scored this epoch yields
//! [`Estimate::NotAvailable`] with a [`SkipReason`]. This is an expected
//! condition (early training, short epochs, rank-deficient layers), so it is
//! carried as a value instead of an error that could reach the training loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a layer was skipped for an epoch.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer than two observations were collected.
    #[error("insufficient data: {observations} observation(s), need at least 2")]
    InsufficientData { observations: usize },

    /// Snapshots in one history disagree on feature count, or have no rows.
    #[error("inconsistent snapshot shape: expected {expected} features, got {got}")]
    InconsistentShape { expected: usize, got: usize },

    /// Covariance is rank-deficient by construction (fewer observations than features).
    #[error("degenerate covariance: {observations} observation(s) for {features} feature(s)")]
    DegenerateCovariance { observations: usize, features: usize },

    /// Observations, covariance or eigenvalues contain NaN or infinity.
    #[error("non-finite values in layer output or its spectrum")]
    NonFinite,

    /// Eigen solver did not converge within its iteration cap.
    #[error("eigendecomposition did not converge")]
    DecompositionFailed,

    /// All eigenvalues are zero: the layer output did not vary.
    #[error("zero total variance")]
    ZeroVarianceTotal,
}

/// Result of scoring one layer for one epoch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Estimate {
    /// Saturation score in `[1/F, 1]`.
    Score(f64),
    /// The layer is omitted this epoch.
    NotAvailable(SkipReason),
}

impl Estimate {
    /// The score, if available.
    pub fn score(&self) -> Option<f64> {
        match self {
            Estimate::Score(s) => Some(*s),
            Estimate::NotAvailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Estimate::Score(_))
    }

    /// The skip reason, if not available.
    pub fn reason(&self) -> Option<SkipReason> {
        match self {
            Estimate::Score(_) => None,
            Estimate::NotAvailable(r) => Some(*r),
        }
    }
}

impl From<std::result::Result<f64, SkipReason>> for Estimate {
    fn from(r: std::result::Result<f64, SkipReason>) -> Self {
        match r {
            Ok(s) => Estimate::Score(s),
            Err(reason) => Estimate::NotAvailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_accessors() {
        let ok = Estimate::Score(0.5);
        assert_eq!(ok.score(), Some(0.5));
        assert!(ok.is_available());
        assert_eq!(ok.reason(), None);

        let skipped = Estimate::from(Err(SkipReason::ZeroVarianceTotal));
        assert_eq!(skipped.score(), None);
        assert_eq!(skipped.reason(), Some(SkipReason::ZeroVarianceTotal));
    }

    #[test]
    fn test_skip_reason_serializes_with_tag() {
        let json = serde_json::to_string(&SkipReason::InsufficientData { observations: 1 }).unwrap();
        assert_eq!(json, r#"{"reason":"insufficient_data","observations":1}"#);
    }

    #[test]
    fn test_skip_reason_display() {
        let r = SkipReason::DegenerateCovariance {
            observations: 2,
            features: 8,
        };
        assert_eq!(
            r.to_string(),
            "degenerate covariance: 2 observation(s) for 8 feature(s)"
        );
    }
}
