//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for the audit engine.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AuditError {
    #[error("invalid risk limit {value}: expected {expected}")]
    InvalidRiskLimit { value: f64, expected: &'static str },

    #[error("batch comparison requires batch-level reported results")]
    MissingBatchResults,

    #[error("degenerate contest `{contest}`: {reason}")]
    DegenerateContest { contest: String, reason: String },

    #[error("arithmetic domain error: {0}")]
    ArithmeticDomain(String),
}

impl AuditError {
    pub fn degenerate(contest: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateContest {
            contest: contest.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error marks a computation that left its mathematical domain.
    pub fn is_arithmetic_domain(&self) -> bool {
        matches!(self, Self::ArithmeticDomain(_))
    }
}
