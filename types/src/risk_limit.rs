//! Risk limits as accepted at the two audit boundaries.
//!
//! BRAVO and MACRO take a fraction in (0, 1). SUPERSIMPLE takes an integer
//! percentage in 1..=100. The two are kept as distinct types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// A risk limit expressed as a fraction strictly between 0 and 1.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RiskLimit(f64);

impl RiskLimit {
    pub fn new(value: f64) -> Result<Self, AuditError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(AuditError::InvalidRiskLimit {
                value,
                expected: "a fraction in (0, 1)",
            })
        }
    }

    pub fn alpha(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for RiskLimit {
    type Error = AuditError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskLimit> for f64 {
    fn from(limit: RiskLimit) -> Self {
        limit.0
    }
}

impl fmt::Display for RiskLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A risk limit expressed as an integer percentage in 1..=100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RiskLimitPercent(u32);

impl RiskLimitPercent {
    pub fn new(percent: u32) -> Result<Self, AuditError> {
        if (1..=100).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(AuditError::InvalidRiskLimit {
                value: f64::from(percent),
                expected: "an integer percentage in 1..=100",
            })
        }
    }

    pub fn percent(&self) -> u32 {
        self.0
    }

    pub fn alpha(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl TryFrom<u32> for RiskLimitPercent {
    type Error = AuditError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskLimitPercent> for u32 {
    fn from(limit: RiskLimitPercent) -> Self {
        limit.0
    }
}

impl fmt::Display for RiskLimitPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
