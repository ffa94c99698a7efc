//! Single-number risk measurements.

use serde::{Deserialize, Serialize};

/// A contest-level p-value with the stop decision it implies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMeasurement {
    pub p_value: f64,
    pub stop: bool,
}

impl RiskMeasurement {
    /// The measurement used when the computation cannot proceed: full risk, keep auditing.
    pub const MAXIMAL: Self = Self {
        p_value: 1.0,
        stop: false,
    };

    pub fn new(p_value: f64, stop: bool) -> Self {
        Self { p_value, stop }
    }
}
