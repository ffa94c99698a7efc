//! The closed set of audit methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMethod {
    /// BRAVO over individual paper ballots.
    BallotPolling,
    /// MACRO over batches sampled proportional to their error bound.
    BatchComparison,
    /// SUPERSIMPLE over ballots compared with their cast vote records.
    BallotComparison,
}

impl AuditMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BallotPolling => "ballot_polling",
            Self::BatchComparison => "batch_comparison",
            Self::BallotComparison => "ballot_comparison",
        }
    }
}

impl fmt::Display for AuditMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditMethod {
    type Err = String;

    /// Accepts the snake_case name or the name of the underlying method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "ballot_polling" | "bravo" => Ok(Self::BallotPolling),
            "batch_comparison" | "macro" => Ok(Self::BatchComparison),
            "ballot_comparison" | "supersimple" => Ok(Self::BallotComparison),
            other => Err(format!("unknown audit method `{other}`")),
        }
    }
}
