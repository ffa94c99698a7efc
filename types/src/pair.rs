//! Winner/loser pairs, the unit BRAVO tests against.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reported winner paired with one reported loser.
///
/// `loser` is `None` for uncontested contests, which have no loser to test against.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidatePair {
    pub winner: String,
    pub loser: Option<String>,
}

impl CandidatePair {
    pub fn new(winner: impl Into<String>, loser: impl Into<String>) -> Self {
        Self {
            winner: winner.into(),
            loser: Some(loser.into()),
        }
    }

    pub fn uncontested(winner: impl Into<String>) -> Self {
        Self {
            winner: winner.into(),
            loser: None,
        }
    }
}

impl fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loser {
            Some(loser) => write!(f, "{} vs {}", self.winner, loser),
            None => write!(f, "{} (uncontested)", self.winner),
        }
    }
}
