//! Per-contest margin records produced by the margin calculator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Margin data for one reported winner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinnerMargin {
    /// Votes over ballots cast.
    pub p_w: f64,
    /// Votes over total candidate votes.
    pub s_w: f64,
    /// Loser name to `s_w / (s_w + s_l)`.
    pub swl: BTreeMap<String, f64>,
}

/// Margin data for one reported loser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoserMargin {
    pub p_l: f64,
    pub s_l: f64,
}

/// Winners and losers of one contest with their vote shares.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub winners: BTreeMap<String, WinnerMargin>,
    pub losers: BTreeMap<String, LoserMargin>,
}

impl Margins {
    pub fn is_uncontested(&self) -> bool {
        self.losers.is_empty()
    }

    /// Smallest `p_w` among the winners, with its candidate name.
    pub fn weakest_winner(&self) -> Option<(&str, &WinnerMargin)> {
        self.winners
            .iter()
            .min_by(|a, b| a.1.p_w.total_cmp(&b.1.p_w))
            .map(|(n, m)| (n.as_str(), m))
    }

    /// Largest `p_l` among the losers, with its candidate name.
    pub fn strongest_loser(&self) -> Option<(&str, &LoserMargin)> {
        self.losers
            .iter()
            .max_by(|a, b| a.1.p_l.total_cmp(&b.1.p_l))
            .map(|(n, m)| (n.as_str(), m))
    }
}
