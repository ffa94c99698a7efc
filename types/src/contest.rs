//! Reported contest tallies and the ranked contest view built from them.
//!
//! A tally keeps its candidates in insertion order. That order is the
//! tie-break when ranking, so it survives serialization: candidate keys are
//! read back in document order.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AuditError;

const BALLOTS_KEY: &str = "ballots";
const NUM_WINNERS_KEY: &str = "numWinners";

/// Reported results for a single contest.
///
/// Serialized as one flat object: candidate names map to their votes, with the
/// reserved keys `ballots` and `numWinners` alongside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContestTally {
    candidates: Vec<(String, u64)>,
    /// Total ballots cast in the contest, including undervotes.
    pub ballots: u64,
    pub num_winners: usize,
}

impl ContestTally {
    pub fn new(ballots: u64) -> Self {
        Self {
            candidates: Vec::new(),
            ballots,
            num_winners: 1,
        }
    }

    /// Builder form of [`ContestTally::set_votes`].
    pub fn with_candidate(mut self, name: impl Into<String>, votes: u64) -> Self {
        self.set_votes(name, votes);
        self
    }

    pub fn with_num_winners(mut self, num_winners: usize) -> Self {
        self.num_winners = num_winners;
        self
    }

    /// Set a candidate's votes. A new candidate is appended; an existing one
    /// keeps its position.
    pub fn set_votes(&mut self, name: impl Into<String>, votes: u64) {
        let name = name.into();
        match self.candidates.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = votes,
            None => self.candidates.push((name, votes)),
        }
    }

    pub fn votes(&self, name: &str) -> Option<u64> {
        self.candidates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Candidates in insertion order.
    pub fn candidates(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.candidates.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Sum of all candidate votes.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|(_, v)| *v).sum()
    }

    /// Candidates sorted by votes descending. Equal counts keep insertion order.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.candidates().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Reject tallies no audit method can work with.
    pub fn validate(&self, contest: &str) -> Result<(), AuditError> {
        if self.num_winners == 0 {
            return Err(AuditError::degenerate(contest, "numWinners must be at least 1"));
        }
        if self.ballots == 0 {
            return Err(AuditError::degenerate(contest, "zero ballots cast"));
        }
        if self.total_votes() == 0 {
            return Err(AuditError::degenerate(contest, "zero reported votes"));
        }
        Ok(())
    }
}

impl Serialize for ContestTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.candidates.len() + 2))?;
        for (name, votes) in &self.candidates {
            map.serialize_entry(name, votes)?;
        }
        map.serialize_entry(BALLOTS_KEY, &self.ballots)?;
        map.serialize_entry(NUM_WINNERS_KEY, &self.num_winners)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContestTally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = ContestTally;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of candidate votes with a `ballots` entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ContestTally, A::Error> {
                let mut candidates: Vec<(String, u64)> = Vec::new();
                let mut ballots = None;
                let mut num_winners = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        BALLOTS_KEY => {
                            if ballots.is_some() {
                                return Err(de::Error::duplicate_field(BALLOTS_KEY));
                            }
                            ballots = Some(map.next_value()?);
                        }
                        NUM_WINNERS_KEY => {
                            if num_winners.is_some() {
                                return Err(de::Error::duplicate_field(NUM_WINNERS_KEY));
                            }
                            num_winners = Some(map.next_value()?);
                        }
                        _ => {
                            if candidates.iter().any(|(n, _)| *n == key) {
                                return Err(de::Error::custom(format!(
                                    "duplicate candidate `{key}`"
                                )));
                            }
                            let votes = map.next_value()?;
                            candidates.push((key, votes));
                        }
                    }
                }

                Ok(ContestTally {
                    candidates,
                    ballots: ballots.ok_or_else(|| de::Error::missing_field(BALLOTS_KEY))?,
                    num_winners: num_winners.unwrap_or(1),
                })
            }
        }

        deserializer.deserialize_map(TallyVisitor)
    }
}

/// A named contest with its candidates split into winners and losers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contest {
    pub name: String,
    pub tally: ContestTally,
    pub winners: Vec<String>,
    pub losers: Vec<String>,
    /// (smallest winner votes - largest loser votes) / ballots.
    pub diluted_margin: f64,
}

impl Contest {
    pub fn from_tally(name: impl Into<String>, tally: ContestTally) -> Result<Self, AuditError> {
        let name = name.into();
        tally.validate(&name)?;

        let ranked = tally.ranked();
        let split = tally.num_winners.min(ranked.len());
        let (winners, losers) = ranked.split_at(split);

        let min_winner = winners.last().map(|(_, v)| *v).unwrap_or(0);
        let max_loser = losers.first().map(|(_, v)| *v).unwrap_or(0);
        let diluted_margin = min_winner.saturating_sub(max_loser) as f64 / tally.ballots as f64;

        let winners = winners.iter().map(|(n, _)| n.to_string()).collect();
        let losers = losers.iter().map(|(n, _)| n.to_string()).collect();

        Ok(Self {
            name,
            tally,
            winners,
            losers,
            diluted_margin,
        })
    }

    pub fn ballots(&self) -> u64 {
        self.tally.ballots
    }

    /// Reported votes for a candidate, zero if the candidate is unknown.
    pub fn votes(&self, candidate: &str) -> u64 {
        self.tally.votes(candidate).unwrap_or(0)
    }

    pub fn is_uncontested(&self) -> bool {
        self.losers.is_empty()
    }
}
