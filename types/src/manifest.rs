//! Ballot manifests and batch-level reported results.
//!
//! Batches are identified by their real-world `(jurisdiction, batch)` names.
//! Both collections serialize as flat lists of rows, one per batch.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a physical batch of ballots.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchKey {
    pub jurisdiction: String,
    pub batch: String,
}

impl BatchKey {
    pub fn new(jurisdiction: impl Into<String>, batch: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            batch: batch.into(),
        }
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.jurisdiction, self.batch)
    }
}

/// One manifest row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub jurisdiction: String,
    pub batch: String,
    pub ballots: u64,
}

/// Ballot counts per batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ManifestEntry>", into = "Vec<ManifestEntry>")]
pub struct Manifest {
    batches: BTreeMap<BatchKey, u64>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch. A repeated key replaces the earlier count.
    pub fn insert(&mut self, key: BatchKey, ballots: u64) {
        self.batches.insert(key, ballots);
    }

    pub fn with_batch(mut self, jurisdiction: &str, batch: &str, ballots: u64) -> Self {
        self.insert(BatchKey::new(jurisdiction, batch), ballots);
        self
    }

    pub fn ballots(&self, key: &BatchKey) -> Option<u64> {
        self.batches.get(key).copied()
    }

    /// Batches in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&BatchKey, u64)> + '_ {
        self.batches.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn total_ballots(&self) -> u64 {
        self.batches.values().sum()
    }
}

impl FromIterator<(BatchKey, u64)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (BatchKey, u64)>>(iter: I) -> Self {
        Self {
            batches: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(rows: Vec<ManifestEntry>) -> Self {
        rows.into_iter()
            .map(|row| (BatchKey::new(row.jurisdiction, row.batch), row.ballots))
            .collect()
    }
}

impl From<Manifest> for Vec<ManifestEntry> {
    fn from(manifest: Manifest) -> Self {
        manifest
            .batches
            .into_iter()
            .map(|(key, ballots)| ManifestEntry {
                jurisdiction: key.jurisdiction,
                batch: key.batch,
                ballots,
            })
            .collect()
    }
}

/// Reported (or audited) results for one contest within one batch.
///
/// Serialized flat: `{"cand1": 40, "cand2": 10, "ballots": 50}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchContestTally {
    #[serde(flatten)]
    pub votes: BTreeMap<String, u64>,
    pub ballots: u64,
}

impl BatchContestTally {
    pub fn new(ballots: u64) -> Self {
        Self {
            votes: BTreeMap::new(),
            ballots,
        }
    }

    pub fn with_votes(mut self, candidate: impl Into<String>, votes: u64) -> Self {
        self.votes.insert(candidate.into(), votes);
        self
    }

    /// Votes for a candidate, zero when absent.
    pub fn votes_for(&self, candidate: &str) -> u64 {
        self.votes.get(candidate).copied().unwrap_or(0)
    }
}

/// Contest name to that contest's results within one batch.
pub type BatchTally = BTreeMap<String, BatchContestTally>;

/// One row of serialized batch results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResultsRow {
    pub jurisdiction: String,
    pub batch: String,
    pub contests: BatchTally,
}

/// Reported results for every batch, the input to batch-comparison audits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<BatchResultsRow>", into = "Vec<BatchResultsRow>")]
pub struct BatchResults {
    batches: BTreeMap<BatchKey, BatchTally>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: BatchKey, tally: BatchTally) {
        self.batches.insert(key, tally);
    }

    /// Add one contest's results to a batch, creating the batch if needed.
    pub fn with_contest(
        mut self,
        key: BatchKey,
        contest: impl Into<String>,
        tally: BatchContestTally,
    ) -> Self {
        self.batches
            .entry(key)
            .or_default()
            .insert(contest.into(), tally);
        self
    }

    pub fn get(&self, key: &BatchKey) -> Option<&BatchTally> {
        self.batches.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BatchKey, &BatchTally)> + '_ {
        self.batches.iter()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

impl FromIterator<(BatchKey, BatchTally)> for BatchResults {
    fn from_iter<I: IntoIterator<Item = (BatchKey, BatchTally)>>(iter: I) -> Self {
        Self {
            batches: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<BatchResultsRow>> for BatchResults {
    fn from(rows: Vec<BatchResultsRow>) -> Self {
        rows.into_iter()
            .map(|row| (BatchKey::new(row.jurisdiction, row.batch), row.contests))
            .collect()
    }
}

impl From<BatchResults> for Vec<BatchResultsRow> {
    fn from(results: BatchResults) -> Self {
        results
            .batches
            .into_iter()
            .map(|(key, contests)| BatchResultsRow {
                jurisdiction: key.jurisdiction,
                batch: key.batch,
                contests,
            })
            .collect()
    }
}
