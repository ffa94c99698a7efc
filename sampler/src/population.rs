//! Sampling populations.
//!
//! A population is an arena of batch identities plus one entry per sampling
//! unit, each referring to its batch by index. Ballot populations hold one
//! entry per ballot; batch populations hold one entry per batch with an
//! integer weight, so their size is linear in the number of batches. A
//! weight of `w` stands for `w` virtual copies whose ids are rendered on
//! demand.

use std::collections::BTreeMap;

use rla_types::{BatchKey, Manifest, SampledUnit};

use crate::ticket::BatchLabel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    batch: usize,
    /// 1-indexed ballot position, `None` for whole-batch units.
    position: Option<u64>,
    weight: u64,
}

/// Units eligible for sampling, in a fixed order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Population {
    batches: Vec<BatchKey>,
    labels: Vec<BatchLabel>,
    entries: Vec<Entry>,
}

impl Population {
    /// One unit of weight 1 per ballot, batches in manifest key order.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut population = Self::default();
        for (key, ballots) in manifest.iter() {
            let batch = population.push_batch(key.clone());
            population
                .entries
                .extend((1..=ballots).map(|position| Entry {
                    batch,
                    position: Some(position),
                    weight: 1,
                }));
        }
        population
    }

    /// One unit per batch with the given weight. Repeated keys keep the last
    /// weight; units are ordered by key.
    pub fn from_batch_weights<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (BatchKey, u64)>,
    {
        let deduped: BTreeMap<BatchKey, u64> = weights.into_iter().collect();
        let mut population = Self::default();
        for (key, weight) in deduped {
            let batch = population.push_batch(key);
            population.entries.push(Entry {
                batch,
                position: None,
                weight,
            });
        }
        population
    }

    fn push_batch(&mut self, key: BatchKey) -> usize {
        self.labels.push(BatchLabel::new(&key));
        self.batches.push(key);
        self.batches.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all unit weights, saturating at `u64::MAX`.
    pub fn total_weight(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.weight))
    }

    pub fn weight(&self, index: usize) -> u64 {
        self.entries.get(index).map(|e| e.weight).unwrap_or(0)
    }

    /// The unit at `index`, if any.
    pub fn unit(&self, index: usize) -> Option<SampledUnit> {
        let entry = self.entries.get(index)?;
        let batch = self.batches.get(entry.batch)?.clone();
        Some(match entry.position {
            Some(position) => SampledUnit::Ballot { batch, position },
            None => SampledUnit::Batch { batch },
        })
    }

    /// Sampling id of copy `copy` of the unit at `index`.
    ///
    /// Ballots have a single copy and use their 0-based index within the
    /// batch; weighted batches append the copy number.
    pub(crate) fn copy_id(&self, index: usize, copy: u64) -> Option<String> {
        let entry = self.entries.get(index)?;
        let label = self.labels.get(entry.batch)?;
        Some(match entry.position {
            Some(position) => label.ballot_id(position - 1),
            None => label.copy_id(copy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_expands_ballots() {
        let manifest = Manifest::new()
            .with_batch("J1", "pct 2", 2)
            .with_batch("J1", "pct 1", 3);
        let population = Population::from_manifest(&manifest);
        assert_eq!(population.len(), 5);
        assert_eq!(population.total_weight(), 5);
        assert_eq!(
            population.unit(0),
            Some(SampledUnit::Ballot {
                batch: BatchKey::new("J1", "pct 1"),
                position: 1
            })
        );
        assert_eq!(
            population.unit(4),
            Some(SampledUnit::Ballot {
                batch: BatchKey::new("J1", "pct 2"),
                position: 2
            })
        );
        assert_eq!(population.unit(5), None);
    }

    #[test]
    fn test_batch_weights_are_not_duplicated() {
        let population = Population::from_batch_weights(vec![
            (BatchKey::new("J1", "b"), 3),
            (BatchKey::new("J1", "a"), 1),
            (BatchKey::new("J1", "b"), 2),
        ]);
        assert_eq!(population.len(), 2);
        assert_eq!(population.weight(0), 1);
        assert_eq!(population.weight(1), 2);
        assert_eq!(population.total_weight(), 3);
    }

    #[test]
    fn test_copy_ids_by_unit_kind() {
        let ballots = Population::from_manifest(&Manifest::new().with_batch("", "pct 2", 4));
        assert_eq!(ballots.copy_id(3, 0).unwrap(), "('pct 2', 3)");
        assert_eq!(
            ballots.unit(3),
            Some(SampledUnit::Ballot {
                batch: BatchKey::new("", "pct 2"),
                position: 4
            })
        );

        let batches = Population::from_batch_weights(vec![(BatchKey::new("J1", "pct 1"), 4)]);
        assert_eq!(batches.copy_id(0, 3).unwrap(), "('J1', 'pct 1').3");
        assert_eq!(batches.copy_id(1, 0), None);
    }

    #[test]
    fn test_total_weight_saturates() {
        let population = Population::from_batch_weights(vec![
            (BatchKey::new("J1", "a"), u64::MAX),
            (BatchKey::new("J1", "b"), u64::MAX),
        ]);
        assert_eq!(population.total_weight(), u64::MAX);
    }
}
