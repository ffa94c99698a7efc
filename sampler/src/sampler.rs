//! The draw loop: a k-way merge of per-unit ticket streams.
//!
//! A unit of weight `w` owns `w` copy streams. Only the unit's earliest
//! pending ticket sits in the global heap; the other copies are kept in a
//! per-unit heap that is built the first time the unit is drawn, and after
//! that only the copy just consumed is advanced.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rla_types::{AuditError, Manifest, SampleDraw, TicketNumber};
use tracing::debug;

use crate::population::Population;
use crate::ticket::{draw_uniform, seed_hash, TicketStream};

/// One virtual copy with its next ticket.
#[derive(Clone, Copy, Debug)]
struct CopyCursor {
    ticket: TicketNumber,
    copy: u64,
    draws: u32,
    stream: TicketStream,
}

impl CopyCursor {
    fn first(id: &str, hash: &str, copy: u64) -> Self {
        let mut stream = TicketStream::new();
        stream.advance(draw_uniform(id, hash, 1));
        Self {
            ticket: stream.ticket(),
            copy,
            draws: 1,
            stream,
        }
    }

    fn advance(&mut self, id: &str, hash: &str) {
        self.draws = self.draws.saturating_add(1);
        self.stream.advance(draw_uniform(id, hash, self.draws));
        self.ticket = self.stream.ticket();
    }

    fn key(&self) -> (TicketNumber, u64) {
        (self.ticket, self.copy)
    }
}

impl PartialEq for CopyCursor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CopyCursor {}

impl PartialOrd for CopyCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CopyCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// A unit waiting in the merge, keyed by its earliest copy.
#[derive(Debug)]
struct Pending {
    index: usize,
    head: CopyCursor,
    /// Remaining copies, `None` until the unit is first drawn.
    rest: Option<BinaryHeap<Reverse<CopyCursor>>>,
    times_sampled: u32,
}

impl Pending {
    fn key(&self) -> (TicketNumber, usize) {
        (self.head.ticket, self.index)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Earliest first ticket over the `weight` copies of a unit.
fn earliest_copy(population: &Population, index: usize, hash: &str) -> Option<CopyCursor> {
    (0..population.weight(index))
        .filter_map(|copy| {
            let id = population.copy_id(index, copy)?;
            Some(CopyCursor::first(&id, hash, copy))
        })
        .min()
}

/// Move a drawn unit to its next ticket.
fn advance_unit(population: &Population, pending: &mut Pending, hash: &str) -> Option<()> {
    let weight = population.weight(pending.index);
    let id = population.copy_id(pending.index, pending.head.copy)?;
    pending.head.advance(&id, hash);
    if weight <= 1 {
        return Some(());
    }

    let head_copy = pending.head.copy;
    let rest = pending.rest.get_or_insert_with(|| {
        (0..weight)
            .filter(|copy| *copy != head_copy)
            .filter_map(|copy| {
                let id = population.copy_id(pending.index, copy)?;
                Some(Reverse(CopyCursor::first(&id, hash, copy)))
            })
            .collect()
    });
    rest.push(Reverse(pending.head));
    let Reverse(next) = rest.pop()?;
    pending.head = next;
    Some(())
}

/// Draw `sample_size` units, with replacement, after skipping the first
/// `already_drawn` draws of the same seed and population.
///
/// Draws come back in ascending ticket order. Equal tickets are broken by
/// population order.
pub fn draw_sample(
    seed: &str,
    population: &Population,
    sample_size: usize,
    already_drawn: usize,
) -> Result<Vec<SampleDraw>, AuditError> {
    if sample_size == 0 {
        return Ok(Vec::new());
    }
    if population.total_weight() == 0 {
        return Err(AuditError::degenerate(
            "sample",
            "population has no units with positive weight",
        ));
    }
    let total = already_drawn
        .checked_add(sample_size)
        .ok_or_else(|| AuditError::ArithmeticDomain("draw count overflows usize".into()))?;

    let hash = seed_hash(seed);
    let mut heap = BinaryHeap::with_capacity(population.len());
    for index in 0..population.len() {
        let Some(head) = earliest_copy(population, index, &hash) else {
            continue;
        };
        heap.push(Reverse(Pending {
            index,
            head,
            rest: None,
            times_sampled: 0,
        }));
    }

    let mut sample = Vec::with_capacity(sample_size);
    for drawn in 0..total {
        let Some(Reverse(mut next)) = heap.pop() else {
            break;
        };
        next.times_sampled = next.times_sampled.saturating_add(1);

        if drawn >= already_drawn {
            if let Some(unit) = population.unit(next.index) {
                sample.push(SampleDraw {
                    ticket: next.head.ticket,
                    unit,
                    times_sampled: next.times_sampled,
                });
            }
        }

        if advance_unit(population, &mut next, &hash).is_some() {
            heap.push(Reverse(next));
        }
    }

    debug!(
        units = population.len(),
        sample_size,
        already_drawn,
        "drew sample"
    );

    Ok(sample)
}

/// Draw ballots from a manifest, one unit per ballot.
pub fn draw_ballots(
    seed: &str,
    manifest: &Manifest,
    sample_size: usize,
    already_drawn: usize,
) -> Result<Vec<SampleDraw>, AuditError> {
    draw_sample(
        seed,
        &Population::from_manifest(manifest),
        sample_size,
        already_drawn,
    )
}
