//! Consistent sampler.
//!
//! Draws a reproducible sample, with replacement, from a weighted population
//! of ballots or batches. Anyone holding the seed and the manifest can
//! recompute the exact same sample.
//!
//! Every unit owns an ascending stream of ticket numbers derived from
//! SHA-256 of the seed and the unit's identity. The sample is the global
//! ascending merge of those streams, so:
//! - drawing `n + k` items yields the `n`-item draw as a prefix
//! - a unit's `j`-th appearance carries multiplicity `j`
//! - a unit of weight `w` behaves as `w` independent copies merged into one stream

pub mod population;
pub mod sampler;
pub mod ticket;

pub use population::Population;
pub use sampler::{draw_ballots, draw_sample};
pub use ticket::{seed_hash, TicketStream};
