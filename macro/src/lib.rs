//! MACRO batch-comparison audit.
//!
//! Batches are sampled with probability proportional to their error bound
//! (PPEB). Each batch's maximum possible overstatement `u_p`, normalized by
//! the reported winner-loser margin, bounds how much it could have changed
//! the outcome; `U` is the sum over all batches.
//!
//! This crate handles:
//! - Per-batch maximum and observed errors
//! - Integer sampling weights proportional to `u_p`
//! - Sample sizes and the sequential risk measurement

pub mod error_bound;
mod ratio;
pub mod risk;
pub mod weights;

pub use error_bound::{compute_error, compute_max_error, compute_u};
pub use risk::{compute_risk, get_sample_sizes, SampledBatch};
pub use weights::batch_weights;

/// Reported contest tallies keyed by contest name.
pub type ContestTallies = std::collections::BTreeMap<String, rla_types::ContestTally>;

/// Margins keyed by contest name.
pub type ContestMargins = std::collections::BTreeMap<String, rla_types::Margins>;
