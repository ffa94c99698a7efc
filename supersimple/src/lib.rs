//! SUPERSIMPLE ballot-comparison audit.
//!
//! Each sampled paper ballot is compared with its cast vote record (CVR).
//! Discrepancies are measured in votes per winner/loser pair and weighed
//! against the contest's diluted margin, inflated by [`GAMMA`].
//!
//! This crate handles:
//! - Initial and follow-up sample sizes from expected discrepancy rates
//! - Classifying sampled ballots into one- and two-vote discrepancies
//! - The Kaplan-Markov risk measurement over the sampled ballots

pub mod cvr;
pub mod risk;
pub mod sample_size;

pub use cvr::{count_discrepancies, BallotCvr, Cvrs, DiscrepancyCounts};
pub use risk::compute_risk;
pub use sample_size::{
    get_sample_sizes, DEFAULT_ONE_VOTE_RATE, DEFAULT_TWO_VOTE_RATE, GAMMA,
};
