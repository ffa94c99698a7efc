//! BRAVO ballot-polling audit.
//!
//! A sequential probability ratio test run separately for every reported
//! (winner, loser) pair. The audit may stop only once every pair's p-value is
//! below the risk limit.
//!
//! This crate handles:
//! - Test statistics and p-values from cumulative sampled votes
//! - Average sample number (ASN) projection
//! - Completion-probability estimates and quantile sample sizes

pub mod risk;
pub mod sample_size;

pub use risk::{compute_risk, get_test_statistics, BravoRisk, PairRisk, SampleResults};
pub use sample_size::{
    bravo_sample_sizes, expected_prob, expected_sample_size, get_expected_sample_sizes,
    get_sample_size, get_sample_sizes, AsnEstimate, QuantileSize, SampleSizeOptions,
    DEFAULT_COMPLETION_QUANTILES,
};
