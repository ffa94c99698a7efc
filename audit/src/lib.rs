//! Risk-limiting audit facade.
//!
//! Ties the engines together behind closed request types: each
//! [`AuditMethod`] carries exactly the inputs its math needs, so a
//! batch-comparison audit cannot be asked for without batch results.
//!
//! This crate handles:
//! - Sample draws for every method ([`draw_sample`])
//! - Sample-size estimates ([`estimate_sample_sizes`])
//! - Risk measurement and the stop decision ([`assess_risk`])
//! - TOML configuration ([`AuditConfig`])

pub mod config;
pub mod error;
pub mod method;
pub mod risk;
pub mod sample_size;
pub mod sampling;

pub use config::AuditConfig;
pub use error::ConfigError;
pub use method::AuditMethod;
pub use risk::{assess_risk, RiskOutcome, RiskRequest};
pub use sample_size::{estimate_sample_sizes, SampleSizeOutcome, SampleSizeRequest};
pub use sampling::{draw_sample, SamplingRequest};

/// Reported tallies keyed by contest name.
pub type ContestTallies = std::collections::BTreeMap<String, rla_types::ContestTally>;
