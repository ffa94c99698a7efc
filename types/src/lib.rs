//! Fundamental types for the risk-limiting audit engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! reported tallies, ranked contests, margins, ballot manifests, sample draws,
//! risk limits, and the common error enum.

pub mod contest;
pub mod error;
pub mod manifest;
pub mod margins;
pub mod measurement;
pub mod pair;
pub mod risk_limit;
pub mod sample;

pub use contest::{Contest, ContestTally};
pub use error::AuditError;
pub use manifest::{
    BatchContestTally, BatchKey, BatchResults, BatchResultsRow, BatchTally, Manifest, ManifestEntry,
};
pub use margins::{LoserMargin, Margins, WinnerMargin};
pub use measurement::RiskMeasurement;
pub use pair::CandidatePair;
pub use risk_limit::{RiskLimit, RiskLimitPercent};
pub use sample::{SampleDraw, SampledUnit, TicketNumber};
