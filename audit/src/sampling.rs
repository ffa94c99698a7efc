//! Drawing samples for any audit method.

use rla_macro::batch_weights;
use rla_margins::compute_margins;
use rla_sampler::Population;
use rla_types::{AuditError, BatchResults, Manifest, SampleDraw};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::method::AuditMethod;
use crate::ContestTallies;

/// Everything needed to build a sampling population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SamplingRequest {
    /// Ballots drawn uniformly from the manifest.
    BallotPolling { manifest: Manifest },
    /// Ballots drawn uniformly from the manifest, to be matched to CVRs.
    BallotComparison { manifest: Manifest },
    /// Batches drawn proportional to their maximum error.
    BatchComparison {
        contests: ContestTallies,
        batch_results: BatchResults,
    },
}

impl SamplingRequest {
    pub fn method(&self) -> AuditMethod {
        match self {
            Self::BallotPolling { .. } => AuditMethod::BallotPolling,
            Self::BallotComparison { .. } => AuditMethod::BallotComparison,
            Self::BatchComparison { .. } => AuditMethod::BatchComparison,
        }
    }

    /// One unit per manifest ballot, or one weighted unit per reported batch.
    pub fn population(&self) -> Result<Population, AuditError> {
        match self {
            Self::BallotPolling { manifest } | Self::BallotComparison { manifest } => {
                Ok(Population::from_manifest(manifest))
            }
            Self::BatchComparison {
                contests,
                batch_results,
            } => {
                let margins = compute_margins(contests)?;
                let weights = batch_weights(batch_results, contests, &margins)?;
                Ok(Population::from_batch_weights(weights))
            }
        }
    }
}

/// Draws number `already_drawn + 1` through `already_drawn + sample_size`
/// of the seeded sample for `request`.
pub fn draw_sample(
    seed: &str,
    request: &SamplingRequest,
    sample_size: usize,
    already_drawn: usize,
) -> Result<Vec<SampleDraw>, AuditError> {
    let population = request.population()?;
    info!(
        method = %request.method(),
        units = population.len(),
        sample_size,
        already_drawn,
        "drawing sample"
    );
    rla_sampler::draw_sample(seed, &population, sample_size, already_drawn)
}
