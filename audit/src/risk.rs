//! Risk measurement for any audit method.

use std::collections::BTreeMap;

use rla_bravo::{BravoRisk, SampleResults};
use rla_macro::SampledBatch;
use rla_margins::compute_margins;
use rla_supersimple::Cvrs;
use rla_types::{AuditError, BatchResults, Contest, RiskLimit, RiskLimitPercent, RiskMeasurement};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::method::AuditMethod;
use crate::ContestTallies;

/// The inputs each method needs to measure risk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RiskRequest {
    BallotPolling {
        risk_limit: RiskLimit,
        contests: ContestTallies,
        /// Cumulative audited votes per contest. Missing contests are unsampled.
        #[serde(default)]
        sample_results: BTreeMap<String, SampleResults>,
    },
    BatchComparison {
        risk_limit: RiskLimit,
        contests: ContestTallies,
        batch_results: BatchResults,
        /// Audited batches in draw order.
        #[serde(default)]
        sample: Vec<SampledBatch>,
    },
    BallotComparison {
        /// Percentage, 1 to 100.
        risk_limit: RiskLimitPercent,
        contests: ContestTallies,
        cvrs: Cvrs,
        #[serde(default)]
        sample_cvr: Cvrs,
    },
}

impl RiskRequest {
    pub fn method(&self) -> AuditMethod {
        match self {
            Self::BallotPolling { .. } => AuditMethod::BallotPolling,
            Self::BatchComparison { .. } => AuditMethod::BatchComparison,
            Self::BallotComparison { .. } => AuditMethod::BallotComparison,
        }
    }
}

/// Measured risk, shaped by method.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RiskOutcome {
    /// Per-pair p-values for each contest.
    BallotPolling { contests: BTreeMap<String, BravoRisk> },
    /// One measurement across every contest the batches report on.
    BatchComparison { risk: RiskMeasurement },
    BallotComparison {
        contests: BTreeMap<String, RiskMeasurement>,
    },
}

impl RiskOutcome {
    /// Whether every audited contest met its risk limit.
    pub fn stop(&self) -> bool {
        match self {
            Self::BallotPolling { contests } => {
                !contests.is_empty() && contests.values().all(|r| r.stop)
            }
            Self::BatchComparison { risk } => risk.stop,
            Self::BallotComparison { contests } => {
                !contests.is_empty() && contests.values().all(|r| r.stop)
            }
        }
    }
}

/// Measure risk with the method the request names.
pub fn assess_risk(request: &RiskRequest) -> Result<RiskOutcome, AuditError> {
    let outcome = match request {
        RiskRequest::BallotPolling {
            risk_limit,
            contests,
            sample_results,
        } => {
            let margins = compute_margins(contests)?;
            let empty = SampleResults::new();
            let contests = margins
                .iter()
                .map(|(name, m)| {
                    let sample = sample_results.get(name).unwrap_or(&empty);
                    rla_bravo::compute_risk(*risk_limit, m, sample).map(|r| (name.clone(), r))
                })
                .collect::<Result<BTreeMap<_, _>, AuditError>>()?;
            RiskOutcome::BallotPolling { contests }
        }
        RiskRequest::BatchComparison {
            risk_limit,
            contests,
            batch_results,
            sample,
        } => {
            let margins = compute_margins(contests)?;
            let risk =
                rla_macro::compute_risk(*risk_limit, sample, batch_results, contests, &margins)?;
            RiskOutcome::BatchComparison { risk }
        }
        RiskRequest::BallotComparison {
            risk_limit,
            contests,
            cvrs,
            sample_cvr,
        } => {
            let contests = contests
                .iter()
                .map(|(name, tally)| {
                    let contest = Contest::from_tally(name.as_str(), tally.clone())?;
                    rla_supersimple::compute_risk(*risk_limit, &contest, cvrs, sample_cvr)
                        .map(|r| (name.clone(), r))
                })
                .collect::<Result<BTreeMap<_, _>, AuditError>>()?;
            RiskOutcome::BallotComparison { contests }
        }
    };

    info!(method = %request.method(), stop = outcome.stop(), "assessed risk");
    Ok(outcome)
}
