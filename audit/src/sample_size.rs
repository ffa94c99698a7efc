//! Sample-size estimates for any audit method.

use std::collections::BTreeMap;

use rla_bravo::{SampleResults, SampleSizeOptions};
use rla_margins::compute_margins;
use rla_supersimple::DiscrepancyCounts;
use rla_types::{AuditError, BatchResults, Contest, RiskLimit, RiskLimitPercent};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::method::AuditMethod;
use crate::ContestTallies;

/// The inputs each method needs to size the next round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SampleSizeRequest {
    BallotPolling {
        risk_limit: RiskLimit,
        contests: ContestTallies,
        #[serde(default)]
        sample_results: BTreeMap<String, SampleResults>,
    },
    BatchComparison {
        risk_limit: RiskLimit,
        contests: ContestTallies,
        batch_results: BatchResults,
    },
    BallotComparison {
        risk_limit: RiskLimitPercent,
        contests: ContestTallies,
        /// Discrepancies found so far per contest. Missing contests use the
        /// default expected rates.
        #[serde(default)]
        discrepancies: BTreeMap<String, DiscrepancyCounts>,
    },
}

impl SampleSizeRequest {
    pub fn method(&self) -> AuditMethod {
        match self {
            Self::BallotPolling { .. } => AuditMethod::BallotPolling,
            Self::BatchComparison { .. } => AuditMethod::BatchComparison,
            Self::BallotComparison { .. } => AuditMethod::BallotComparison,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SampleSizeOutcome {
    /// ASN and completion-quantile options per contest, in ballots.
    BallotPolling {
        contests: BTreeMap<String, SampleSizeOptions>,
    },
    /// Batches to draw.
    BatchComparison { batches: u64 },
    /// Ballots to compare per contest.
    BallotComparison { contests: BTreeMap<String, u64> },
}

/// Size the next round with the method the request names. `quantiles` are
/// the BRAVO completion probabilities to offer.
pub fn estimate_sample_sizes(
    request: &SampleSizeRequest,
    quantiles: &[f64],
) -> Result<SampleSizeOutcome, AuditError> {
    let outcome = match request {
        SampleSizeRequest::BallotPolling {
            risk_limit,
            contests,
            sample_results,
        } => {
            let margins = compute_margins(contests)?;
            let contests =
                rla_bravo::get_sample_sizes(*risk_limit, &margins, sample_results, quantiles)?;
            SampleSizeOutcome::BallotPolling { contests }
        }
        SampleSizeRequest::BatchComparison {
            risk_limit,
            contests,
            batch_results,
        } => {
            let margins = compute_margins(contests)?;
            let batches =
                rla_macro::get_sample_sizes(*risk_limit, batch_results, contests, &margins)?;
            SampleSizeOutcome::BatchComparison { batches }
        }
        SampleSizeRequest::BallotComparison {
            risk_limit,
            contests,
            discrepancies,
        } => {
            let none = DiscrepancyCounts::default();
            let contests = contests
                .iter()
                .map(|(name, tally)| {
                    let contest = Contest::from_tally(name.as_str(), tally.clone())?;
                    let found = discrepancies.get(name).unwrap_or(&none);
                    rla_supersimple::get_sample_sizes(*risk_limit, &contest, found)
                        .map(|n| (name.clone(), n))
                })
                .collect::<Result<BTreeMap<_, _>, AuditError>>()?;
            SampleSizeOutcome::BallotComparison { contests }
        }
    };

    info!(method = %request.method(), "estimated sample sizes");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rla_types::ContestTally;

    fn two_way() -> ContestTallies {
        ContestTallies::from([(
            "test1".to_string(),
            ContestTally::new(1000)
                .with_candidate("cand1", 600)
                .with_candidate("cand2", 400),
        )])
    }

    #[test]
    fn test_ballot_polling_first_round() {
        let request = SampleSizeRequest::BallotPolling {
            risk_limit: RiskLimit::new(0.1).unwrap(),
            contests: two_way(),
            sample_results: BTreeMap::new(),
        };
        let outcome = estimate_sample_sizes(&request, &[0.7, 0.8, 0.9]).unwrap();
        let SampleSizeOutcome::BallotPolling { contests } = outcome else {
            panic!("wrong outcome shape");
        };
        let options = &contests["test1"];
        assert_eq!(options.asn.size, 119);
        let sizes: Vec<u64> = options.quantiles.iter().map(|q| q.size).collect();
        assert_eq!(sizes, vec![184, 244, 351]);
    }

    #[test]
    fn test_ballot_comparison_defaults() {
        let json = r#"{"method": "ballot_comparison", "risk_limit": 10,
            "contests": {"test1": {"cand1": 600, "cand2": 400, "ballots": 1000}}}"#;
        let request: SampleSizeRequest = serde_json::from_str(json).unwrap();
        let outcome = estimate_sample_sizes(&request, &[]).unwrap();
        assert_eq!(
            outcome,
            SampleSizeOutcome::BallotComparison {
                contests: BTreeMap::from([("test1".to_string(), 27)]),
            }
        );
    }

    #[test]
    fn test_batch_comparison_without_batches_is_missing() {
        let request = SampleSizeRequest::BatchComparison {
            risk_limit: RiskLimit::new(0.1).unwrap(),
            contests: two_way(),
            batch_results: BatchResults::new(),
        };
        assert_eq!(
            estimate_sample_sizes(&request, &[]),
            Err(AuditError::MissingBatchResults)
        );
    }
}
