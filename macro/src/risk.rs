//! Sample sizes and the Kaplan-Markov risk measurement.

use rla_types::{AuditError, BatchKey, BatchResults, BatchTally, RiskLimit, RiskMeasurement};
use rla_utils::{checked_div, checked_ln};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error_bound::{compute_error, compute_max_error, compute_u};
use crate::{ContestMargins, ContestTallies};

/// A hand-audited batch, in the order it was drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledBatch {
    #[serde(flatten)]
    pub batch: BatchKey,
    pub audited: BatchTally,
}

/// `1 - 1/U`, the per-batch factor for a clean audit. Needs `U > 1`.
fn clean_factor(u: f64) -> Result<f64, AuditError> {
    if u <= 1.0 {
        return Err(AuditError::ArithmeticDomain(format!(
            "total error bound {u} must exceed 1"
        )));
    }
    Ok(1.0 - 1.0 / u)
}

/// Number of batches to draw, assuming none of them show any error:
/// `ceil(ln α / ln(1 - 1/U))`.
pub fn get_sample_sizes(
    risk_limit: RiskLimit,
    batch_results: &BatchResults,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<u64, AuditError> {
    let u = compute_u(batch_results, contests, margins)?;
    let factor = clean_factor(u)?;
    let n = checked_ln(risk_limit.alpha(), "risk limit")?
        / checked_ln(factor, "clean-batch factor")?;
    let size = n.ceil() as u64;
    debug!(u, size, "computed MACRO sample size");
    Ok(size)
}

/// Fold the audited batches into `p *= (1 - 1/U) / (1 - e_p/u_p)`, stopping
/// as soon as `p` drops below the risk limit.
///
/// A batch whose taint reaches 1, or that has no error bound, leaves the
/// measurement undefined; the audit then reports maximal risk.
pub fn compute_risk(
    risk_limit: RiskLimit,
    sample: &[SampledBatch],
    batch_results: &BatchResults,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<RiskMeasurement, AuditError> {
    let alpha = risk_limit.alpha();
    let u = compute_u(batch_results, contests, margins)?;
    let factor = match clean_factor(u) {
        Ok(f) => f,
        Err(err) => {
            warn!(error = %err, "falling back to maximal risk");
            return Ok(RiskMeasurement::MAXIMAL);
        }
    };

    let mut p = 1.0;
    for (drawn, sampled) in sample.iter().enumerate() {
        let reported = batch_results
            .get(&sampled.batch)
            .ok_or(AuditError::MissingBatchResults)?;
        let u_p = compute_max_error(reported, contests, margins)?;
        let e_p = compute_error(reported, &sampled.audited, contests, margins)?;

        let taint = match checked_div(e_p, u_p, "batch taint") {
            Ok(t) if t < 1.0 => t,
            Ok(t) => {
                warn!(
                    batch = %sampled.batch,
                    taint = t,
                    "taint reached 1, falling back to maximal risk"
                );
                return Ok(RiskMeasurement::MAXIMAL);
            }
            Err(err) => {
                warn!(batch = %sampled.batch, error = %err, "falling back to maximal risk");
                return Ok(RiskMeasurement::MAXIMAL);
            }
        };

        p *= factor / (1.0 - taint);
        if p < alpha {
            debug!(p, batches = drawn + 1, "MACRO risk limit met");
            return Ok(RiskMeasurement::new(p, true));
        }
    }

    debug!(p, batches = sample.len(), "MACRO risk limit not met");
    Ok(RiskMeasurement::new(p, false))
}
