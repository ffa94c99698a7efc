//! Kaplan-Markov risk over compared ballots.

use rla_types::{AuditError, Contest, RiskLimitPercent, RiskMeasurement};
use tracing::{debug, warn};

use crate::cvr::{ballot_discrepancies, in_contest, Cvrs};
use crate::sample_size::GAMMA;

/// Risk that the reported outcome is wrong given the compared ballots.
///
/// With `V = dm · |cvrs|` and `U = 2γ/dm`, every sampled ballot in the
/// contest contributes `(1 - 1/U) / (1 - e_r / (2γ/V))`, where `e_r` is its
/// worst relative pair overstatement (never below zero). The audit stops
/// when `0 < p < α`.
pub fn compute_risk(
    risk_limit: RiskLimitPercent,
    contest: &Contest,
    cvrs: &Cvrs,
    sample_cvr: &Cvrs,
) -> Result<RiskMeasurement, AuditError> {
    let alpha = risk_limit.alpha();
    let dm = contest.diluted_margin;
    if cvrs.is_empty() {
        return Err(AuditError::degenerate(contest.name.as_str(), "no cast vote records"));
    }
    if dm <= 0.0 {
        return Err(AuditError::degenerate(contest.name.as_str(), "zero diluted margin"));
    }

    let v = dm * cvrs.len() as f64;
    let u = 2.0 * GAMMA / dm;
    let clean = 1.0 - 1.0 / u;

    let mut p = 1.0;
    let mut compared = 0usize;
    for (ballot, audited) in sample_cvr {
        if !in_contest(contest, audited) {
            continue;
        }
        let e_r = ballot_discrepancies(contest, cvrs.get(ballot), audited)?
            .iter()
            .map(|d| d.relative())
            .fold(0.0, f64::max);

        let denom = 1.0 - e_r / (2.0 * GAMMA / v);
        if denom <= 0.0 {
            warn!(
                contest = %contest.name,
                ballot = %ballot,
                e_r,
                "overstatement exceeds error bound, falling back to maximal risk"
            );
            return Ok(RiskMeasurement::MAXIMAL);
        }
        p *= clean / denom;
        compared += 1;
    }

    let stop = p > 0.0 && p < alpha;
    debug!(contest = %contest.name, compared, p, stop, "computed SUPERSIMPLE risk");
    Ok(RiskMeasurement::new(p, stop))
}
