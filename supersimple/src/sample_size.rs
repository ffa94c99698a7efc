//! Sample sizes from expected discrepancy rates.

use rla_types::{AuditError, Contest, RiskLimitPercent};
use rla_utils::{checked_div, checked_ln};
use tracing::debug;

use crate::cvr::DiscrepancyCounts;

/// Error inflation factor, as used by the published ballot-comparison tools.
pub const GAMMA: f64 = 1.03905;

/// Expected rate of one-vote over- and understatements with no prior sample.
pub const DEFAULT_ONE_VOTE_RATE: f64 = 0.001;

/// Expected rate of two-vote over- and understatements with no prior sample.
pub const DEFAULT_TWO_VOTE_RATE: f64 = 0.0001;

/// Discrepancy rates or expected counts, depending on context.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Discrepancies {
    o1: f64,
    o2: f64,
    u1: f64,
    u2: f64,
}

impl Discrepancies {
    const DEFAULT_RATES: Self = Self {
        o1: DEFAULT_ONE_VOTE_RATE,
        o2: DEFAULT_TWO_VOTE_RATE,
        u1: DEFAULT_ONE_VOTE_RATE,
        u2: DEFAULT_TWO_VOTE_RATE,
    };

    /// Observed rates once anything has been sampled, defaults before.
    fn rates(counts: &DiscrepancyCounts) -> Self {
        if counts.sample_size == 0 {
            return Self::DEFAULT_RATES;
        }
        let n = counts.sample_size as f64;
        Self {
            o1: counts.one_vote_over as f64 / n,
            o2: counts.two_vote_over as f64 / n,
            u1: counts.one_vote_under as f64 / n,
            u2: counts.two_vote_under as f64 / n,
        }
    }

    /// Expected counts in `n0` ballots. One-vote counts round up.
    fn expected_in(&self, n0: f64) -> Self {
        Self {
            o1: (self.o1 * n0).ceil(),
            o2: self.o2 * n0,
            u1: (self.u1 * n0).ceil(),
            u2: self.u2 * n0,
        }
    }

    fn total(&self) -> f64 {
        self.o1 + self.o2 + self.u1 + self.u2
    }

    /// `o1 ln(1 - 1/2γ) + o2 ln(1 - 1/γ) + u1 ln(1 + 1/2γ) + u2 ln(1 + 1/γ)`.
    fn log_weight(&self) -> f64 {
        self.o1 * (1.0 - 1.0 / (2.0 * GAMMA)).ln()
            + self.o2 * (1.0 - 1.0 / GAMMA).ln()
            + self.u1 * (1.0 + 1.0 / (2.0 * GAMMA)).ln()
            + self.u2 * (1.0 + 1.0 / GAMMA).ln()
    }
}

/// Smallest sample that confirms the outcome with `counts` discrepancies,
/// never fewer than the discrepancies themselves.
fn n_min(alpha: f64, diluted_margin: f64, counts: &Discrepancies) -> Result<f64, AuditError> {
    let bound = checked_div(
        -2.0 * GAMMA * (checked_ln(alpha, "risk limit")? + counts.log_weight()),
        diluted_margin,
        "diluted margin",
    )?;
    Ok(bound.ceil().max(counts.total().ceil()))
}

/// Ballots to sample for a ballot-comparison audit of `contest`.
///
/// `discrepancies` describes the sample so far (all zeros before the first
/// round). When the margin is not positive, or too small for the assumed
/// error rates, the answer is a full hand count, `contest.ballots()`.
pub fn get_sample_sizes(
    risk_limit: RiskLimitPercent,
    contest: &Contest,
    discrepancies: &DiscrepancyCounts,
) -> Result<u64, AuditError> {
    let alpha = risk_limit.alpha();
    let dm = contest.diluted_margin;
    let rates = Discrepancies::rates(discrepancies);

    if dm <= 0.0 {
        debug!(contest = %contest.name, dm, "no margin, full hand count");
        return Ok(contest.ballots());
    }

    let denom = (1.0 - dm / (2.0 * GAMMA)).ln() - rates.log_weight();
    if denom >= 0.0 {
        debug!(contest = %contest.name, dm, "margin too small, full hand count");
        return Ok(contest.ballots());
    }

    let n0 = (checked_ln(alpha, "risk limit")? / denom).ceil();
    let expected = rates.expected_in(n0);
    let size = (n_min(alpha, dm, &expected)? as u64).min(contest.ballots());

    debug!(contest = %contest.name, n0, size, "computed SUPERSIMPLE sample size");
    Ok(size)
}
