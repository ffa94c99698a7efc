//! Sample-size projection for BRAVO.
//!
//! All projections use the hardest pair in the contest: the reported winner
//! with the smallest vote share against the loser with the largest.

use std::collections::BTreeMap;

use rla_types::{AuditError, Margins, RiskLimit};
use rla_utils::stats::{binomial_sf_ge, normal_quantile, normal_sf};
use rla_utils::{checked_div, checked_ln, checked_sqrt};
use serde::Serialize;
use tracing::debug;

use crate::risk::{log_test_statistics, sampled, SampleResults};

/// Completion probabilities offered alongside the ASN by default.
pub const DEFAULT_COMPLETION_QUANTILES: [f64; 3] = [0.7, 0.8, 0.9];

/// Upper bound on the two-candidate draws searched by [`bravo_sample_sizes`].
const MAX_SEARCH_DRAWS: u64 = 1 << 40;

/// Per-step log-likelihood increments and the remaining distance to the
/// stopping threshold for one pair.
struct PairWalk {
    /// Winner share of the two-candidate vote.
    p: f64,
    /// ln(p / 0.5), the increment for a winner vote.
    plus: f64,
    /// ln((1 - p) / 0.5), the increment for a loser vote.
    minus: f64,
    /// ln(1/alpha) minus the evidence already in the sample.
    threshold: f64,
}

impl PairWalk {
    fn new(
        risk_limit: RiskLimit,
        p_w: f64,
        p_r: f64,
        sample_w: u64,
        sample_r: u64,
    ) -> Result<Self, AuditError> {
        let p = checked_div(p_w, p_w + p_r, "two-candidate winner share")?;
        if p <= 0.5 {
            return Err(AuditError::ArithmeticDomain(format!(
                "winner share {p} does not exceed one half"
            )));
        }
        let plus = checked_ln(p / 0.5, "winner increment")?;
        let minus = checked_ln((1.0 - p) / 0.5, "loser increment")?;
        let threshold = -risk_limit.alpha().ln() - (sample_w as f64 * plus + sample_r as f64 * minus);
        Ok(Self {
            p,
            plus,
            minus,
            threshold,
        })
    }

    /// Winner votes needed among `n` two-candidate votes to cross the threshold.
    fn winner_votes_needed(&self, n: u64) -> u64 {
        let needed = ((self.threshold - n as f64 * self.minus) / (self.plus - self.minus)).ceil();
        if needed <= 0.0 {
            0
        } else {
            needed as u64
        }
    }
}

/// Probability that an audit of `asn` draws completes, under the reported
/// shares `p_w` (winner) and `p_r` (runner-up).
///
/// Normal approximation to the number of winner votes among the draws.
pub fn expected_prob(
    risk_limit: RiskLimit,
    p_w: f64,
    p_r: f64,
    sample_w: u64,
    sample_r: u64,
    asn: u64,
) -> Result<f64, AuditError> {
    let walk = PairWalk::new(risk_limit, p_w, p_r, sample_w, sample_r)?;
    if walk.threshold <= 0.0 {
        return Ok(1.0);
    }
    if asn == 0 {
        return Ok(0.0);
    }

    let n = asn as f64;
    let x = (walk.threshold - n * walk.minus) / (walk.plus - walk.minus);
    let mean = n * walk.p;
    let sd = checked_sqrt(n * walk.p * (1.0 - walk.p), "winner-vote variance")?;
    Ok(normal_sf(checked_div(x - mean, sd, "standardized threshold")?))
}

/// Ballots needed so the audit completes with probability `p_completion`.
///
/// Solves the normal approximation for a starting point, then steps up
/// until the exact binomial completion probability reaches `p_completion`.
/// The result is in ballots (draws of any candidate); callers round up.
pub fn bravo_sample_sizes(
    risk_limit: RiskLimit,
    p_w: f64,
    p_r: f64,
    sample_w: u64,
    sample_r: u64,
    p_completion: f64,
) -> Result<f64, AuditError> {
    let walk = PairWalk::new(risk_limit, p_w, p_r, sample_w, sample_r)?;
    if walk.threshold <= 0.0 {
        return Ok(0.0);
    }

    // p*x + z*sqrt(p(1-p)x) = (threshold - minus*x)/(plus - minus), in y = sqrt(x).
    let z = -normal_quantile(p_completion)?;
    let d = walk.plus - walk.minus;
    let a = walk.p + walk.minus / d;
    let b = z * (walk.p * (1.0 - walk.p)).sqrt();
    let c = -walk.threshold / d;
    let root = checked_sqrt(b * b - 4.0 * a * c, "quadratic discriminant")?;
    let y = checked_div(-b + root, 2.0 * a, "quadratic root")?;

    let mut n = ((y * y).floor() as u64).max(1);
    while binomial_sf_ge(walk.winner_votes_needed(n), n, walk.p) < p_completion {
        n += 1;
        if n > MAX_SEARCH_DRAWS {
            return Err(AuditError::ArithmeticDomain(format!(
                "no sample size below {MAX_SEARCH_DRAWS} reaches completion probability {p_completion}"
            )));
        }
    }

    checked_div(n as f64, p_w + p_r, "ballots per two-candidate vote")
}

/// Average sample number: the expected number of further ballots before the
/// audit stops, if the reported results are correct.
///
/// Zero when the sample already suffices. Uncontested and tied contests are
/// [`AuditError::DegenerateContest`].
pub fn expected_sample_size(
    risk_limit: RiskLimit,
    contest: &str,
    margins: &Margins,
    sample: &SampleResults,
) -> Result<u64, AuditError> {
    let (_, winner) = margins
        .weakest_winner()
        .ok_or_else(|| AuditError::degenerate(contest, "no reported winners"))?;
    let (_, loser) = margins
        .strongest_loser()
        .ok_or_else(|| AuditError::degenerate(contest, "uncontested; nothing to audit"))?;

    let (p_w, p_l) = (winner.p_w, loser.p_l);
    if p_w <= p_l {
        return Err(AuditError::degenerate(
            contest,
            "reported tie; requires a full hand count",
        ));
    }

    let s_w = p_w / (p_w + p_l);
    let z_w = checked_ln(2.0 * s_w, "winner increment")?;
    // A zero-vote loser contributes nothing to the drift.
    let loser_term = if p_l > 0.0 {
        p_l * checked_ln(2.0 - 2.0 * s_w, "loser increment")?
    } else {
        0.0
    };

    let min_log_t = log_test_statistics(margins, sample)
        .into_iter()
        .filter(|(pair, _)| pair.loser.is_some())
        .map(|(_, log_t)| log_t)
        .reduce(f64::min)
        .unwrap_or(0.0);

    let numerator = -risk_limit.alpha().ln() - min_log_t + z_w / 2.0;
    if numerator == f64::NEG_INFINITY {
        return Ok(0);
    }
    let asn = checked_div(numerator, p_w * z_w + loser_term, "ASN")?.ceil();

    debug!(contest, asn, "expected sample size");

    Ok(if asn <= 0.0 { 0 } else { asn as u64 })
}

/// The ASN and its completion probability.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AsnEstimate {
    pub size: u64,
    pub prob: f64,
}

/// A sample size that completes the audit with probability `quantile`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuantileSize {
    pub quantile: f64,
    pub size: u64,
}

/// Sample-size choices offered for one contest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleSizeOptions {
    pub asn: AsnEstimate,
    pub quantiles: Vec<QuantileSize>,
}

/// ASN plus one option per completion quantile for one contest.
pub fn get_sample_size(
    risk_limit: RiskLimit,
    contest: &str,
    margins: &Margins,
    sample: &SampleResults,
    quantiles: &[f64],
) -> Result<SampleSizeOptions, AuditError> {
    let asn = expected_sample_size(risk_limit, contest, margins, sample)?;

    let (w_name, winner) = margins
        .weakest_winner()
        .ok_or_else(|| AuditError::degenerate(contest, "no reported winners"))?;
    let (l_name, loser) = margins
        .strongest_loser()
        .ok_or_else(|| AuditError::degenerate(contest, "uncontested; nothing to audit"))?;
    let sample_w = sampled(sample, w_name);
    let sample_r = sampled(sample, l_name);

    let prob = expected_prob(risk_limit, winner.p_w, loser.p_l, sample_w, sample_r, asn)?;

    let quantiles = quantiles
        .iter()
        .map(|&quantile| {
            let size =
                bravo_sample_sizes(risk_limit, winner.p_w, loser.p_l, sample_w, sample_r, quantile)?;
            Ok(QuantileSize {
                quantile,
                size: size.ceil() as u64,
            })
        })
        .collect::<Result<Vec<_>, AuditError>>()?;

    Ok(SampleSizeOptions {
        asn: AsnEstimate { size: asn, prob },
        quantiles,
    })
}

/// [`get_sample_size`] for every contest. Contests missing from `samples`
/// are treated as not yet sampled.
pub fn get_sample_sizes(
    risk_limit: RiskLimit,
    margins: &BTreeMap<String, Margins>,
    samples: &BTreeMap<String, SampleResults>,
    quantiles: &[f64],
) -> Result<BTreeMap<String, SampleSizeOptions>, AuditError> {
    let empty = SampleResults::new();
    margins
        .iter()
        .map(|(contest, m)| {
            let sample = samples.get(contest).unwrap_or(&empty);
            get_sample_size(risk_limit, contest, m, sample, quantiles)
                .map(|options| (contest.clone(), options))
        })
        .collect()
}

/// [`expected_sample_size`] for every contest.
pub fn get_expected_sample_sizes(
    risk_limit: RiskLimit,
    margins: &BTreeMap<String, Margins>,
    samples: &BTreeMap<String, SampleResults>,
) -> Result<BTreeMap<String, u64>, AuditError> {
    let empty = SampleResults::new();
    margins
        .iter()
        .map(|(contest, m)| {
            let sample = samples.get(contest).unwrap_or(&empty);
            expected_sample_size(risk_limit, contest, m, sample).map(|asn| (contest.clone(), asn))
        })
        .collect()
}
