//! SPRT test statistics and p-values.

use std::collections::BTreeMap;

use rla_types::{AuditError, CandidatePair, Margins, RiskLimit};
use rla_utils::checked_div;
use serde::Serialize;
use tracing::{debug, warn};

/// Cumulative audited votes per candidate for one contest.
pub type SampleResults = BTreeMap<String, u64>;

pub(crate) fn sampled(sample: &SampleResults, candidate: &str) -> u64 {
    sample.get(candidate).copied().unwrap_or(0)
}

/// ln T for one pair. Terms with no sampled votes are skipped, so a zero
/// share with a zero count contributes nothing rather than NaN.
fn log_test_statistic(swl: f64, n_w: u64, n_l: u64) -> f64 {
    let mut log_t = 0.0;
    if n_w > 0 {
        log_t += n_w as f64 * (swl / 0.5).ln();
    }
    if n_l > 0 {
        log_t += n_l as f64 * ((1.0 - swl) / 0.5).ln();
    }
    log_t
}

/// ln T for every pair. Uncontested winners get ln T = 0.
pub(crate) fn log_test_statistics(
    margins: &Margins,
    sample: &SampleResults,
) -> BTreeMap<CandidatePair, f64> {
    let mut stats = BTreeMap::new();
    for (winner, wm) in &margins.winners {
        if wm.swl.is_empty() {
            stats.insert(CandidatePair::uncontested(winner.as_str()), 0.0);
            continue;
        }
        let n_w = sampled(sample, winner);
        for (loser, swl) in &wm.swl {
            let log_t = log_test_statistic(*swl, n_w, sampled(sample, loser));
            stats.insert(CandidatePair::new(winner.as_str(), loser.as_str()), log_t);
        }
    }
    stats
}

/// Likelihood ratio `T = (swl/0.5)^n_w * ((1-swl)/0.5)^n_l` for every pair.
pub fn get_test_statistics(
    margins: &Margins,
    sample: &SampleResults,
) -> BTreeMap<CandidatePair, f64> {
    log_test_statistics(margins, sample)
        .into_iter()
        .map(|(pair, log_t)| (pair, log_t.exp()))
        .collect()
}

/// The p-value of one winner/loser pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairRisk {
    #[serde(flatten)]
    pub pair: CandidatePair,
    pub p_value: f64,
}

/// Risk measurement for one contest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BravoRisk {
    pub pairs: Vec<PairRisk>,
    /// True only when every pair is below the risk limit.
    pub stop: bool,
}

impl BravoRisk {
    pub fn p_value(&self, winner: &str, loser: Option<&str>) -> Option<f64> {
        self.pairs
            .iter()
            .find(|r| r.pair.winner == winner && r.pair.loser.as_deref() == loser)
            .map(|r| r.p_value)
    }

    /// The largest p-value across all pairs, the contest's overall risk.
    pub fn max_p_value(&self) -> f64 {
        self.pairs.iter().map(|r| r.p_value).fold(0.0, f64::max)
    }
}

/// Compute per-pair p-values (`1/T`) and the conjunctive stop decision.
///
/// A tied pair (`swl <= 0.5`) and an uncontested winner are fixed at
/// p = 1 and keep the audit going.
pub fn compute_risk(
    risk_limit: RiskLimit,
    margins: &Margins,
    sample: &SampleResults,
) -> Result<BravoRisk, AuditError> {
    let alpha = risk_limit.alpha();
    let stats = get_test_statistics(margins, sample);

    let mut stop = !stats.is_empty();
    let mut pairs = Vec::with_capacity(stats.len());

    for (pair, t) in stats {
        let swl = pair.loser.as_ref().and_then(|loser| {
            margins
                .winners
                .get(&pair.winner)
                .and_then(|wm| wm.swl.get(loser))
                .copied()
        });

        let p_value = match swl {
            None => 1.0,
            Some(swl) if swl <= 0.5 => 1.0,
            Some(_) => match checked_div(1.0, t, "BRAVO p-value") {
                Ok(p) => p,
                Err(err) => {
                    warn!(pair = %pair, error = %err, "falling back to maximal risk");
                    stop = false;
                    1.0
                }
            },
        };

        if swl.map_or(true, |s| s <= 0.5) || p_value >= alpha {
            stop = false;
        }
        pairs.push(PairRisk { pair, p_value });
    }

    debug!(pairs = pairs.len(), stop, "computed BRAVO risk");

    Ok(BravoRisk { pairs, stop })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rla_margins::contest_margins;
    use rla_types::ContestTally;

    pub(crate) fn fixture(name: &str) -> (ContestTally, SampleResults) {
        let (votes, ballots, winners, sample): (&[u64], u64, usize, &[u64]) = match name {
            "test1" => (&[600, 400], 1000, 1, &[72, 47]),
            "test2" => (&[600, 200, 100], 900, 1, &[25, 18, 5]),
            "test3" => (&[100], 100, 1, &[0]),
            "test4" => (&[100], 100, 1, &[100]),
            "test5" => (&[500, 500], 1000, 1, &[500, 500]),
            "test6" => (&[300, 200, 200], 1000, 1, &[72, 48, 48]),
            "test7" => (&[300, 200, 100], 700, 2, &[30, 25, 10]),
            "test8" => (&[300, 300, 100], 700, 2, &[72, 55, 30]),
            "test9" => (&[300, 200], 700, 2, &[1, 1]),
            "test10" => (&[600, 300, 100], 1000, 2, &[60, 30, 10]),
            other => panic!("unknown fixture {other}"),
        };
        let mut tally = ContestTally::new(ballots).with_num_winners(winners);
        let mut results = SampleResults::new();
        for (i, (v, s)) in votes.iter().zip(sample).enumerate() {
            let cand = format!("cand{}", i + 1);
            tally.set_votes(cand.clone(), *v);
            results.insert(cand, *s);
        }
        (tally, results)
    }

    fn risk_for(name: &str) -> BravoRisk {
        let (tally, sample) = fixture(name);
        let margins = contest_margins(name, &tally).unwrap();
        compute_risk(RiskLimit::new(0.1).unwrap(), &margins, &sample).unwrap()
    }

    fn assert_p(risk: &BravoRisk, winner: &str, loser: Option<&str>, expected: f64) {
        let p = risk.p_value(winner, loser).unwrap();
        assert!((p - expected).abs() < 0.01, "{winner}/{loser:?}: got {p}, expected {expected}");
    }

    #[test]
    fn test_two_candidate_stop_literal() {
        let risk = risk_for("test1");
        assert_p(&risk, "cand1", Some("cand2"), 0.07);
        assert!(risk.stop);
    }

    #[test]
    fn test_one_pair_above_limit_blocks_stop() {
        let risk = risk_for("test2");
        assert_p(&risk, "cand1", Some("cand2"), 10.38);
        assert_p(&risk, "cand1", Some("cand3"), 0.0);
        assert!(!risk.stop);
    }

    #[test]
    fn test_uncontested_never_stops() {
        for name in ["test3", "test4"] {
            let risk = risk_for(name);
            assert_p(&risk, "cand1", None, 1.0);
            assert!(!risk.stop);
        }
        let risk = risk_for("test9");
        assert_p(&risk, "cand1", None, 1.0);
        assert_p(&risk, "cand2", None, 1.0);
        assert!(!risk.stop);
    }

    #[test]
    fn test_tie_never_stops() {
        let risk = risk_for("test5");
        assert_p(&risk, "cand1", Some("cand2"), 1.0);
        assert!(!risk.stop);
    }

    #[test]
    fn test_three_way_and_multi_winner() {
        let risk = risk_for("test6");
        assert_p(&risk, "cand1", Some("cand2"), 0.08);
        assert_p(&risk, "cand1", Some("cand3"), 0.08);
        assert!(risk.stop);

        let risk = risk_for("test7");
        assert_p(&risk, "cand1", Some("cand3"), 0.01);
        assert_p(&risk, "cand2", Some("cand3"), 0.04);
        assert!(risk.stop);

        let risk = risk_for("test8");
        assert_p(&risk, "cand1", Some("cand3"), 0.0);
        assert_p(&risk, "cand2", Some("cand3"), 0.22);
        assert!(!risk.stop);

        let risk = risk_for("test10");
        assert_p(&risk, "cand1", Some("cand3"), 0.0);
        assert_p(&risk, "cand2", Some("cand3"), 0.01);
        assert!(risk.stop);
    }

    #[test]
    fn test_empty_sample_has_unit_statistic() {
        let (tally, _) = fixture("test1");
        let margins = contest_margins("test1", &tally).unwrap();
        let stats = get_test_statistics(&margins, &SampleResults::new());
        assert_eq!(stats[&CandidatePair::new("cand1", "cand2")], 1.0);
    }

    #[test]
    fn test_votes_for_zero_vote_loser_fall_back() {
        let tally = ContestTally::new(10).with_candidate("a", 10).with_candidate("b", 0);
        let margins = contest_margins("z", &tally).unwrap();
        let sample = SampleResults::from([("a".to_string(), 3), ("b".to_string(), 1)]);
        let risk = compute_risk(RiskLimit::new(0.1).unwrap(), &margins, &sample).unwrap();
        assert_eq!(risk.p_value("a", Some("b")), Some(1.0));
        assert!(!risk.stop);
    }

    #[test]
    fn test_max_p_value() {
        let risk = risk_for("test8");
        assert!((risk.max_p_value() - 0.222).abs() < 0.01);
    }
}
