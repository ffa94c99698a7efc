//! Per-batch error bounds.
//!
//! Every quantity here is normalized by the reported contest-wide margin
//! `V_wl` between a winner and a loser, and a batch's value is the worst
//! case over every winner/loser pair of every contest it reports on.
//! Contests without margins are not under audit and are skipped.

use rla_types::{AuditError, BatchContestTally, BatchResults, BatchTally, ContestTally};
use tracing::debug;

use crate::ratio::Ratio;
use crate::{ContestMargins, ContestTallies};

fn signed(votes: u64) -> i128 {
    i128::from(votes)
}

/// Reported `V_wl`. A non-positive difference cannot be audited by
/// comparison.
fn reported_margin(
    contest: &str,
    tally: &ContestTally,
    winner: &str,
    loser: &str,
) -> Result<i128, AuditError> {
    let v_wl = signed(tally.votes(winner).unwrap_or(0)) - signed(tally.votes(loser).unwrap_or(0));
    if v_wl <= 0 {
        return Err(AuditError::degenerate(
            contest,
            format!("reported margin of {winner} over {loser} is {v_wl}"),
        ));
    }
    Ok(v_wl)
}

/// Largest `numerator(pair) / V_wl` over every audited pair in `batch`.
fn worst_pair<F>(
    batch: &BatchTally,
    contests: &ContestTallies,
    margins: &ContestMargins,
    mut numerator: F,
) -> Result<Ratio, AuditError>
where
    F: FnMut(&str, &BatchContestTally, &str, &str) -> i128,
{
    let mut worst = Ratio::ZERO;
    for (contest, batch_tally) in batch {
        let Some(contest_margins) = margins.get(contest) else {
            continue;
        };
        let tally = contests
            .get(contest)
            .ok_or_else(|| AuditError::degenerate(contest.as_str(), "no reported contest tally"))?;
        for winner in contest_margins.winners.keys() {
            for loser in contest_margins.losers.keys() {
                let v_wl = reported_margin(contest, tally, winner, loser)?;
                let num = numerator(contest.as_str(), batch_tally, winner, loser);
                worst = worst.max(Ratio::new(num, v_wl));
            }
        }
    }
    Ok(worst)
}

pub(crate) fn max_error_ratio(
    batch: &BatchTally,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<Ratio, AuditError> {
    worst_pair(batch, contests, margins, |_, reported, winner, loser| {
        signed(reported.votes_for(winner)) - signed(reported.votes_for(loser))
            + signed(reported.ballots)
    })
}

/// Maximum relative overstatement `u_p` a batch could hide:
/// `((v_w - v_l) + b) / V_wl`, maximized over pairs.
pub fn compute_max_error(
    batch: &BatchTally,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<f64, AuditError> {
    Ok(max_error_ratio(batch, contests, margins)?.to_f64())
}

/// Observed relative overstatement `e_p` of an audited batch:
/// `((v_w - v_l) - (a_w - a_l)) / V_wl`, maximized over pairs and floored
/// at zero. A contest missing from the audited tally counts as no votes.
pub fn compute_error(
    reported: &BatchTally,
    audited: &BatchTally,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<f64, AuditError> {
    let worst = worst_pair(reported, contests, margins, |contest, batch, winner, loser| {
        let (a_w, a_l) = audited
            .get(contest)
            .map(|a| (a.votes_for(winner), a.votes_for(loser)))
            .unwrap_or((0, 0));
        (signed(batch.votes_for(winner)) - signed(batch.votes_for(loser)))
            - (signed(a_w) - signed(a_l))
    })?;
    Ok(worst.to_f64())
}

/// Total error bound `U`, the sum of every batch's `u_p`.
pub fn compute_u(
    batch_results: &BatchResults,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<f64, AuditError> {
    if batch_results.is_empty() {
        return Err(AuditError::MissingBatchResults);
    }
    let u = batch_results
        .iter()
        .map(|(_, batch)| compute_max_error(batch, contests, margins))
        .sum::<Result<f64, AuditError>>()?;
    debug!(batches = batch_results.len(), u, "computed total error bound");
    Ok(u)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rla_margins::compute_margins;
    use rla_types::BatchKey;

    pub(crate) fn two_way_contests() -> ContestTallies {
        ContestTallies::from([(
            "test1".to_string(),
            ContestTally::new(1000)
                .with_candidate("cand1", 600)
                .with_candidate("cand2", 400),
        )])
    }

    pub(crate) fn batch(cand1: u64, cand2: u64, ballots: u64) -> BatchTally {
        BatchTally::from([(
            "test1".to_string(),
            BatchContestTally::new(ballots)
                .with_votes("cand1", cand1)
                .with_votes("cand2", cand2),
        )])
    }

    fn margins_for(contests: &ContestTallies) -> ContestMargins {
        compute_margins(contests).unwrap()
    }

    #[test]
    fn test_max_error_literal() {
        let contests = two_way_contests();
        let margins = margins_for(&contests);
        // ((40 - 10) + 50) / 200
        let u = compute_max_error(&batch(40, 10, 50), &contests, &margins).unwrap();
        assert!((u - 0.4).abs() < 1e-12);
        let u = compute_max_error(&batch(20, 30, 50), &contests, &margins).unwrap();
        assert!((u - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_max_error_takes_worst_contest() {
        let mut contests = two_way_contests();
        contests.insert(
            "test2".to_string(),
            ContestTally::new(1000)
                .with_candidate("a", 520)
                .with_candidate("b", 480),
        );
        let margins = margins_for(&contests);
        let mut tally = batch(40, 10, 50);
        tally.insert(
            "test2".to_string(),
            BatchContestTally::new(50).with_votes("a", 25).with_votes("b", 25),
        );
        // test2: (0 + 50) / 40 = 1.25 beats test1's 0.4
        let u = compute_max_error(&tally, &contests, &margins).unwrap();
        assert!((u - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_untargeted_contest_is_skipped() {
        let contests = two_way_contests();
        let margins = ContestMargins::new();
        let u = compute_max_error(&batch(40, 10, 50), &contests, &margins).unwrap();
        assert_eq!(u, 0.0);
    }

    #[test]
    fn test_error_is_zero_for_clean_audit() {
        let contests = two_way_contests();
        let margins = margins_for(&contests);
        let reported = batch(40, 10, 50);
        let e = compute_error(&reported, &reported, &contests, &margins).unwrap();
        assert_eq!(e, 0.0);
    }

    #[test]
    fn test_error_counts_overstatement_only() {
        let contests = two_way_contests();
        let margins = margins_for(&contests);
        let reported = batch(40, 10, 50);
        // Two votes moved from winner to loser: (30 - 26) / 200
        let e = compute_error(&reported, &batch(38, 12, 50), &contests, &margins).unwrap();
        assert!((e - 0.02).abs() < 1e-12);
        // Understatement floors at zero
        let e = compute_error(&reported, &batch(45, 5, 50), &contests, &margins).unwrap();
        assert_eq!(e, 0.0);
        // A missing audited contest is read as zero votes
        let e = compute_error(&reported, &BatchTally::new(), &contests, &margins).unwrap();
        assert!((e - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_u_sums_batches() {
        let contests = two_way_contests();
        let margins = margins_for(&contests);
        let results = BatchResults::new()
            .with_contest(BatchKey::new("J1", "pct 1"), "test1", batch(40, 10, 50)["test1"].clone())
            .with_contest(BatchKey::new("J1", "pct 2"), "test1", batch(20, 30, 50)["test1"].clone());
        let u = compute_u(&results, &contests, &margins).unwrap();
        assert!((u - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_results_are_missing() {
        let contests = two_way_contests();
        let margins = margins_for(&contests);
        assert_eq!(
            compute_u(&BatchResults::new(), &contests, &margins),
            Err(AuditError::MissingBatchResults)
        );
    }

    #[test]
    fn test_reported_tie_is_degenerate() {
        let contests = ContestTallies::from([(
            "test1".to_string(),
            ContestTally::new(1000)
                .with_candidate("cand1", 500)
                .with_candidate("cand2", 500),
        )]);
        let margins = margins_for(&contests);
        assert!(matches!(
            compute_max_error(&batch(40, 10, 50), &contests, &margins),
            Err(AuditError::DegenerateContest { .. })
        ));
    }
}
