//! Margin computation.

use std::collections::BTreeMap;

use rla_types::{AuditError, ContestTally, LoserMargin, Margins, WinnerMargin};
use tracing::debug;

/// Compute margins for every contest.
pub fn compute_margins(
    contests: &BTreeMap<String, ContestTally>,
) -> Result<BTreeMap<String, Margins>, AuditError> {
    contests
        .iter()
        .map(|(name, tally)| contest_margins(name, tally).map(|m| (name.clone(), m)))
        .collect()
}

/// Compute margins for one contest.
///
/// Candidates are ranked by votes descending (ties keep insertion order) and
/// the top `num_winners` are the reported winners.
pub fn contest_margins(name: &str, tally: &ContestTally) -> Result<Margins, AuditError> {
    tally.validate(name)?;

    let ballots = tally.ballots as f64;
    let total_votes = tally.total_votes() as f64;

    let ranked = tally.ranked();
    let split = tally.num_winners.min(ranked.len());
    let (winners, losers) = ranked.split_at(split);

    let losers: BTreeMap<String, LoserMargin> = losers
        .iter()
        .map(|(cand, votes)| {
            (
                cand.to_string(),
                LoserMargin {
                    p_l: *votes as f64 / ballots,
                    s_l: *votes as f64 / total_votes,
                },
            )
        })
        .collect();

    let winners: BTreeMap<String, WinnerMargin> = winners
        .iter()
        .map(|(cand, votes)| {
            let s_w = *votes as f64 / total_votes;
            // A zero-vote pair has no two-candidate vote to split.
            let swl = losers
                .iter()
                .map(|(loser, lm)| {
                    let both = s_w + lm.s_l;
                    let share = if both > 0.0 { s_w / both } else { 0.5 };
                    (loser.clone(), share)
                })
                .collect();
            (
                cand.to_string(),
                WinnerMargin {
                    p_w: *votes as f64 / ballots,
                    s_w,
                    swl,
                },
            )
        })
        .collect();

    debug!(
        contest = name,
        winners = winners.len(),
        losers = losers.len(),
        "computed margins"
    );

    Ok(Margins { winners, losers })
}
