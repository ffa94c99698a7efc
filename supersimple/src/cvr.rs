//! Cast vote records and per-ballot discrepancies.

use std::collections::BTreeMap;

use rla_types::{AuditError, Contest};
use serde::{Deserialize, Serialize};

/// Votes on one ballot: contest name to candidate to votes (0 or 1).
pub type BallotCvr = BTreeMap<String, BTreeMap<String, u64>>;

/// Ballot id to that ballot's record.
pub type Cvrs = BTreeMap<String, BallotCvr>;

/// Discrepancies observed so far, the input to follow-up sample sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyCounts {
    pub sample_size: u64,
    #[serde(rename = "1-over")]
    pub one_vote_over: u64,
    #[serde(rename = "1-under")]
    pub one_vote_under: u64,
    #[serde(rename = "2-over")]
    pub two_vote_over: u64,
    #[serde(rename = "2-under")]
    pub two_vote_under: u64,
}

/// Overstatement of one winner/loser pair on one ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PairDiscrepancy {
    /// `(v_w - a_w) - (v_l - a_l)`, in votes.
    pub(crate) votes: i64,
    /// Reported contest-wide `V_wl`, always positive.
    pub(crate) margin: i64,
}

impl PairDiscrepancy {
    pub(crate) fn relative(&self) -> f64 {
        self.votes as f64 / self.margin as f64
    }
}

fn votes(cvr: &BallotCvr, contest: &str, candidate: &str) -> i64 {
    cvr.get(contest)
        .and_then(|c| c.get(candidate))
        .map_or(0, |v| *v as i64)
}

/// Whether the audited ballot carries the contest at all.
pub(crate) fn in_contest(contest: &Contest, audited: &BallotCvr) -> bool {
    audited.contains_key(&contest.name)
}

/// Discrepancy of every winner/loser pair for one sampled ballot.
///
/// A ballot with no reported CVR is taken as a two-vote overstatement for
/// every pair.
pub(crate) fn ballot_discrepancies(
    contest: &Contest,
    reported: Option<&BallotCvr>,
    audited: &BallotCvr,
) -> Result<Vec<PairDiscrepancy>, AuditError> {
    let mut pairs = Vec::with_capacity(contest.winners.len() * contest.losers.len());
    for winner in &contest.winners {
        for loser in &contest.losers {
            let margin = contest.votes(winner) as i64 - contest.votes(loser) as i64;
            if margin <= 0 {
                return Err(AuditError::degenerate(
                    contest.name.as_str(),
                    format!("reported margin of {winner} over {loser} is {margin}"),
                ));
            }
            let votes = match reported {
                Some(cvr) => {
                    let name = contest.name.as_str();
                    (votes(cvr, name, winner) - votes(audited, name, winner))
                        - (votes(cvr, name, loser) - votes(audited, name, loser))
                }
                None => 2,
            };
            pairs.push(PairDiscrepancy { votes, margin });
        }
    }
    Ok(pairs)
}

/// Classify every sampled ballot in the contest by its worst pair.
///
/// Overstatements take precedence: a ballot that overstates one pair and
/// understates another counts as an overstatement.
pub fn count_discrepancies(
    contest: &Contest,
    cvrs: &Cvrs,
    sample_cvr: &Cvrs,
) -> Result<DiscrepancyCounts, AuditError> {
    let mut counts = DiscrepancyCounts::default();
    for (ballot, audited) in sample_cvr {
        if !in_contest(contest, audited) {
            continue;
        }
        counts.sample_size += 1;

        let pairs = ballot_discrepancies(contest, cvrs.get(ballot), audited)?;
        let over = pairs.iter().map(|d| d.votes).max().unwrap_or(0);
        let under = pairs.iter().map(|d| d.votes).min().unwrap_or(0);
        match (over, under) {
            (o, _) if o >= 2 => counts.two_vote_over += 1,
            (1, _) => counts.one_vote_over += 1,
            (_, u) if u <= -2 => counts.two_vote_under += 1,
            (_, -1) => counts.one_vote_under += 1,
            _ => {}
        }
    }
    Ok(counts)
}
