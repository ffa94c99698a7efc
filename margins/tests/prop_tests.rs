use proptest::prelude::*;

use rla_margins::contest_margins;
use rla_types::ContestTally;

fn build(votes: &[u64], undervotes: u64, num_winners: usize) -> ContestTally {
    let ballots = votes.iter().sum::<u64>() + undervotes;
    let mut tally = ContestTally::new(ballots).with_num_winners(num_winners);
    for (i, v) in votes.iter().enumerate() {
        tally.set_votes(format!("cand{i}"), *v);
    }
    tally
}

proptest! {
    /// `swl` is recomputable from the stored winner and loser shares.
    #[test]
    fn swl_matches_stored_shares(
        votes in prop::collection::vec(1u64..100_000, 2..8),
        undervotes in 0u64..1000,
        num_winners in 1usize..3,
    ) {
        let margins = contest_margins("prop", &build(&votes, undervotes, num_winners)).unwrap();
        for w in margins.winners.values() {
            for (loser, swl) in &w.swl {
                let s_l = margins.losers[loser].s_l;
                prop_assert_eq!(*swl, w.s_w / (w.s_w + s_l));
            }
        }
    }

    /// Winner and loser shares partition the vote, and winners are never behind.
    #[test]
    fn shares_sum_to_one(
        votes in prop::collection::vec(1u64..100_000, 1..8),
        num_winners in 1usize..4,
    ) {
        let margins = contest_margins("prop", &build(&votes, 0, num_winners)).unwrap();
        let total: f64 = margins.winners.values().map(|w| w.s_w).sum::<f64>()
            + margins.losers.values().map(|l| l.s_l).sum::<f64>();
        prop_assert!((total - 1.0).abs() < 1e-9);

        let min_winner = margins.winners.values().map(|w| w.s_w).fold(f64::INFINITY, f64::min);
        for l in margins.losers.values() {
            prop_assert!(l.s_l <= min_winner);
        }
    }

    /// With no undervotes, `p` and `s` coincide.
    #[test]
    fn p_equals_s_without_undervotes(votes in prop::collection::vec(1u64..100_000, 2..6)) {
        let margins = contest_margins("prop", &build(&votes, 0, 1)).unwrap();
        for w in margins.winners.values() {
            prop_assert!((w.p_w - w.s_w).abs() < 1e-12);
        }
        for l in margins.losers.values() {
            prop_assert!((l.p_l - l.s_l).abs() < 1e-12);
        }
    }
}
