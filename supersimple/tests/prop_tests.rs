use proptest::prelude::*;

use rla_supersimple::{get_sample_sizes, DiscrepancyCounts};
use rla_types::{Contest, ContestTally, RiskLimitPercent};

fn two_way(winner: u64, loser: u64, ballots: u64) -> Contest {
    let tally = ContestTally::new(ballots)
        .with_candidate("w", winner)
        .with_candidate("l", loser);
    Contest::from_tally("prop", tally).unwrap()
}

proptest! {
    /// Narrowing the margin never shrinks the sample.
    #[test]
    fn smaller_margin_needs_more_ballots(
        loser in 1000u64..40_000,
        lead in 2u64..20_000,
        shrink in 1u64..1000,
        pct in 1u32..50,
    ) {
        let ballots = 100_000;
        let risk_limit = RiskLimitPercent::new(pct).unwrap();
        let none = DiscrepancyCounts::default();

        let wide = two_way(loser + lead, loser, ballots);
        let narrow = two_way(loser + lead.saturating_sub(shrink).max(1), loser, ballots);

        let n_wide = get_sample_sizes(risk_limit, &wide, &none).unwrap();
        let n_narrow = get_sample_sizes(risk_limit, &narrow, &none).unwrap();
        prop_assert!(
            n_narrow >= n_wide,
            "wide dm={} n={n_wide}, narrow dm={} n={n_narrow}",
            wide.diluted_margin,
            narrow.diluted_margin
        );
    }

    /// A first round that finds no discrepancies never raises the next size.
    #[test]
    fn clean_round_does_not_increase_size(
        loser in 1000u64..40_000,
        lead in 100u64..20_000,
        pct in 1u32..50,
    ) {
        let contest = two_way(loser + lead, loser, 100_000);
        let risk_limit = RiskLimitPercent::new(pct).unwrap();

        let first = get_sample_sizes(risk_limit, &contest, &DiscrepancyCounts::default()).unwrap();
        let clean = DiscrepancyCounts { sample_size: first, ..Default::default() };
        let second = get_sample_sizes(risk_limit, &contest, &clean).unwrap();
        prop_assert!(second <= first, "first={first} second={second}");
    }
}
