use proptest::prelude::*;

use rla_macro::{batch_weights, compute_max_error, compute_risk, SampledBatch};
use rla_margins::compute_margins;
use rla_types::{
    BatchContestTally, BatchKey, BatchResults, BatchTally, ContestTally, RiskLimit,
};

fn contests() -> std::collections::BTreeMap<String, ContestTally> {
    std::collections::BTreeMap::from([(
        "c".to_string(),
        ContestTally::new(1000)
            .with_candidate("w", 510)
            .with_candidate("l", 490),
    )])
}

fn tally(w: u64, l: u64, undervotes: u64) -> BatchTally {
    BatchTally::from([(
        "c".to_string(),
        BatchContestTally::new(w + l + undervotes)
            .with_votes("w", w)
            .with_votes("l", l),
    )])
}

fn batches() -> impl Strategy<Value = Vec<(u64, u64, u64)>> {
    prop::collection::vec((0u64..60, 0u64..60, 0u64..10), 1..30)
}

/// Batches with at least one ballot, so every one has a positive error bound.
fn drawable_batches() -> impl Strategy<Value = Vec<(u64, u64, u64)>> {
    prop::collection::vec((0u64..60, 0u64..60, 1u64..10), 1..30)
}

fn results(rows: &[(u64, u64, u64)]) -> BatchResults {
    rows.iter()
        .enumerate()
        .map(|(i, (w, l, u))| (BatchKey::new("J", format!("b{i:03}")), tally(*w, *l, *u)))
        .collect()
}

proptest! {
    /// Each weight is the whole number of minimal error bounds that fit in the batch's bound.
    #[test]
    fn weights_are_floor_of_error_ratio(rows in batches()) {
        let contests = contests();
        let margins = compute_margins(&contests).unwrap();
        let results = results(&rows);
        let Ok(weights) = batch_weights(&results, &contests, &margins) else {
            return Ok(());
        };

        let errors: Vec<f64> = results
            .iter()
            .map(|(_, b)| compute_max_error(b, &contests, &margins).unwrap())
            .collect();
        let u_min = errors.iter().copied().filter(|u| *u > 0.0).fold(f64::INFINITY, f64::min);

        for ((_, weight), u) in weights.iter().zip(&errors) {
            let ratio = u / u_min;
            prop_assert!(*weight as f64 <= ratio + 1e-9, "weight={weight} ratio={ratio}");
            prop_assert!(ratio < *weight as f64 + 1.0 + 1e-9, "weight={weight} ratio={ratio}");
            prop_assert_eq!(*weight == 0, *u == 0.0);
        }
    }

    /// Auditing more batches that match their reports never raises the risk.
    #[test]
    fn clean_batches_never_raise_risk(rows in drawable_batches(), alpha in 0.01f64..0.3) {
        let contests = contests();
        let margins = compute_margins(&contests).unwrap();
        let results = results(&rows);
        let risk_limit = RiskLimit::new(alpha).unwrap();

        let sample: Vec<SampledBatch> = results
            .iter()
            .map(|(key, b)| SampledBatch { batch: key.clone(), audited: b.clone() })
            .collect();

        let mut previous = 1.0;
        for n in 0..=sample.len() {
            let risk = compute_risk(risk_limit, &sample[..n], &results, &contests, &margins).unwrap();
            prop_assert!(risk.p_value <= previous + 1e-12);
            previous = risk.p_value;
        }
    }
}
