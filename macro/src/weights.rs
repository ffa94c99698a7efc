//! PPEB sampling weights.

use rla_types::{AuditError, BatchKey, BatchResults};
use tracing::debug;

use crate::error_bound::max_error_ratio;
use crate::ratio::Ratio;
use crate::{ContestMargins, ContestTallies};

/// Integer sampling weight for every batch, proportional to its maximum
/// error: `floor(u_p / u_min)` where `u_min` is the smallest nonzero `u_p`.
///
/// Weights are derived from exact fractions, so batches whose error bounds
/// stand in an integer ratio get exactly that ratio of weight. Batches that
/// cannot overstate anything get weight 0 and are never drawn.
pub fn batch_weights(
    batch_results: &BatchResults,
    contests: &ContestTallies,
    margins: &ContestMargins,
) -> Result<Vec<(BatchKey, u64)>, AuditError> {
    if batch_results.is_empty() {
        return Err(AuditError::MissingBatchResults);
    }

    let errors = batch_results
        .iter()
        .map(|(key, batch)| max_error_ratio(batch, contests, margins).map(|u| (key.clone(), u)))
        .collect::<Result<Vec<(BatchKey, Ratio)>, AuditError>>()?;

    let u_min = errors
        .iter()
        .map(|(_, u)| *u)
        .filter(Ratio::is_positive)
        .min()
        .ok_or_else(|| {
            AuditError::ArithmeticDomain("no batch has a positive error bound".to_string())
        })?;

    let weights: Vec<(BatchKey, u64)> = errors
        .into_iter()
        .map(|(key, u)| (key, u.floor_div(u_min)))
        .collect();

    debug!(
        batches = weights.len(),
        u_min = u_min.to_f64(),
        "computed batch weights"
    );
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_bound::tests::{batch, two_way_contests};
    use rla_margins::compute_margins;

    fn results(batches: &[(&str, (u64, u64, u64))]) -> BatchResults {
        batches
            .iter()
            .map(|(name, (w, l, b))| (BatchKey::new("J1", *name), batch(*w, *l, *b)))
            .collect()
    }

    fn weight_of(weights: &[(BatchKey, u64)], name: &str) -> u64 {
        weights
            .iter()
            .find(|(k, _)| k.batch == name)
            .map(|(_, w)| *w)
            .unwrap()
    }

    #[test]
    fn test_weights_follow_error_ratio() {
        let contests = two_way_contests();
        let margins = compute_margins(&contests).unwrap();
        // 0.4 and 0.2
        let results = results(&[("pct 1", (40, 10, 50)), ("pct 2", (20, 30, 50))]);
        let weights = batch_weights(&results, &contests, &margins).unwrap();
        assert_eq!(weight_of(&weights, "pct 1"), 2);
        assert_eq!(weight_of(&weights, "pct 2"), 1);
    }

    #[test]
    fn test_ten_and_ten_batches_weigh_two_to_one() {
        let contests = two_way_contests();
        let margins = compute_margins(&contests).unwrap();
        let mut rows = Vec::new();
        let names: Vec<String> = (0..20).map(|i| format!("pct {i:02}")).collect();
        for (i, name) in names.iter().enumerate() {
            // (10 - 4 + 10) / 200 = 0.08, (5 - 5 + 8) / 200 = 0.04
            let tally = if i < 10 { (10, 4, 10) } else { (5, 5, 8) };
            rows.push((name.as_str(), tally));
        }
        let weights = batch_weights(&results(&rows), &contests, &margins).unwrap();
        for (i, name) in names.iter().enumerate() {
            let expected = if i < 10 { 2 } else { 1 };
            assert_eq!(weight_of(&weights, name), expected, "{name}");
        }
    }

    #[test]
    fn test_zero_error_batch_gets_zero_weight() {
        let contests = two_way_contests();
        let margins = compute_margins(&contests).unwrap();
        let results = results(&[("pct 1", (40, 10, 50)), ("empty", (0, 0, 0))]);
        let weights = batch_weights(&results, &contests, &margins).unwrap();
        assert_eq!(weight_of(&weights, "pct 1"), 1);
        assert_eq!(weight_of(&weights, "empty"), 0);
    }

    #[test]
    fn test_no_positive_error_is_rejected() {
        let contests = two_way_contests();
        let margins = compute_margins(&contests).unwrap();
        let results = results(&[("empty", (0, 0, 0))]);
        let err = batch_weights(&results, &contests, &margins).unwrap_err();
        assert!(err.is_arithmetic_domain());
        assert_eq!(
            batch_weights(&BatchResults::new(), &contests, &margins),
            Err(AuditError::MissingBatchResults)
        );
    }
}
