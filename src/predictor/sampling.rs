//! Weighted probabilistic selection over scored candidates.
//!
//! Roulette-wheel sampling: a uniform draw in `[0, sum_of_scores)` is
//! walked against the cumulative scores in predictor map order. Two
//! edge cases are fixed contract: a zero normalizing constant selects
//! nothing, and a single nonzero score is selected deterministically.

use rand::Rng;

use super::{AdPredictor, PredictorMap};

/// Sums a score vector. Exact for integer scores, floating-point sum
/// for doubles.
#[must_use]
pub fn normalizing_constant<T>(scores: &[T]) -> T
where
    T: Copy + std::iter::Sum<T>,
{
    scores.iter().copied().sum()
}

/// Sums the scores of every predictor in the map. `0.0` for an empty map.
#[must_use]
pub fn normalizing_constant_for_predictors(predictors: &PredictorMap) -> f64 {
    predictors.values().map(|p| p.score).sum()
}

/// Normalizes scores into probabilities (`scores[i] / sum`).
///
/// An all-zero input yields an all-zero output rather than dividing
/// by zero.
#[must_use]
pub fn compute_probabilities(scores: &[f64]) -> Vec<f64> {
    let total = normalizing_constant(scores);
    if total == 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|score| score / total).collect()
}

/// Draws one creative from the predictor map, weighted by score.
///
/// Returns `None` when the normalizing constant is zero (no candidate
/// can be chosen). When exactly one candidate has a nonzero score the
/// walk always lands on it, so that candidate is returned on every
/// call.
#[must_use]
pub fn sample_ad_from_predictors<T: Clone>(
    predictors: &std::collections::BTreeMap<String, AdPredictor<T>>,
) -> Option<T> {
    let total: f64 = predictors.values().map(|p| p.score).sum();
    if total <= 0.0 {
        return None;
    }

    let draw = rand::rng().random_range(0.0..total);

    let mut cumulative = 0.0;
    let mut last_nonzero: Option<&AdPredictor<T>> = None;
    for predictor in predictors.values() {
        cumulative += predictor.score;
        if cumulative > draw {
            return Some(predictor.creative_ad.clone());
        }
        if predictor.score > 0.0 {
            last_nonzero = Some(predictor);
        }
    }

    // Floating-point accumulation can leave the draw unreached by a hair;
    // fall back to the last selectable candidate.
    last_nonzero.map(|p| p.creative_ad.clone())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn predictors_from_scores(scores: &[f64]) -> BTreeMap<String, AdPredictor<String>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let key = format!("ci-{i}");
                (
                    key.clone(),
                    AdPredictor {
                        creative_ad: key,
                        score: *score,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn normalizing_constant_is_exact_for_integers() {
        assert_eq!(normalizing_constant(&[1, 2, 3, 4, 5]), 15);
    }

    #[test]
    fn normalizing_constant_sums_doubles() {
        let sum: f64 = normalizing_constant(&[1.3, 2.7, 3.1, 4.8, 5.2]);
        assert!((sum - 17.1).abs() < 1e-9);
    }

    #[test]
    fn normalizing_constant_of_empty_map_is_zero() {
        let predictors: PredictorMap = BTreeMap::new();
        assert_eq!(normalizing_constant_for_predictors(&predictors), 0.0);
    }

    #[test]
    fn probabilities_divide_by_the_sum() {
        assert_eq!(
            compute_probabilities(&[1.0, 0.0, 5.0, 4.0]),
            vec![0.1, 0.0, 0.5, 0.4]
        );
    }

    #[test]
    fn probabilities_of_all_zero_scores_are_zero() {
        assert_eq!(compute_probabilities(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn zero_total_selects_nothing() {
        let predictors = predictors_from_scores(&[0.0, 0.0, 0.0]);
        assert!(sample_ad_from_predictors(&predictors).is_none());
    }

    #[test]
    fn empty_map_selects_nothing() {
        let predictors: BTreeMap<String, AdPredictor<String>> = BTreeMap::new();
        assert!(sample_ad_from_predictors(&predictors).is_none());
    }

    #[test]
    fn single_nonzero_score_is_deterministic() {
        let predictors = predictors_from_scores(&[0.0, 0.7, 0.0]);
        for _ in 0..10 {
            let chosen = sample_ad_from_predictors(&predictors);
            assert_eq!(chosen.as_deref(), Some("ci-1"));
        }
    }

    #[test]
    fn equal_scores_reach_every_candidate() {
        // With two equal weights the odds of 25 draws all landing on the
        // same side are below 1 in 100M.
        let predictors = predictors_from_scores(&[1.0, 1.0]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..25 {
            if let Some(chosen) = sample_ad_from_predictors(&predictors) {
                seen.insert(chosen);
            }
        }
        assert_eq!(seen.len(), 2);
    }
}
