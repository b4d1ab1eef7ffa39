//! Ad predictor layer: scoring and probabilistic selection.
//!
//! Eligible candidates are annotated with a numeric score by a pluggable
//! [`ScoringStrategy`], collected into a predictor map, and consumed by
//! the sampling algorithm in [`sampling`]. Predictor maps are ephemeral:
//! built fresh per serving request, sampled once, then discarded.

pub mod sampling;
pub mod scoring;

use std::collections::BTreeMap;

use crate::domain::{AdEvent, CreativeAd, UserModel};

pub use scoring::{ScoringStrategy, SegmentScoring};

/// A creative candidate annotated with its selection score.
#[derive(Debug, Clone, PartialEq)]
pub struct AdPredictor<T> {
    /// The candidate creative.
    pub creative_ad: T,
    /// Selection score; higher means proportionally more likely to be
    /// chosen by the weighted draw.
    pub score: f64,
}

/// Map of creative instance ID to its predictor.
///
/// A `BTreeMap` keeps iteration order stable, which the cumulative
/// sampling walk relies on.
pub type PredictorMap = BTreeMap<String, AdPredictor<CreativeAd>>;

/// Builds a predictor map from eligible candidates.
///
/// Each candidate is scored against the user model and ad event history;
/// keys are creative instance IDs, so duplicates collapse to a single
/// entry.
#[must_use]
pub fn build_predictor_map(
    candidates: &[CreativeAd],
    user_model: &UserModel,
    ad_events: &[AdEvent],
    strategy: &dyn ScoringStrategy,
) -> PredictorMap {
    candidates
        .iter()
        .map(|candidate| {
            let score = strategy.score(user_model, ad_events, candidate);
            (
                candidate.creative_instance_id.clone(),
                AdPredictor {
                    creative_ad: candidate.clone(),
                    score,
                },
            )
        })
        .collect()
}
