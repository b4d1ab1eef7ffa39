//! Pluggable candidate scoring.
//!
//! The exact weighting of a production user model is a tuning concern;
//! the serving pipeline only requires that higher scores translate to
//! proportionally higher selection probability. [`SegmentScoring`] is
//! the shipped default and is deliberately simple.

use crate::domain::creative_ad::parent_segment;
use crate::domain::{AdEvent, ConfirmationType, CreativeAd, UserModel};

/// Assigns a selection score to a candidate.
///
/// Implementations must return non-negative scores. A zero score marks
/// the candidate as unselectable by the weighted draw.
pub trait ScoringStrategy: Send + Sync + std::fmt::Debug {
    /// Scores one candidate against the user model and event history.
    fn score(&self, user_model: &UserModel, ad_events: &[AdEvent], candidate: &CreativeAd) -> f64;
}

/// Default segment-match scoring with a novelty discount.
///
/// - exact segment match: 1.0
/// - parent segment match: 0.5
/// - no match: 0.2
///
/// The base weight is divided by `1 + n` where `n` is the number of
/// times the creative instance was already served, so fresh creatives
/// win ties against repeats.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentScoring;

impl ScoringStrategy for SegmentScoring {
    fn score(&self, user_model: &UserModel, ad_events: &[AdEvent], candidate: &CreativeAd) -> f64 {
        let base = if user_model.matches_segment(&candidate.segment) {
            1.0
        } else if user_model
            .segments
            .iter()
            .any(|s| parent_segment(s).eq_ignore_ascii_case(candidate.parent_segment()))
        {
            0.5
        } else {
            0.2
        };

        let times_served = ad_events
            .iter()
            .filter(|event| {
                event.creative_instance_id == candidate.creative_instance_id
                    && event.confirmation_type == ConfirmationType::Served
            })
            .count();

        #[allow(clippy::cast_precision_loss)]
        let discount = 1.0 + times_served as f64;
        base / discount
    }
}
