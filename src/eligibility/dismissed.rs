//! Dismissed-creative exclusion rule.

use std::collections::HashSet;

use crate::domain::{AdEvent, ConfirmationType, CreativeAd};

use super::ExclusionRule;

/// Excludes every creative in a set the user has dismissed.
///
/// Dismissal is tracked at the creative-set level: closing one variant
/// mutes its siblings too.
#[derive(Debug)]
pub struct DismissedRule {
    dismissed_sets: HashSet<String>,
}

impl DismissedRule {
    /// Builds the rule from the ad event history.
    #[must_use]
    pub fn new(ad_events: &[AdEvent]) -> Self {
        let dismissed_sets = ad_events
            .iter()
            .filter(|event| event.confirmation_type == ConfirmationType::Dismissed)
            .map(|event| event.creative_set_id.clone())
            .collect();
        Self { dismissed_sets }
    }
}

impl ExclusionRule for DismissedRule {
    fn name(&self) -> &'static str {
        "dismissed"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.dismissed_sets.contains(&candidate.creative_set_id)
    }
}
