//! Already-seen exclusion rule.

use std::collections::HashSet;

use crate::domain::{AdEvent, ConfirmationType, CreativeAd};

use super::ExclusionRule;

/// Excludes creative instances the user has already viewed.
#[derive(Debug)]
pub struct AlreadySeenRule {
    viewed: HashSet<String>,
}

impl AlreadySeenRule {
    /// Builds the rule from the ad event history.
    #[must_use]
    pub fn new(ad_events: &[AdEvent]) -> Self {
        let viewed = ad_events
            .iter()
            .filter(|event| event.confirmation_type == ConfirmationType::Viewed)
            .map(|event| event.creative_instance_id.clone())
            .collect();
        Self { viewed }
    }
}

impl ExclusionRule for AlreadySeenRule {
    fn name(&self) -> &'static str {
        "already_seen"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.viewed.contains(&candidate.creative_instance_id)
    }
}
