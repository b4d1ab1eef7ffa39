//! Exclusion rule engine.
//!
//! Each rule is an independent predicate over a single candidate; a
//! candidate survives only if no rule excludes it. Rules are built per
//! serving request from the ad event history, browsing history, and
//! targeting inputs, so evaluating a candidate never touches storage.
//! New rules compose without touching existing ones.

pub mod anti_targeting;
pub mod dismissed;
pub mod frequency_caps;
pub mod last_served;
pub mod seen;
pub mod subdivision;

use crate::domain::CreativeAd;

pub use anti_targeting::{AntiTargetingResource, AntiTargetingRule};
pub use dismissed::DismissedRule;
pub use frequency_caps::{AdvertiserCapRule, CampaignCapRule};
pub use last_served::LastServedRule;
pub use seen::AlreadySeenRule;
pub use subdivision::SubdivisionRule;

/// A predicate removing ineligible creatives before scoring.
pub trait ExclusionRule: Send + Sync {
    /// Short rule name used in exclusion logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if the candidate must not be served.
    fn should_exclude(&self, candidate: &CreativeAd) -> bool;
}

impl std::fmt::Debug for dyn ExclusionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusionRule")
            .field("name", &self.name())
            .finish()
    }
}

/// Filters candidates through the rule chain.
///
/// Exclusion is the union of each rule's exclusion set. An empty
/// candidate list short-circuits without invoking any rule.
#[must_use]
pub fn apply_exclusion_rules(
    candidates: Vec<CreativeAd>,
    rules: &[Box<dyn ExclusionRule>],
) -> Vec<CreativeAd> {
    if candidates.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|candidate| {
            for rule in rules {
                if rule.should_exclude(candidate) {
                    tracing::debug!(
                        creative_instance_id = %candidate.creative_instance_id,
                        rule = rule.name(),
                        "creative excluded"
                    );
                    return false;
                }
            }
            true
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{AdType, CreativeAd};

    /// Builds a catalog creative with the given identifiers.
    pub fn make_creative(instance_id: &str, set_id: &str, campaign_id: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: instance_id.to_string(),
            creative_set_id: set_id.to_string(),
            campaign_id: campaign_id.to_string(),
            advertiser_id: "advertiser-1".to_string(),
            segment: "travel".to_string(),
            ad_type: AdType::InlineContentAd,
            dimensions: "300x250".to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            image_url: "https://example.com/i.png".to_string(),
            cta_text: "Go".to_string(),
            target_url: "https://example.com".to_string(),
            geo_targets: vec![],
            value: 0.02,
        }
    }
}
