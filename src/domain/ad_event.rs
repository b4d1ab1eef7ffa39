//! Ad lifecycle event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AdType, ConfirmationType, CreativeAd, PlacementId};

/// One row of the append-only ad event log.
///
/// Exactly one `served` event exists per placement; viewed, clicked,
/// and dismissed events share that placement's creative lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdEvent {
    /// Placement this event belongs to.
    pub placement_id: PlacementId,
    /// Creative asset identifier.
    pub creative_instance_id: String,
    /// Creative set identifier.
    pub creative_set_id: String,
    /// Campaign identifier.
    pub campaign_id: String,
    /// Advertiser identifier.
    pub advertiser_id: String,
    /// Ad unit type lineage.
    pub ad_type: AdType,
    /// Lifecycle event kind.
    pub confirmation_type: ConfirmationType,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

impl AdEvent {
    /// Builds an event for a creative chosen by the serving pipeline.
    #[must_use]
    pub fn for_creative(
        creative: &CreativeAd,
        placement_id: PlacementId,
        confirmation_type: ConfirmationType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            placement_id,
            creative_instance_id: creative.creative_instance_id.clone(),
            creative_set_id: creative.creative_set_id.clone(),
            campaign_id: creative.campaign_id.clone(),
            advertiser_id: creative.advertiser_id.clone(),
            ad_type: creative.ad_type,
            confirmation_type,
            created_at,
        }
    }

    /// Builds a follow-up event (viewed/clicked/...) sharing this
    /// event's placement and creative lineage.
    #[must_use]
    pub fn follow_up(&self, confirmation_type: ConfirmationType, created_at: DateTime<Utc>) -> Self {
        Self {
            confirmation_type,
            created_at,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_creative() -> CreativeAd {
        CreativeAd {
            creative_instance_id: "ci-1".to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "ad-1".to_string(),
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

    #[test]
    fn for_creative_copies_lineage() {
        let placement_id = PlacementId::new();
        let event = AdEvent::for_creative(
            &make_creative(),
            placement_id,
            ConfirmationType::Served,
            Utc::now(),
        );
        assert_eq!(event.placement_id, placement_id);
        assert_eq!(event.creative_instance_id, "ci-1");
        assert_eq!(event.campaign_id, "ca-1");
        assert_eq!(event.confirmation_type, ConfirmationType::Served);
    }

    #[test]
    fn follow_up_keeps_placement_and_lineage() {
        let served = AdEvent::for_creative(
            &make_creative(),
            PlacementId::new(),
            ConfirmationType::Served,
            Utc::now(),
        );
        let viewed = served.follow_up(ConfirmationType::Viewed, Utc::now());
        assert_eq!(viewed.placement_id, served.placement_id);
        assert_eq!(viewed.creative_instance_id, served.creative_instance_id);
        assert_eq!(viewed.confirmation_type, ConfirmationType::Viewed);
    }
}
