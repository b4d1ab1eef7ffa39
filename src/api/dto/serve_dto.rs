//! Serving endpoint DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CreativeAd;
use crate::error::ServingError;

/// Request body for `POST /serve`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ServeAdRequest {
    /// Requested ad type (e.g. `inline_content_ad`).
    pub ad_type: String,
    /// Placement shape (e.g. `300x250`).
    pub dimensions: String,
    /// Interest segments for targeting, most specific first.
    #[serde(default)]
    pub segments: Vec<String>,
}

/// A catalog creative as exposed over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreativeAdDto {
    /// Creative asset identifier.
    pub creative_instance_id: String,
    /// Creative set identifier.
    pub creative_set_id: String,
    /// Campaign identifier.
    pub campaign_id: String,
    /// Advertiser identifier.
    pub advertiser_id: String,
    /// Interest segment.
    pub segment: String,
    /// Ad type (snake_case).
    pub ad_type: String,
    /// Placement shape.
    pub dimensions: String,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Asset image URL.
    pub image_url: String,
    /// Call-to-action text.
    pub cta_text: String,
    /// Click-through target URL.
    pub target_url: String,
    /// Subdivision codes this creative is limited to; empty means
    /// everywhere.
    #[serde(default)]
    pub geo_targets: Vec<String>,
    /// Deposit value per confirmation.
    #[serde(default)]
    pub value: f64,
}

impl From<CreativeAd> for CreativeAdDto {
    fn from(ad: CreativeAd) -> Self {
        Self {
            creative_instance_id: ad.creative_instance_id,
            creative_set_id: ad.creative_set_id,
            campaign_id: ad.campaign_id,
            advertiser_id: ad.advertiser_id,
            segment: ad.segment,
            ad_type: ad.ad_type.as_str().to_string(),
            dimensions: ad.dimensions,
            title: ad.title,
            description: ad.description,
            image_url: ad.image_url,
            cta_text: ad.cta_text,
            target_url: ad.target_url,
            geo_targets: ad.geo_targets,
            value: ad.value,
        }
    }
}

impl TryFrom<CreativeAdDto> for CreativeAd {
    type Error = ServingError;

    fn try_from(dto: CreativeAdDto) -> Result<Self, Self::Error> {
        Ok(Self {
            creative_instance_id: dto.creative_instance_id,
            creative_set_id: dto.creative_set_id,
            campaign_id: dto.campaign_id,
            advertiser_id: dto.advertiser_id,
            segment: dto.segment,
            ad_type: dto.ad_type.parse()?,
            dimensions: dto.dimensions,
            title: dto.title,
            description: dto.description,
            image_url: dto.image_url,
            cta_text: dto.cta_text,
            target_url: dto.target_url,
            geo_targets: dto.geo_targets,
            value: dto.value,
        })
    }
}

/// Response body for `POST /serve`.
///
/// `ad` is `null` when no eligible creative survived the pipeline; the
/// request still succeeds with status 200.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServeAdResponse {
    /// Placement created for this serve, when an ad was chosen.
    pub placement_id: Option<uuid::Uuid>,
    /// Placement shape that was requested.
    pub dimensions: String,
    /// The chosen creative, if any.
    pub ad: Option<CreativeAdDto>,
    /// Whether eligible inventory existed for the request.
    pub had_opportunity: bool,
    /// Server timestamp of the serving decision.
    pub served_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::AdType;

    #[test]
    fn creative_dto_round_trips_through_domain() {
        let dto = CreativeAdDto {
            creative_instance_id: "ci-1".to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "ad-1".to_string(),
            segment: "travel".to_string(),
            ad_type: "inline_content_ad".to_string(),
            dimensions: "300x250".to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            image_url: "https://example.com/i.png".to_string(),
            cta_text: "Go".to_string(),
            target_url: "https://example.com".to_string(),
            geo_targets: vec!["US-CA".to_string()],
            value: 0.02,
        };
        let Ok(domain) = CreativeAd::try_from(dto) else {
            panic!("conversion failed");
        };
        assert_eq!(domain.ad_type, AdType::InlineContentAd);

        let back = CreativeAdDto::from(domain);
        assert_eq!(back.ad_type, "inline_content_ad");
        assert_eq!(back.geo_targets, vec!["US-CA".to_string()]);
    }

    #[test]
    fn unknown_ad_type_is_rejected() {
        let dto = CreativeAdDto {
            creative_instance_id: "ci-1".to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "ad-1".to_string(),
            segment: "travel".to_string(),
            ad_type: "banner".to_string(),
            dimensions: "300x250".to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            image_url: "https://example.com/i.png".to_string(),
            cta_text: "Go".to_string(),
            target_url: "https://example.com".to_string(),
            geo_targets: vec![],
            value: 0.0,
        };
        assert!(CreativeAd::try_from(dto).is_err());
    }
}
