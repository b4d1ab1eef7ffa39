//! Creative catalog entry.

use serde::{Deserialize, Serialize};

use super::AdType;

/// A specific ad asset owned by the creative catalog.
///
/// Immutable once fetched for a serving attempt; referenced by value
/// during scoring and sampling so concurrent serves never share mutable
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeAd {
    /// Identifies this creative asset.
    pub creative_instance_id: String,
    /// Creative set this asset belongs to (shared targeting rules).
    pub creative_set_id: String,
    /// Owning campaign.
    pub campaign_id: String,
    /// Owning advertiser.
    pub advertiser_id: String,
    /// Interest segment the creative targets (e.g. `technology & computing-software`).
    pub segment: String,
    /// Ad unit type this creative renders as.
    pub ad_type: AdType,
    /// Placement shape, e.g. `300x250`.
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
    /// Geo subdivision codes the creative is restricted to. Empty means
    /// no geo restriction.
    #[serde(default)]
    pub geo_targets: Vec<String>,
    /// Account credit deposited per deposit-worthy confirmation.
    #[serde(default)]
    pub value: f64,
}

impl CreativeAd {
    /// Returns the top-level parent of the targeted segment
    /// (the part before the first `-`).
    #[must_use]
    pub fn parent_segment(&self) -> &str {
        parent_segment(&self.segment)
    }
}

/// Returns the top-level parent of a segment string.
#[must_use]
pub fn parent_segment(segment: &str) -> &str {
    segment.split('-').next().unwrap_or(segment).trim()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parent_segment_strips_child() {
        assert_eq!(parent_segment("technology & computing-software"), "technology & computing");
    }

    #[test]
    fn parent_segment_of_top_level_is_identity() {
        assert_eq!(parent_segment("travel"), "travel");
    }

    #[test]
    fn serde_defaults_optional_fields() {
        let json = r#"{
            "creative_instance_id": "ci-1",
            "creative_set_id": "cs-1",
            "campaign_id": "ca-1",
            "advertiser_id": "ad-1",
            "segment": "travel",
            "ad_type": "inline_content_ad",
            "dimensions": "300x250",
            "title": "t",
            "description": "d",
            "image_url": "https://example.com/i.png",
            "cta_text": "Go",
            "target_url": "https://example.com"
        }"#;
        let ad: Result<CreativeAd, _> = serde_json::from_str(json);
        let Ok(ad) = ad else {
            panic!("deserialization failed");
        };
        assert!(ad.geo_targets.is_empty());
        assert_eq!(ad.value, 0.0);
    }
}
