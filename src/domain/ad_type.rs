//! Ad unit type enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of ad unit a creative belongs to.
///
/// Each ad type has its own catalog rows, event history lineage, and
/// opt-in switch. Purges and event queries are always scoped to a
/// single ad type so foreign types are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    /// Inline-content ad embedded in a feed, queried by dimensions.
    InlineContentAd,
    /// System notification ad.
    NotificationAd,
    /// New-tab-page background ad.
    NewTabPageAd,
    /// Promoted content card.
    PromotedContentAd,
    /// Search result ad.
    SearchResultAd,
}

impl AdType {
    /// All known ad types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::InlineContentAd,
            Self::NotificationAd,
            Self::NewTabPageAd,
            Self::PromotedContentAd,
            Self::SearchResultAd,
        ]
    }

    /// Returns the snake_case string used in storage and over the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InlineContentAd => "inline_content_ad",
            Self::NotificationAd => "notification_ad",
            Self::NewTabPageAd => "new_tab_page_ad",
            Self::PromotedContentAd => "promoted_content_ad",
            Self::SearchResultAd => "search_result_ad",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdType {
    type Err = crate::error::ServingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline_content_ad" => Ok(Self::InlineContentAd),
            "notification_ad" => Ok(Self::NotificationAd),
            "new_tab_page_ad" => Ok(Self::NewTabPageAd),
            "promoted_content_ad" => Ok(Self::PromotedContentAd),
            "search_result_ad" => Ok(Self::SearchResultAd),
            other => Err(crate::error::ServingError::InvalidAdType(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip_for_all_types() {
        for ad_type in AdType::all() {
            let parsed: Result<AdType, _> = ad_type.as_str().parse();
            let Ok(parsed) = parsed else {
                panic!("round trip failed for {ad_type}");
            };
            assert_eq!(parsed, *ad_type);
        }
    }

    #[test]
    fn unknown_string_is_rejected() {
        let parsed: Result<AdType, _> = "banner_ad".parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AdType::InlineContentAd).unwrap_or_default();
        assert_eq!(json, "\"inline_content_ad\"");
    }
}
