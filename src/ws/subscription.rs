//! Per-connection subscription manager.
//!
//! Tracks which ad types a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::AdType;

/// Manages the set of ad type subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed ad types. If `subscribe_all` is true, this set is ignored.
    ad_types: HashSet<AdType>,
    /// Whether the client subscribes to all ad types (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ad types to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ad_types: &[AdType], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for ad_type in ad_types {
            self.ad_types.insert(*ad_type);
        }
    }

    /// Removes ad types from the subscription set.
    pub fn unsubscribe(&mut self, ad_types: &[AdType]) {
        for ad_type in ad_types {
            self.ad_types.remove(ad_type);
        }
    }

    /// Returns `true` if the given ad type matches the subscription filter.
    #[must_use]
    pub fn matches(&self, ad_type: AdType) -> bool {
        self.subscribe_all || self.ad_types.contains(&ad_type)
    }

    /// Returns the number of explicitly subscribed ad types.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ad_types.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(AdType::InlineContentAd));
    }

    #[test]
    fn subscribe_specific_ad_type() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[AdType::InlineContentAd], false);
        assert!(mgr.matches(AdType::InlineContentAd));
        assert!(!mgr.matches(AdType::NotificationAd));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(AdType::InlineContentAd));
        assert!(mgr.matches(AdType::SearchResultAd));
    }

    #[test]
    fn unsubscribe_removes_ad_type() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[AdType::InlineContentAd], false);
        assert!(mgr.matches(AdType::InlineContentAd));
        mgr.unsubscribe(&[AdType::InlineContentAd]);
        assert!(!mgr.matches(AdType::InlineContentAd));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[AdType::InlineContentAd, AdType::NotificationAd], false);
        assert_eq!(mgr.count(), 2);
    }
}
