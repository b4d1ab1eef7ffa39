//! Per-campaign and per-advertiser frequency cap rules.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{AdEvent, ConfirmationType, CreativeAd};

use super::ExclusionRule;

/// Counts served events per key within the rolling cap window.
fn served_counts_within_window<F>(
    ad_events: &[AdEvent],
    now: DateTime<Utc>,
    window: Duration,
    key: F,
) -> HashMap<String, usize>
where
    F: Fn(&AdEvent) -> &str,
{
    let cutoff = now - window;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for event in ad_events {
        if event.confirmation_type == ConfirmationType::Served && event.created_at >= cutoff {
            *counts.entry(key(event).to_string()).or_default() += 1;
        }
    }
    counts
}

/// Excludes campaigns that hit their served-event cap within the window.
#[derive(Debug)]
pub struct CampaignCapRule {
    counts: HashMap<String, usize>,
    cap: usize,
}

impl CampaignCapRule {
    /// Builds the rule from the ad event history.
    #[must_use]
    pub fn new(ad_events: &[AdEvent], now: DateTime<Utc>, window: Duration, cap: usize) -> Self {
        Self {
            counts: served_counts_within_window(ad_events, now, window, |e| &e.campaign_id),
            cap,
        }
    }
}

impl ExclusionRule for CampaignCapRule {
    fn name(&self) -> &'static str {
        "campaign_frequency_cap"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.counts
            .get(&candidate.campaign_id)
            .is_some_and(|count| *count >= self.cap)
    }
}

/// Excludes advertisers that hit their served-event cap within the window.
#[derive(Debug)]
pub struct AdvertiserCapRule {
    counts: HashMap<String, usize>,
    cap: usize,
}

impl AdvertiserCapRule {
    /// Builds the rule from the ad event history.
    #[must_use]
    pub fn new(ad_events: &[AdEvent], now: DateTime<Utc>, window: Duration, cap: usize) -> Self {
        Self {
            counts: served_counts_within_window(ad_events, now, window, |e| &e.advertiser_id),
            cap,
        }
    }
}

impl ExclusionRule for AdvertiserCapRule {
    fn name(&self) -> &'static str {
        "advertiser_frequency_cap"
    }

    fn should_exclude(&self, candidate: &CreativeAd) -> bool {
        self.counts
            .get(&candidate.advertiser_id)
            .is_some_and(|count| *count >= self.cap)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PlacementId;
    use crate::eligibility::test_support::make_creative;

    fn served_event(campaign_id: &str, created_at: DateTime<Utc>) -> AdEvent {
        let creative = make_creative("ci-1", "cs-1", campaign_id);
        AdEvent::for_creative(
            &creative,
            PlacementId::new(),
            ConfirmationType::Served,
            created_at,
        )
    }

    #[test]
    fn campaign_at_cap_is_excluded() {
        let now = Utc::now();
        let events = vec![
            served_event("ca-1", now - Duration::hours(1)),
            served_event("ca-1", now - Duration::hours(2)),
        ];
        let rule = CampaignCapRule::new(&events, now, Duration::hours(24), 2);
        assert!(rule.should_exclude(&make_creative("ci-9", "cs-9", "ca-1")));
        assert!(!rule.should_exclude(&make_creative("ci-9", "cs-9", "ca-2")));
    }

    #[test]
    fn events_outside_window_do_not_count() {
        let now = Utc::now();
        let events = vec![
            served_event("ca-1", now - Duration::hours(30)),
            served_event("ca-1", now - Duration::hours(1)),
        ];
        let rule = CampaignCapRule::new(&events, now, Duration::hours(24), 2);
        assert!(!rule.should_exclude(&make_creative("ci-9", "cs-9", "ca-1")));
    }

    #[test]
    fn viewed_events_do_not_count_toward_cap() {
        let now = Utc::now();
        let creative = make_creative("ci-1", "cs-1", "ca-1");
        let viewed = AdEvent::for_creative(
            &creative,
            PlacementId::new(),
            ConfirmationType::Viewed,
            now,
        );
        let rule = CampaignCapRule::new(&[viewed], now, Duration::hours(24), 1);
        assert!(!rule.should_exclude(&creative));
    }

    #[test]
    fn advertiser_cap_counts_across_campaigns() {
        let now = Utc::now();
        let events = vec![
            served_event("ca-1", now - Duration::hours(1)),
            served_event("ca-2", now - Duration::hours(2)),
        ];
        // Both events share advertiser-1 from the test fixture.
        let rule = AdvertiserCapRule::new(&events, now, Duration::hours(24), 2);
        assert!(rule.should_exclude(&make_creative("ci-9", "cs-9", "ca-3")));
    }
}
