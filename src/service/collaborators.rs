//! Collaborator seams consumed by the serving pipeline.
//!
//! The host environment owns browsing history and the user's account;
//! the pipeline only sees these trait objects, injected at construction.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{AdType, ConfirmationType, Transaction};
use crate::error::ServingError;
use crate::persistence::SqliteStore;

/// Supplies recently visited hosts for targeting.
#[async_trait]
pub trait BrowsingHistoryProvider: Send + Sync + std::fmt::Debug {
    /// Returns up to `max_count` hosts visited within the last
    /// `days_ago` days.
    async fn browsing_history(
        &self,
        max_count: usize,
        days_ago: u32,
    ) -> Result<Vec<String>, ServingError>;
}

/// Provider for hosts without a history source; always returns an
/// empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowsingHistory;

#[async_trait]
impl BrowsingHistoryProvider for NoBrowsingHistory {
    async fn browsing_history(
        &self,
        _max_count: usize,
        _days_ago: u32,
    ) -> Result<Vec<String>, ServingError> {
        Ok(Vec::new())
    }
}

/// Credits the user's account for a deposit-worthy confirmation.
///
/// Fire-and-forget from the pipeline's perspective: a failed deposit is
/// logged, never turned into a failed trigger.
#[async_trait]
pub trait AccountDepositor: Send + Sync + std::fmt::Debug {
    /// Deposits the credit attributed to a creative confirmation.
    async fn deposit(
        &self,
        creative_instance_id: &str,
        segment: &str,
        ad_type: AdType,
        confirmation_type: ConfirmationType,
    ) -> Result<(), ServingError>;
}

/// Depositor that appends a [`Transaction`] to the ledger.
///
/// The credit value comes from the creative's catalog row; valuation is
/// the account's concern, not the pipeline's.
#[derive(Debug, Clone)]
pub struct LedgerDepositor {
    store: SqliteStore,
}

impl LedgerDepositor {
    /// Creates a depositor writing to the given store.
    #[must_use]
    pub const fn new(store: SqliteStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AccountDepositor for LedgerDepositor {
    async fn deposit(
        &self,
        creative_instance_id: &str,
        segment: &str,
        ad_type: AdType,
        confirmation_type: ConfirmationType,
    ) -> Result<(), ServingError> {
        let creative = self
            .store
            .creative_ad_for_instance(creative_instance_id)
            .await?
            .ok_or_else(|| ServingError::CreativeNotFound(creative_instance_id.to_string()))?;

        let transaction = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            creative_instance_id: creative.creative_instance_id,
            creative_set_id: creative.creative_set_id,
            campaign_id: creative.campaign_id,
            advertiser_id: creative.advertiser_id,
            segment: segment.to_string(),
            ad_type,
            confirmation_type,
            reconciled_at: None,
            value: creative.value,
        };
        self.store.save_transaction(&transaction).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::CreativeAd;

    #[tokio::test]
    async fn no_browsing_history_is_empty() {
        let history = NoBrowsingHistory.browsing_history(100, 30).await;
        let Ok(history) = history else {
            panic!("provider failed");
        };
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn ledger_depositor_writes_a_transaction() {
        let Ok(store) = SqliteStore::connect("sqlite::memory:", 1).await else {
            panic!("store failed to open");
        };
        let creative = CreativeAd {
            creative_instance_id: "ci-1".to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
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
            value: 0.05,
        };
        assert!(store.save_creative_ads(std::slice::from_ref(&creative)).await.is_ok());

        let depositor = LedgerDepositor::new(store.clone());
        let result = depositor
            .deposit("ci-1", "travel", AdType::InlineContentAd, ConfirmationType::Viewed)
            .await;
        assert!(result.is_ok());

        let Ok(transactions) = store.all_transactions().await else {
            panic!("fetch failed");
        };
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions.first().map(|t| t.value), Some(0.05));
    }

    #[tokio::test]
    async fn deposit_for_unknown_creative_fails() {
        let Ok(store) = SqliteStore::connect("sqlite::memory:", 1).await else {
            panic!("store failed to open");
        };
        let depositor = LedgerDepositor::new(store);
        let result = depositor
            .deposit("missing", "travel", AdType::InlineContentAd, ConfirmationType::Viewed)
            .await;
        assert!(result.is_err());
    }
}
