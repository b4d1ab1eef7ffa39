//! SQLite implementation of the persistence layer.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::models::{AdEventRow, CreativeAdRow, TransactionRow};
use crate::domain::{AdEvent, AdType, CreativeAd, PlacementId, Transaction};
use crate::error::ServingError;

/// SQLite-backed store for ad events, transactions, and the creative
/// catalog.
///
/// Writes are wrapped in transactions where more than one statement is
/// involved: an operation either fully commits or reports failure,
/// never partial success.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens a connection pool and creates the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] if the database cannot
    /// be opened or the schema cannot be created.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ServingError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Creates the tables and indexes used by the store.
    async fn init_schema(&self) -> Result<(), ServingError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ad_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                placement_id TEXT NOT NULL,
                creative_instance_id TEXT NOT NULL,
                creative_set_id TEXT NOT NULL,
                campaign_id TEXT NOT NULL,
                advertiser_id TEXT NOT NULL,
                ad_type TEXT NOT NULL,
                confirmation_type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(placement_id, creative_instance_id, confirmation_type)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_ad_events_type_created
             ON ad_events (ad_type, created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                creative_instance_id TEXT NOT NULL,
                creative_set_id TEXT NOT NULL,
                campaign_id TEXT NOT NULL,
                advertiser_id TEXT NOT NULL,
                segment TEXT NOT NULL,
                ad_type TEXT NOT NULL,
                confirmation_type TEXT NOT NULL,
                reconciled_at TEXT,
                value REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS creative_ads (
                creative_instance_id TEXT PRIMARY KEY,
                creative_set_id TEXT NOT NULL,
                campaign_id TEXT NOT NULL,
                advertiser_id TEXT NOT NULL,
                segment TEXT NOT NULL,
                ad_type TEXT NOT NULL,
                dimensions TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                image_url TEXT NOT NULL,
                cta_text TEXT NOT NULL,
                target_url TEXT NOT NULL,
                geo_targets TEXT NOT NULL,
                value REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // --- ad events -------------------------------------------------------

    /// Appends an ad event to the log.
    ///
    /// Idempotent: a duplicate `(placement, creative instance,
    /// confirmation)` combination is silently ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn record_ad_event(&self, event: &AdEvent) -> Result<(), ServingError> {
        sqlx::query(
            "INSERT INTO ad_events (placement_id, creative_instance_id, creative_set_id, \
             campaign_id, advertiser_id, ad_type, confirmation_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(placement_id, creative_instance_id, confirmation_type) DO NOTHING",
        )
        .bind(event.placement_id.to_string())
        .bind(&event.creative_instance_id)
        .bind(&event.creative_set_id)
        .bind(&event.campaign_id)
        .bind(&event.advertiser_id)
        .bind(event.ad_type.as_str())
        .bind(event.confirmation_type.as_str())
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Returns all events for one ad type, ordered by creation time
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn ad_events_for_type(&self, ad_type: AdType) -> Result<Vec<AdEvent>, ServingError> {
        let rows = sqlx::query_as::<_, AdEventRow>(
            "SELECT placement_id, creative_instance_id, creative_set_id, campaign_id, \
             advertiser_id, ad_type, confirmation_type, created_at \
             FROM ad_events WHERE ad_type = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(ad_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdEvent::try_from).collect()
    }

    /// Returns every event in the log, ordered by creation time
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn all_ad_events(&self) -> Result<Vec<AdEvent>, ServingError> {
        let rows = sqlx::query_as::<_, AdEventRow>(
            "SELECT placement_id, creative_instance_id, creative_set_id, campaign_id, \
             advertiser_id, ad_type, confirmation_type, created_at \
             FROM ad_events ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdEvent::try_from).collect()
    }

    /// Returns the served event for a placement, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn served_ad_event(
        &self,
        placement_id: PlacementId,
    ) -> Result<Option<AdEvent>, ServingError> {
        let row = sqlx::query_as::<_, AdEventRow>(
            "SELECT placement_id, creative_instance_id, creative_set_id, campaign_id, \
             advertiser_id, ad_type, confirmation_type, created_at \
             FROM ad_events WHERE placement_id = ? AND confirmation_type = 'served' LIMIT 1",
        )
        .bind(placement_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AdEvent::try_from).transpose()
    }

    /// Deletes events older than the retention horizon from now.
    ///
    /// Returns the number of purged rows.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn purge_expired_ad_events(&self, retention: Duration) -> Result<u64, ServingError> {
        let cutoff = Utc::now() - retention;
        let result = sqlx::query("DELETE FROM ad_events WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deletes events of `ad_type` whose placement is not in the
    /// currently-valid set. Events for other ad types are untouched.
    ///
    /// Returns the number of purged rows.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn purge_orphaned_ad_events(
        &self,
        ad_type: AdType,
        valid_placements: &[PlacementId],
    ) -> Result<u64, ServingError> {
        let placements = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT placement_id FROM ad_events WHERE ad_type = ?",
        )
        .bind(ad_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        let valid: HashSet<String> = valid_placements.iter().map(ToString::to_string).collect();

        let mut tx = self.pool.begin().await?;
        let mut purged = 0u64;
        for (placement_id,) in placements {
            if valid.contains(&placement_id) {
                continue;
            }
            let result = sqlx::query("DELETE FROM ad_events WHERE ad_type = ? AND placement_id = ?")
                .bind(ad_type.as_str())
                .bind(&placement_id)
                .execute(&mut *tx)
                .await?;
            purged += result.rows_affected();
        }
        tx.commit().await?;

        Ok(purged)
    }

    // --- transactions ----------------------------------------------------

    /// Inserts a transaction into the ledger.
    ///
    /// Duplicate IDs are no-ops, not errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<(), ServingError> {
        sqlx::query(
            "INSERT INTO transactions (id, created_at, creative_instance_id, creative_set_id, \
             campaign_id, advertiser_id, segment, ad_type, confirmation_type, reconciled_at, value) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&transaction.id)
        .bind(transaction.created_at)
        .bind(&transaction.creative_instance_id)
        .bind(&transaction.creative_set_id)
        .bind(&transaction.campaign_id)
        .bind(&transaction.advertiser_id)
        .bind(&transaction.segment)
        .bind(transaction.ad_type.as_str())
        .bind(transaction.confirmation_type.as_str())
        .bind(transaction.reconciled_at)
        .bind(transaction.value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a batch of transactions inside one database transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure;
    /// nothing is committed in that case.
    pub async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), ServingError> {
        let mut tx = self.pool.begin().await?;
        for transaction in transactions {
            sqlx::query(
                "INSERT INTO transactions (id, created_at, creative_instance_id, creative_set_id, \
                 campaign_id, advertiser_id, segment, ad_type, confirmation_type, reconciled_at, value) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(&transaction.id)
            .bind(transaction.created_at)
            .bind(&transaction.creative_instance_id)
            .bind(&transaction.creative_set_id)
            .bind(&transaction.campaign_id)
            .bind(&transaction.advertiser_id)
            .bind(&transaction.segment)
            .bind(transaction.ad_type.as_str())
            .bind(transaction.confirmation_type.as_str())
            .bind(transaction.reconciled_at)
            .bind(transaction.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Returns the full ledger, ordered by creation time ascending.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn all_transactions(&self) -> Result<Vec<Transaction>, ServingError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, created_at, creative_instance_id, creative_set_id, campaign_id, \
             advertiser_id, segment, ad_type, confirmation_type, reconciled_at, value \
             FROM transactions ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Returns transactions created within `[from, to]` inclusive.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn transactions_for_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, ServingError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, created_at, creative_instance_id, creative_set_id, campaign_id, \
             advertiser_id, segment, ad_type, confirmation_type, reconciled_at, value \
             FROM transactions WHERE created_at >= ? AND created_at <= ? \
             ORDER BY created_at ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    // --- creative catalog ------------------------------------------------

    /// Upserts catalog rows. Used by the out-of-band catalog refresh.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure;
    /// nothing is committed in that case.
    pub async fn save_creative_ads(&self, creatives: &[CreativeAd]) -> Result<(), ServingError> {
        let mut tx = self.pool.begin().await?;
        for creative in creatives {
            let geo_targets = serde_json::to_string(&creative.geo_targets)
                .map_err(|e| ServingError::Internal(e.to_string()))?;
            sqlx::query(
                "INSERT OR REPLACE INTO creative_ads (creative_instance_id, creative_set_id, \
                 campaign_id, advertiser_id, segment, ad_type, dimensions, title, description, \
                 image_url, cta_text, target_url, geo_targets, value) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&creative.creative_instance_id)
            .bind(&creative.creative_set_id)
            .bind(&creative.campaign_id)
            .bind(&creative.advertiser_id)
            .bind(&creative.segment)
            .bind(creative.ad_type.as_str())
            .bind(&creative.dimensions)
            .bind(&creative.title)
            .bind(&creative.description)
            .bind(&creative.image_url)
            .bind(&creative.cta_text)
            .bind(&creative.target_url)
            .bind(geo_targets)
            .bind(creative.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Returns catalog rows matching an ad type and placement shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn creative_ads_for_dimensions(
        &self,
        ad_type: AdType,
        dimensions: &str,
    ) -> Result<Vec<CreativeAd>, ServingError> {
        let rows = sqlx::query_as::<_, CreativeAdRow>(
            "SELECT creative_instance_id, creative_set_id, campaign_id, advertiser_id, segment, \
             ad_type, dimensions, title, description, image_url, cta_text, target_url, \
             geo_targets, value \
             FROM creative_ads WHERE ad_type = ? AND dimensions = ? \
             ORDER BY creative_instance_id ASC",
        )
        .bind(ad_type.as_str())
        .bind(dimensions)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CreativeAd::try_from).collect()
    }

    /// Returns one catalog row by creative instance ID.
    ///
    /// # Errors
    ///
    /// Returns a [`ServingError::Persistence`] on database failure.
    pub async fn creative_ad_for_instance(
        &self,
        creative_instance_id: &str,
    ) -> Result<Option<CreativeAd>, ServingError> {
        let row = sqlx::query_as::<_, CreativeAdRow>(
            "SELECT creative_instance_id, creative_set_id, campaign_id, advertiser_id, segment, \
             ad_type, dimensions, title, description, image_url, cta_text, target_url, \
             geo_targets, value \
             FROM creative_ads WHERE creative_instance_id = ?",
        )
        .bind(creative_instance_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CreativeAd::try_from).transpose()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConfirmationType;

    async fn make_store() -> SqliteStore {
        let Ok(store) = SqliteStore::connect("sqlite::memory:", 1).await else {
            panic!("in-memory store failed to open");
        };
        store
    }

    fn make_creative(instance_id: &str, dimensions: &str) -> CreativeAd {
        CreativeAd {
            creative_instance_id: instance_id.to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "advertiser-1".to_string(),
            segment: "travel".to_string(),
            ad_type: AdType::InlineContentAd,
            dimensions: dimensions.to_string(),
            title: "title".to_string(),
            description: "description".to_string(),
            image_url: "https://example.com/i.png".to_string(),
            cta_text: "Go".to_string(),
            target_url: "https://example.com".to_string(),
            geo_targets: vec!["US-CA".to_string()],
            value: 0.02,
        }
    }

    fn make_event(
        instance_id: &str,
        ad_type: AdType,
        confirmation_type: ConfirmationType,
        created_at: DateTime<Utc>,
    ) -> AdEvent {
        AdEvent {
            placement_id: PlacementId::new(),
            creative_instance_id: instance_id.to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "advertiser-1".to_string(),
            ad_type,
            confirmation_type,
            created_at,
        }
    }

    fn make_transaction(id: &str, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            created_at,
            creative_instance_id: "ci-1".to_string(),
            creative_set_id: "cs-1".to_string(),
            campaign_id: "ca-1".to_string(),
            advertiser_id: "advertiser-1".to_string(),
            segment: "travel".to_string(),
            ad_type: AdType::InlineContentAd,
            confirmation_type: ConfirmationType::Viewed,
            reconciled_at: None,
            value: 0.02,
        }
    }

    #[tokio::test]
    async fn ad_events_are_returned_in_insertion_order() {
        let store = make_store().await;
        let now = Utc::now();
        for (i, offset) in [3i64, 2, 1].iter().enumerate() {
            let event = make_event(
                &format!("ci-{i}"),
                AdType::InlineContentAd,
                ConfirmationType::Served,
                now - Duration::hours(*offset),
            );
            let result = store.record_ad_event(&event).await;
            assert!(result.is_ok());
        }

        let Ok(events) = store.all_ad_events().await else {
            panic!("fetch failed");
        };
        let ids: Vec<&str> = events
            .iter()
            .map(|e| e.creative_instance_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ci-0", "ci-1", "ci-2"]);
    }

    #[tokio::test]
    async fn duplicate_ad_event_is_ignored() {
        let store = make_store().await;
        let event = make_event(
            "ci-1",
            AdType::InlineContentAd,
            ConfirmationType::Served,
            Utc::now(),
        );
        assert!(store.record_ad_event(&event).await.is_ok());
        assert!(store.record_ad_event(&event).await.is_ok());

        let Ok(events) = store.all_ad_events().await else {
            panic!("fetch failed");
        };
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn events_are_scoped_by_ad_type() {
        let store = make_store().await;
        let inline = make_event(
            "ci-1",
            AdType::InlineContentAd,
            ConfirmationType::Served,
            Utc::now(),
        );
        let search = make_event(
            "ci-2",
            AdType::SearchResultAd,
            ConfirmationType::Served,
            Utc::now(),
        );
        assert!(store.record_ad_event(&inline).await.is_ok());
        assert!(store.record_ad_event(&search).await.is_ok());

        let Ok(events) = store.ad_events_for_type(AdType::InlineContentAd).await else {
            panic!("fetch failed");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(
            events.first().map(|e| e.creative_instance_id.as_str()),
            Some("ci-1")
        );
    }

    #[tokio::test]
    async fn expired_events_are_purged_down_to_the_retention_window() {
        let store = make_store().await;
        let now = Utc::now();
        // Spread over six months; with 90-day retention only the most
        // recent survives.
        for (i, days) in [180i64, 91, 1].iter().enumerate() {
            let event = make_event(
                &format!("ci-{i}"),
                AdType::InlineContentAd,
                ConfirmationType::Served,
                now - Duration::days(*days),
            );
            assert!(store.record_ad_event(&event).await.is_ok());
        }

        let Ok(purged) = store.purge_expired_ad_events(Duration::days(90)).await else {
            panic!("purge failed");
        };
        assert_eq!(purged, 2);

        let Ok(events) = store.all_ad_events().await else {
            panic!("fetch failed");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(
            events.first().map(|e| e.creative_instance_id.as_str()),
            Some("ci-2")
        );
    }

    #[tokio::test]
    async fn orphan_purge_preserves_valid_placements_and_foreign_types() {
        let store = make_store().await;
        let now = Utc::now();

        let valid = make_event(
            "ci-1",
            AdType::NotificationAd,
            ConfirmationType::Served,
            now,
        );
        let orphaned = make_event(
            "ci-2",
            AdType::NotificationAd,
            ConfirmationType::Served,
            now,
        );
        let foreign = make_event(
            "ci-3",
            AdType::SearchResultAd,
            ConfirmationType::Served,
            now,
        );
        for event in [&valid, &orphaned, &foreign] {
            assert!(store.record_ad_event(event).await.is_ok());
        }

        let Ok(purged) = store
            .purge_orphaned_ad_events(AdType::NotificationAd, &[valid.placement_id])
            .await
        else {
            panic!("purge failed");
        };
        assert_eq!(purged, 1);

        let Ok(events) = store.all_ad_events().await else {
            panic!("fetch failed");
        };
        let ids: Vec<&str> = events
            .iter()
            .map(|e| e.creative_instance_id.as_str())
            .collect();
        assert!(ids.contains(&"ci-1"));
        assert!(!ids.contains(&"ci-2"));
        assert!(ids.contains(&"ci-3"));
    }

    #[tokio::test]
    async fn transaction_round_trip_and_idempotent_insert() {
        let store = make_store().await;
        let now = Utc::now();
        let first = make_transaction("tx-1", now - Duration::minutes(2));
        let second = make_transaction("tx-2", now - Duration::minutes(1));

        assert!(store.save_transactions(&[first.clone(), second]).await.is_ok());
        // Saving the same transaction again must not duplicate it.
        assert!(store.save_transaction(&first).await.is_ok());

        let Ok(transactions) = store.all_transactions().await else {
            panic!("fetch failed");
        };
        assert_eq!(transactions.len(), 2);
        let ids: Vec<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tx-1", "tx-2"]);
    }

    #[tokio::test]
    async fn date_range_query_is_inclusive() {
        let store = make_store().await;
        let now = Utc::now();
        let inside = make_transaction("tx-in", now - Duration::days(1));
        let before = make_transaction("tx-before", now - Duration::days(10));
        let after = make_transaction("tx-after", now);
        assert!(
            store
                .save_transactions(&[inside.clone(), before, after])
                .await
                .is_ok()
        );

        let Ok(ranged) = store
            .transactions_for_date_range(now - Duration::days(2), now - Duration::hours(12))
            .await
        else {
            panic!("fetch failed");
        };
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged.first().map(|t| t.id.as_str()), Some("tx-in"));
    }

    #[tokio::test]
    async fn catalog_rows_are_queried_by_dimensions() {
        let store = make_store().await;
        let medium_rectangle = make_creative("ci-1", "300x250");
        let leaderboard = make_creative("ci-2", "728x90");
        assert!(
            store
                .save_creative_ads(&[medium_rectangle.clone(), leaderboard])
                .await
                .is_ok()
        );

        let Ok(creatives) = store
            .creative_ads_for_dimensions(AdType::InlineContentAd, "300x250")
            .await
        else {
            panic!("fetch failed");
        };
        assert_eq!(creatives.len(), 1);
        assert_eq!(creatives.first(), Some(&medium_rectangle));
    }

    #[tokio::test]
    async fn catalog_upsert_replaces_existing_row() {
        let store = make_store().await;
        let mut creative = make_creative("ci-1", "300x250");
        assert!(store.save_creative_ads(std::slice::from_ref(&creative)).await.is_ok());

        creative.title = "updated".to_string();
        assert!(store.save_creative_ads(std::slice::from_ref(&creative)).await.is_ok());

        let Ok(Some(fetched)) = store.creative_ad_for_instance("ci-1").await else {
            panic!("fetch failed");
        };
        assert_eq!(fetched.title, "updated");
    }
}
