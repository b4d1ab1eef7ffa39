//! Database row models and their domain conversions.
//!
//! Rows store enums and UUIDs as TEXT; converting to a domain type can
//! therefore fail on corrupt data, which surfaces as a persistence
//! error rather than a panic.

use chrono::{DateTime, Utc};

use crate::domain::{AdEvent, CreativeAd, Transaction};
use crate::error::ServingError;

/// A row from the `ad_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdEventRow {
    /// Placement UUID as text.
    pub placement_id: String,
    /// Creative asset identifier.
    pub creative_instance_id: String,
    /// Creative set identifier.
    pub creative_set_id: String,
    /// Campaign identifier.
    pub campaign_id: String,
    /// Advertiser identifier.
    pub advertiser_id: String,
    /// Ad type discriminator.
    pub ad_type: String,
    /// Confirmation type discriminator.
    pub confirmation_type: String,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AdEventRow> for AdEvent {
    type Error = ServingError;

    fn try_from(row: AdEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            placement_id: row
                .placement_id
                .parse()
                .map_err(|e| ServingError::Persistence(format!("bad placement_id: {e}")))?,
            creative_instance_id: row.creative_instance_id,
            creative_set_id: row.creative_set_id,
            campaign_id: row.campaign_id,
            advertiser_id: row.advertiser_id,
            ad_type: row.ad_type.parse()?,
            confirmation_type: row.confirmation_type.parse()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    /// Unique transaction identifier.
    pub id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
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
    /// Ad type discriminator.
    pub ad_type: String,
    /// Confirmation type discriminator.
    pub confirmation_type: String,
    /// Reconciliation timestamp, if settled.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Credit value.
    pub value: f64,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = ServingError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            created_at: row.created_at,
            creative_instance_id: row.creative_instance_id,
            creative_set_id: row.creative_set_id,
            campaign_id: row.campaign_id,
            advertiser_id: row.advertiser_id,
            segment: row.segment,
            ad_type: row.ad_type.parse()?,
            confirmation_type: row.confirmation_type.parse()?,
            reconciled_at: row.reconciled_at,
            value: row.value,
        })
    }
}

/// A row from the `creative_ads` catalog table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreativeAdRow {
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
    /// Ad type discriminator.
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
    /// Geo targets as a JSON array of strings.
    pub geo_targets: String,
    /// Deposit value per confirmation.
    pub value: f64,
}

impl TryFrom<CreativeAdRow> for CreativeAd {
    type Error = ServingError;

    fn try_from(row: CreativeAdRow) -> Result<Self, Self::Error> {
        let geo_targets: Vec<String> = serde_json::from_str(&row.geo_targets)
            .map_err(|e| ServingError::Persistence(format!("bad geo_targets: {e}")))?;
        Ok(Self {
            creative_instance_id: row.creative_instance_id,
            creative_set_id: row.creative_set_id,
            campaign_id: row.campaign_id,
            advertiser_id: row.advertiser_id,
            segment: row.segment,
            ad_type: row.ad_type.parse()?,
            dimensions: row.dimensions,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            cta_text: row.cta_text,
            target_url: row.target_url,
            geo_targets,
            value: row.value,
        })
    }
}
