//! Account ledger transaction record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AdType, ConfirmationType};

/// One row of the account ledger.
///
/// Created when a deposit-worthy confirmation is credited. `id` is
/// unique: inserting the same transaction twice is a no-op, not an
/// error. `reconciled_at` is set later by an out-of-scope payment
/// reconciliation pass; rows are otherwise never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (UUID v4 string).
    pub id: String,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// Creative asset the credit is attributed to.
    pub creative_instance_id: String,
    /// Creative set identifier.
    pub creative_set_id: String,
    /// Campaign identifier.
    pub campaign_id: String,
    /// Advertiser identifier.
    pub advertiser_id: String,
    /// Interest segment at confirmation time.
    pub segment: String,
    /// Ad unit type.
    pub ad_type: AdType,
    /// Confirmation that produced the credit.
    pub confirmation_type: ConfirmationType,
    /// Set by the reconciliation pass once payment settles.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Credit value.
    pub value: f64,
}
