//! Confirmation event and maintenance DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::InteractionEntry;

/// Request body for `POST /events/trigger`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TriggerEventRequest {
    /// Placement the confirmation belongs to.
    pub placement_id: uuid::Uuid,
    /// Creative the confirmation belongs to; must match the placement's
    /// served creative.
    pub creative_instance_id: String,
    /// Confirmation kind (`viewed`, `clicked`, `dismissed`, `landed`,
    /// `conversion`). `served` is rejected.
    pub event_type: String,
}

/// Response body for `POST /events/trigger`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerEventResponse {
    /// Whether the confirmation was recorded.
    pub success: bool,
    /// Placement the confirmation was recorded for.
    pub placement_id: uuid::Uuid,
    /// Creative the confirmation was recorded for.
    pub creative_instance_id: String,
    /// Confirmation kind that was recorded.
    pub event_type: String,
    /// Recording timestamp.
    pub created_at: DateTime<Utc>,
}

/// One interaction history entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct InteractionDto {
    /// Placement of the interaction.
    pub placement_id: uuid::Uuid,
    /// Creative of the interaction.
    pub creative_instance_id: String,
    /// Ad type (snake_case).
    pub ad_type: String,
    /// Interaction kind (snake_case).
    pub event_type: String,
    /// Interaction timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<InteractionEntry> for InteractionDto {
    fn from(entry: InteractionEntry) -> Self {
        Self {
            placement_id: entry.placement_id.into(),
            creative_instance_id: entry.creative_instance_id,
            ad_type: entry.ad_type.as_str().to_string(),
            event_type: entry.confirmation_type.as_str().to_string(),
            created_at: entry.created_at,
        }
    }
}

/// Request body for `POST /ad-events/purge-orphaned`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurgeOrphanedRequest {
    /// Ad type whose events are inspected.
    pub ad_type: String,
    /// Placements that must be kept; events of `ad_type` outside this
    /// list are deleted.
    #[serde(default)]
    pub valid_placement_ids: Vec<uuid::Uuid>,
}

/// Response body for the purge endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    /// Number of ad events deleted.
    pub purged: u64,
}
