//! In-process ad interaction history.
//!
//! Append-only log of triggered confirmations kept for user-facing
//! display. Not consumed by scoring or the exclusion rules, which read
//! the persisted ad event log instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::{AdType, ConfirmationType, PlacementId};

/// One user-visible interaction with a served ad.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionEntry {
    /// Placement the interaction belongs to.
    pub placement_id: PlacementId,
    /// Creative the interaction belongs to.
    pub creative_instance_id: String,
    /// Ad unit type.
    pub ad_type: AdType,
    /// Interaction kind.
    pub confirmation_type: ConfirmationType,
    /// Interaction timestamp.
    pub created_at: DateTime<Utc>,
}

/// Append-only interaction log shared by the serving service.
#[derive(Debug, Default)]
pub struct AdInteractionLog {
    entries: RwLock<Vec<InteractionEntry>>,
}

impl AdInteractionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub async fn append(&self, entry: InteractionEntry) {
        self.entries.write().await.push(entry);
    }

    /// Returns a snapshot of all entries, oldest first.
    pub async fn entries(&self) -> Vec<InteractionEntry> {
        self.entries.read().await.clone()
    }

    /// Returns the number of recorded entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if nothing was recorded yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
