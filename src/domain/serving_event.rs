//! Serving lifecycle events broadcast through the event bus.
//!
//! Every serving outcome and triggered confirmation emits a
//! [`ServingEvent`] through the [`super::EventBus`]. Events are consumed
//! by the WebSocket diagnostics stream and by tests asserting pipeline
//! behavior.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AdType, PlacementId};

/// Lifecycle event emitted by the serving pipeline.
///
/// A fixed tagged union dispatched through the bus registered at
/// orchestrator construction; adding a variant is an API change, not a
/// subclassing exercise.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ServingEvent {
    /// The pipeline chose a creative and recorded the served event.
    ServedAd {
        /// Placement created for this serve.
        placement_id: PlacementId,
        /// Chosen creative.
        creative_instance_id: String,
        /// Ad unit type.
        ad_type: AdType,
        /// Placement shape requested.
        dimensions: String,
        /// Serve timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A viewed confirmation was recorded.
    ViewedAd {
        /// Placement the view belongs to.
        placement_id: PlacementId,
        /// Viewed creative.
        creative_instance_id: String,
        /// Ad unit type.
        ad_type: AdType,
        /// View timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A clicked confirmation was recorded.
    ClickedAd {
        /// Placement the click belongs to.
        placement_id: PlacementId,
        /// Clicked creative.
        creative_instance_id: String,
        /// Ad unit type.
        ad_type: AdType,
        /// Click timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A dismissed confirmation was recorded.
    DismissedAd {
        /// Placement the dismissal belongs to.
        placement_id: PlacementId,
        /// Dismissed creative.
        creative_instance_id: String,
        /// Ad unit type.
        ad_type: AdType,
        /// Dismissal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Eligible inventory existed for a serving request.
    Opportunity {
        /// Ad unit type requested.
        ad_type: AdType,
        /// Placement shape requested.
        dimensions: String,
        /// Request timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The request ended without an ad. `had_opportunity` distinguishes
    /// "catalog empty" (false) from "catalog had ads, none survived
    /// exclusion or sampling" (true).
    NoOpportunity {
        /// Ad unit type requested.
        ad_type: AdType,
        /// Placement shape requested.
        dimensions: String,
        /// Whether eligible inventory existed at all.
        had_opportunity: bool,
        /// Request timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ServingEvent {
    /// Returns the ad type associated with this event.
    #[must_use]
    pub const fn ad_type(&self) -> AdType {
        match self {
            Self::ServedAd { ad_type, .. }
            | Self::ViewedAd { ad_type, .. }
            | Self::ClickedAd { ad_type, .. }
            | Self::DismissedAd { ad_type, .. }
            | Self::Opportunity { ad_type, .. }
            | Self::NoOpportunity { ad_type, .. } => *ad_type,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ServedAd { .. } => "served_ad",
            Self::ViewedAd { .. } => "viewed_ad",
            Self::ClickedAd { .. } => "clicked_ad",
            Self::DismissedAd { .. } => "dismissed_ad",
            Self::Opportunity { .. } => "opportunity",
            Self::NoOpportunity { .. } => "no_opportunity",
        }
    }
}
