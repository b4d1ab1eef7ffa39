//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::AdServingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Serving orchestrator for all business logic.
    pub serving: Arc<AdServingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
