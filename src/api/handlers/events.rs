//! Confirmation trigger, interaction history, and maintenance handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    InteractionDto, PurgeOrphanedRequest, PurgeResponse, TriggerEventRequest,
    TriggerEventResponse,
};
use crate::app_state::AppState;
use crate::domain::{AdType, ConfirmationType, PlacementId};
use crate::error::{ErrorResponse, ServingError};

/// `POST /events/trigger` — Record an externally triggered confirmation.
///
/// # Errors
///
/// Returns [`ServingError`] when the event type is `served` (pipeline
/// internal), the placement has no served event, or the creative does
/// not match the placement.
#[utoipa::path(
    post,
    path = "/api/v1/events/trigger",
    tag = "Events",
    summary = "Trigger a confirmation",
    description = "Records a viewed, clicked, dismissed, landed, or conversion event against a \
                   served placement. Deposit-worthy confirmations also credit the ledger.",
    request_body = TriggerEventRequest,
    responses(
        (status = 200, description = "Confirmation recorded", body = TriggerEventResponse),
        (status = 400, description = "Invalid or internal-only event type", body = ErrorResponse),
        (status = 404, description = "Placement not found", body = ErrorResponse),
    )
)]
pub async fn trigger_event(
    State(state): State<AppState>,
    Json(req): Json<TriggerEventRequest>,
) -> Result<impl IntoResponse, ServingError> {
    let confirmation_type: ConfirmationType = req.event_type.parse()?;
    let placement_id = PlacementId::from_uuid(req.placement_id);

    let event = state
        .serving
        .trigger_event(placement_id, &req.creative_instance_id, confirmation_type)
        .await?;

    Ok(Json(TriggerEventResponse {
        success: true,
        placement_id: event.placement_id.into(),
        creative_instance_id: event.creative_instance_id,
        event_type: event.confirmation_type.as_str().to_string(),
        created_at: event.created_at,
    }))
}

/// `GET /history` — Interaction history, oldest first.
pub async fn interaction_history(State(state): State<AppState>) -> impl IntoResponse {
    let entries: Vec<InteractionDto> = state
        .serving
        .interactions()
        .await
        .into_iter()
        .map(Into::into)
        .collect();
    Json(entries)
}

/// `POST /ad-events/purge-expired` — Delete events past retention.
///
/// # Errors
///
/// Returns [`ServingError`] on storage failure.
pub async fn purge_expired(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServingError> {
    let purged = state.serving.purge_expired_ad_events().await?;
    Ok(Json(PurgeResponse { purged }))
}

/// `POST /ad-events/purge-orphaned` — Delete events whose placement is
/// no longer valid.
///
/// # Errors
///
/// Returns [`ServingError`] on an unknown ad type or storage failure.
pub async fn purge_orphaned(
    State(state): State<AppState>,
    Json(req): Json<PurgeOrphanedRequest>,
) -> Result<impl IntoResponse, ServingError> {
    let ad_type: AdType = req.ad_type.parse()?;
    let valid: Vec<PlacementId> = req
        .valid_placement_ids
        .into_iter()
        .map(PlacementId::from_uuid)
        .collect();
    let purged = state
        .serving
        .purge_orphaned_ad_events(ad_type, &valid)
        .await?;
    Ok(Json(PurgeResponse { purged }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/trigger", post(trigger_event))
        .route("/history", get(interaction_history))
        .route("/ad-events/purge-expired", post(purge_expired))
        .route("/ad-events/purge-orphaned", post(purge_orphaned))
}
