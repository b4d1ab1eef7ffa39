//! Serving endpoint handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{ServeAdRequest, ServeAdResponse};
use crate::app_state::AppState;
use crate::domain::AdType;
use crate::error::{ErrorResponse, ServingError};

/// `POST /serve` — Run the serving pipeline for one placement request.
///
/// # Errors
///
/// Returns [`ServingError`] on an unknown ad type, empty dimensions, or
/// storage failure. A pipeline that finds no eligible ad is *not* an
/// error; the response carries `ad: null` with `had_opportunity`
/// distinguishing empty inventory from fully excluded inventory.
#[utoipa::path(
    post,
    path = "/api/v1/serve",
    tag = "Serving",
    summary = "Serve an ad",
    description = "Runs opt-in gating, exclusion rules, scoring, and the weighted sampling draw \
                   for the requested ad type and dimensions. Returns the chosen creative or null.",
    request_body = ServeAdRequest,
    responses(
        (status = 200, description = "Serving decision made", body = ServeAdResponse),
        (status = 400, description = "Invalid ad type or dimensions", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn serve_ad(
    State(state): State<AppState>,
    Json(req): Json<ServeAdRequest>,
) -> Result<impl IntoResponse, ServingError> {
    let ad_type: AdType = req.ad_type.parse()?;
    if req.dimensions.trim().is_empty() {
        return Err(ServingError::InvalidRequest(
            "dimensions must not be empty".to_string(),
        ));
    }

    let outcome = state
        .serving
        .maybe_serve(ad_type, &req.dimensions, req.segments)
        .await?;

    Ok(Json(ServeAdResponse {
        placement_id: outcome.placement_id.map(Into::into),
        dimensions: outcome.dimensions,
        ad: outcome.ad.map(Into::into),
        had_opportunity: outcome.had_opportunity,
        served_at: Utc::now(),
    }))
}

/// Serving routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/serve", post(serve_ad))
}
