//! Statement and summary handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{StatementResponse, SummaryParams, SummaryResponse};
use crate::app_state::AppState;
use crate::error::ServingError;

/// `GET /statement` — Earnings statement for the current calendar month.
///
/// # Errors
///
/// Returns [`ServingError`] on storage failure.
pub async fn statement(State(state): State<AppState>) -> Result<impl IntoResponse, ServingError> {
    let statement = state.serving.statement().await?;
    Ok(Json(StatementResponse::from(statement)))
}

/// `GET /summary` — Viewed confirmations per ad type within a range.
///
/// # Errors
///
/// Returns [`ServingError`] when `from` is after `to` or on storage
/// failure.
pub async fn ads_summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, ServingError> {
    if params.from > params.to {
        return Err(ServingError::InvalidRequest(
            "from must not be after to".to_string(),
        ));
    }
    let counts = state.serving.ads_summary(params.from, params.to).await?;
    Ok(Json(SummaryResponse::from_counts(counts)))
}

/// Statement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statement", get(statement))
        .route("/summary", get(ads_summary))
}
