//! System endpoints: health check and opted-in ad types.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/ad-types` — Ad types the user has opted in to.
#[utoipa::path(
    get,
    path = "/config/ad-types",
    tag = "System",
    summary = "List opted-in ad types",
    description = "Returns the ad types serving requests are accepted for. Requests for any \
                   other type terminate with no ad and no opportunity.",
    responses(
        (status = 200, description = "Opted-in ad types", body = Vec<String>),
    )
)]
pub async fn ad_types_handler(State(state): State<AppState>) -> impl IntoResponse {
    let types: Vec<&'static str> = state
        .serving
        .opted_in_ad_types()
        .into_iter()
        .map(|t| t.as_str())
        .collect();
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/ad-types", get(ad_types_handler))
}
