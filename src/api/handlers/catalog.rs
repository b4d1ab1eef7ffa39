//! Creative catalog handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    CatalogQueryParams, CatalogRefreshRequest, CatalogRefreshResponse, CreativeAdDto,
};
use crate::app_state::AppState;
use crate::domain::{AdType, CreativeAd};
use crate::error::ServingError;

/// `POST /catalog/creatives` — Insert or replace catalog creatives.
///
/// # Errors
///
/// Returns [`ServingError`] when a creative carries an unknown ad type
/// or on storage failure. The batch is validated before anything is
/// written.
pub async fn refresh_catalog(
    State(state): State<AppState>,
    Json(req): Json<CatalogRefreshRequest>,
) -> Result<impl IntoResponse, ServingError> {
    let creatives: Vec<CreativeAd> = req
        .creatives
        .into_iter()
        .map(CreativeAd::try_from)
        .collect::<Result<_, _>>()?;

    state.serving.refresh_catalog(&creatives).await?;
    Ok(Json(CatalogRefreshResponse {
        saved: creatives.len(),
    }))
}

/// `GET /catalog/creatives` — List creatives for an ad type and shape.
///
/// # Errors
///
/// Returns [`ServingError`] on an unknown ad type or storage failure.
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<impl IntoResponse, ServingError> {
    let ad_type: AdType = params.ad_type.parse()?;
    let creatives: Vec<CreativeAdDto> = state
        .serving
        .catalog_for_dimensions(ad_type, &params.dimensions)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(creatives))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/catalog/creatives", post(refresh_catalog).get(list_catalog))
}
