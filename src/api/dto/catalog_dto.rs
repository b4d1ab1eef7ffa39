//! Creative catalog DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::CreativeAdDto;

/// Request body for `POST /catalog/creatives`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CatalogRefreshRequest {
    /// Creatives to insert or replace, keyed by creative instance ID.
    pub creatives: Vec<CreativeAdDto>,
}

/// Response body for `POST /catalog/creatives`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogRefreshResponse {
    /// Number of creatives written.
    pub saved: usize,
}

/// Query parameters for `GET /catalog/creatives`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CatalogQueryParams {
    /// Ad type to list (snake_case).
    pub ad_type: String,
    /// Placement shape to list.
    pub dimensions: String,
}
