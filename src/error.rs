//! Serving error types with HTTP status code mapping.
//!
//! [`ServingError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: unknown dimensions",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State/Not Found | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
///
/// A failed serve is *not* an error: "no eligible ad" is a legitimate
/// business outcome reported through the serve response body, never
/// through this type. `ServingError` is reserved for storage failures
/// and malformed or precondition-violating requests.
#[derive(Debug, thiserror::Error)]
pub enum ServingError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unsupported or invalid ad type string.
    #[error("invalid ad type: {0}")]
    InvalidAdType(String),

    /// A `served` confirmation may only be produced internally by the
    /// serving pipeline; triggering it through the event endpoint is a
    /// caller bug.
    #[error("event type {0} cannot be triggered externally")]
    InvalidEventType(String),

    /// No served ad event exists for the given placement.
    #[error("placement not found: {0}")]
    PlacementNotFound(uuid::Uuid),

    /// Creative catalog row was not found.
    #[error("creative not found: {0}")]
    CreativeNotFound(String),

    /// Persistence layer failure. Callers must treat this as "no data
    /// available", never as partial data.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAdType(_) => 1002,
            Self::InvalidEventType(_) => 1003,
            Self::PlacementNotFound(_) => 2001,
            Self::CreativeNotFound(_) => 2002,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAdType(_) | Self::InvalidEventType(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PlacementNotFound(_) | Self::CreativeNotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<sqlx::Error> for ServingError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = ServingError::InvalidRequest("bad dimensions".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn placement_not_found_maps_to_not_found() {
        let err = ServingError::PlacementNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn persistence_maps_to_internal_server_error() {
        let err = ServingError::Persistence("disk gone".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn served_trigger_is_a_validation_error() {
        let err = ServingError::InvalidEventType("served".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1003);
    }
}
