//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tenantry_core::error::TenantryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body missing, not JSON, or failing boundary validation.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] TenantryError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                TenantryError::Validation { .. } => StatusCode::BAD_REQUEST,
                TenantryError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
                TenantryError::NotFound { .. } => StatusCode::NOT_FOUND,
                TenantryError::AlreadyExists { .. } => StatusCode::CONFLICT,
                TenantryError::Database(_)
                | TenantryError::Crypto(_)
                | TenantryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
