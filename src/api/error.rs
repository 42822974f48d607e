//! Mapping of domain and auth failures onto HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::auth::AuthError;

/// Error returned by every library handler
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    Auth(AuthError),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unavailable | DomainError::AlreadyReturned => StatusCode::CONFLICT,
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Database(_) | DomainError::Internal(_) => {
                tracing::error!(error.message = %self, "Unexpected error happened");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(e) => e.into_response(),
            ApiError::Auth(e) => e.into_response(),
        }
    }
}
