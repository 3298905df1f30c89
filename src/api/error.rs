//! API error taxonomy with HTTP status mapping.
//!
//! Every failure a caller can see is one of these kinds; the response
//! body is always `{"error": "<message>"}`. Unexpected errors are
//! logged in full and redacted to a generic message on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Login failed. Deliberately covers both unknown email and wrong
    /// password so the caller cannot tell which.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account with this email already exists")]
    DuplicateUser,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied")]
    AccessDenied,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ApiError::DuplicateUser => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::AccessDenied => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
            ApiError::InvalidInput(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::InvalidState(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, detail.clone()),
            ApiError::Unexpected(detail) => {
                tracing::error!(detail, "unexpected API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, .. } => {
                ApiError::NotFound(format!("{entity_type} not found"))
            }
            DatabaseError::Conflict(detail) => ApiError::Conflict(detail),
            DatabaseError::InvalidEnum { field, value } => {
                ApiError::InvalidInput(format!("invalid value for {field}: {value}"))
            }
            other => ApiError::Unexpected(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(DatabaseError::from(err))
    }
}
