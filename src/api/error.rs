//! Error taxonomy shared by every API handler.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl is the only
//! place errors are mapped to status codes and public messages. Server-side
//! faults are logged here and never leak internal detail to the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::store;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthenticated(String),
    /// Valid identity, insufficient role.
    #[error("{0}")]
    Forbidden(String),
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),
    /// The operation conflicts with current state (already checked in/out).
    #[error("{0}")]
    Conflict(String),
    /// No such identity, record, or OTP match.
    #[error("{0}")]
    NotFound(String),
    /// Store or delivery channel failure; retryable by the client.
    #[error("service temporarily unavailable")]
    Unavailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Classify a storage failure: transient store trouble surfaces as
    /// `Unavailable`, anything else as an internal fault.
    pub(crate) fn from_store(err: anyhow::Error) -> Self {
        match err.downcast_ref::<sqlx::Error>() {
            Some(db_err) if store::is_transient(db_err) => Self::Unavailable,
            _ => Self::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            Self::Validation(message) | Self::Conflict(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            Self::Internal(err) => {
                error!("Internal error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
