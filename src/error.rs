//! Error types shared across the service and HTTP layers.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, state::lifecycle::InvalidTransition};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed room does not exist (or was swept away).
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// A join was attempted after the room left the waiting phase.
    #[error("game already started in room `{0}`")]
    GameAlreadyStarted(String),
    /// Wrong actor for a DJ-only or voter-only action.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Operation invalid for the current room/game/round status.
    #[error("phase mismatch: {0}")]
    PhaseMismatch(String),
    /// No player identity was established for the request.
    #[error("player identity missing")]
    MissingIdentity,
    /// DJ rotation exhausted without reaching the finished state. Fatal for
    /// the room lifecycle; signals an invariant violation, not a user error.
    #[error("no eligible dj left in rotation")]
    NoEligibleDj,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Storage backend failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::PhaseMismatch(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::RoomNotFound(room) => AppError::NotFound(format!("room `{room}`")),
            ServiceError::GameAlreadyStarted(room) => {
                AppError::Conflict(format!("game already started in room `{room}`"))
            }
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::PhaseMismatch(message) => AppError::Conflict(message),
            ServiceError::MissingIdentity => {
                AppError::BadRequest("player identity missing".into())
            }
            ServiceError::NoEligibleDj => {
                AppError::Internal("dj rotation exhausted before the room finished".into())
            }
            ServiceError::Validation(message) => AppError::BadRequest(message),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
