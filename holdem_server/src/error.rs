use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use holdem_core::{ErrorKind, GameError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::protocol::ProtocolError;

/// Body of every failed API call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable, e.g. `table_not_found`.
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Protocol(_) => StatusCode::BAD_REQUEST,
            ApiError::Game(err) => match err.kind() {
                ErrorKind::Validation => match err {
                    GameError::TableNotFound(_) | GameError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
                    GameError::TableAlreadyExists(_) | GameError::DuplicatePlayer(_) => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                },
                ErrorKind::State | ErrorKind::Integrity => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Game(err) => err.code(),
            ApiError::Protocol(_) => "bad_request",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Game(err) if err.kind() == ErrorKind::Integrity => error!(%err, "chip integrity failure"),
            _ if status.is_server_error() => warn!(error = %self, "request failed"),
            _ => debug!(error = %self, "request rejected"),
        }
        (status, Json(self.to_error_response())).into_response()
    }
}
