use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;

use crate::session::SessionId;

/// Result alias for dialogue operations
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors surfaced by the session orchestrator, audio layer, and recognition boundary
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid session state: expected {expected}, session is {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("audio device busy")]
    DeviceBusy,

    #[error("recording not active")]
    RecordingNotActive,

    #[error("recognition endpoint unreachable: {0}")]
    TranscriptionUnavailable(String),

    #[error("recognition endpoint rejected request: {0}")]
    TranscriptionRejected(String),

    #[error("transcription timed out after {0}s")]
    TranscriptionTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogueError {
    /// Stable wire label used in JSON error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::InvalidState { .. } => "InvalidState",
            Self::NotFound(_) => "NotFound",
            Self::DeviceUnavailable(_) => "DeviceUnavailable",
            Self::DeviceBusy => "DeviceBusy",
            Self::RecordingNotActive => "RecordingNotActive",
            Self::TranscriptionUnavailable(_) => "TranscriptionUnavailable",
            Self::TranscriptionRejected(_) => "TranscriptionRejected",
            Self::TranscriptionTimeout(_) => "TranscriptionTimeout",
            Self::Io(_) => "Internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState { .. } | Self::RecordingNotActive => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DeviceUnavailable(_) | Self::DeviceBusy => StatusCode::SERVICE_UNAVAILABLE,
            Self::TranscriptionUnavailable(_) | Self::TranscriptionRejected(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::TranscriptionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for DialogueError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
