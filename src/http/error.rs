use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{Error, StorageError, TranscriptionError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl Error {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Transcription(TranscriptionError::EmptyAudio) => {
                (StatusCode::BAD_REQUEST, "TRANSCRIPTION_FAILED")
            }
            Error::Transcription(_) => (StatusCode::BAD_GATEWAY, "TRANSCRIPTION_FAILED"),
            Error::Extraction(_) => (StatusCode::BAD_GATEWAY, "EXTRACTION_FAILED"),
            Error::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            Error::Storage(StorageError::EmptyPayload) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            Error::TempFile(_) | Error::Storage(_) | Error::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Error::Transcription(TranscriptionError::EmptyAudio) => self.to_string(),
            Error::Transcription(_) => {
                "Could not transcribe the voice memo, please record it again".to_string()
            }
            Error::Extraction(_) => {
                "Could not structure the voice memo, please fill in the form".to_string()
            }
            Error::TempFile(_) | Error::Storage(_) | Error::Persistence(_)
                if status.is_server_error() =>
            {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        if status.is_server_error() {
            error!("{} ({}): {}", code, status, self);
        } else {
            warn!("{} ({}): {}", code, status, self);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}
