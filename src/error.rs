use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Failures of the speech-to-text step.
///
/// Surfaced to users as "could not understand the audio, please re-record".
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("audio payload is empty")]
    EmptyAudio,

    #[error("could not read audio file: {0}")]
    Io(#[from] std::io::Error),

    #[error("transcription service unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transcription service rejected the audio ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("transcription service returned no text")]
    EmptyTranscript,
}

/// Failures of the transcript-to-structure step.
///
/// Surfaced to users as "could not structure the memo, please fill the form".
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction service unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("extraction service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("extraction service refused: {0}")]
    Refused(String),

    #[error("extraction response has no content")]
    MissingContent,

    #[error("extraction response does not match the treatment schema: {0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("refusing to store an empty file")]
    EmptyPayload,

    #[error("unknown storage reference: {0}")]
    UnknownReference(String),

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline stage that hit its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcription,
    Extraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transcription => f.write_str("transcription"),
            Stage::Extraction => f.write_str("extraction"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{stage} did not finish within {after:?}")]
    Timeout { stage: Stage, after: Duration },

    #[error("could not stage audio in a temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Error::NotFound { entity, id }
    }
}
