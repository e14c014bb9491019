use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::info;

use super::openai::OpenAiClient;
use super::pipeline::ScopedAudio;
use crate::error::TranscriptionError;

/// Speech-to-text capability.
///
/// Receives the memo already staged in a temp file; the caller owns and
/// cleans up that file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &ScopedAudio) -> Result<String, TranscriptionError>;

    /// Name for logging
    fn name(&self) -> &str;
}

/// OpenAI `audio/transcriptions` endpoint.
pub struct OpenAiTranscriber {
    client: OpenAiClient,
    model: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiTranscriber {
    pub fn new(client: OpenAiClient, model: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, audio: &ScopedAudio) -> Result<String, TranscriptionError> {
        let bytes = tokio::fs::read(audio.path()).await?;
        if bytes.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        info!(
            "Transcribing {} ({} bytes) with {}",
            audio.filename(),
            bytes.len(),
            self.model
        );

        let form = Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "json")
            .part("file", Part::bytes(bytes).file_name(audio.filename().to_string()));

        let response = self
            .client
            .post("audio/transcriptions")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(TranscriptionError::EmptyTranscript);
        }

        info!("Transcript received ({} chars)", text.chars().count());
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
