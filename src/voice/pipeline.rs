use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::candidate::ExtractionCandidate;
use super::extraction::{Extractor, OpenAiExtractor};
use super::openai::OpenAiClient;
use super::transcription::{OpenAiTranscriber, Transcriber};
use crate::config::OpenAiConfig;
use crate::error::{Error, Result, Stage, TranscriptionError};

const DEFAULT_FILENAME: &str = "audio.webm";

/// Raw voice memo as received from a client.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    /// Original file name; its extension tells the upstream the format
    pub filename: Option<String>,
}

/// Voice memo staged in a temporary file.
///
/// The file is deleted by [`ScopedAudio::release`], or on drop if the
/// pipeline unwinds before reaching it.
pub struct ScopedAudio {
    file: NamedTempFile,
    filename: String,
}

impl ScopedAudio {
    fn stage(upload: AudioUpload) -> std::io::Result<Self> {
        let filename = upload
            .filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        let suffix = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{e}"))
            .unwrap_or_else(|| ".webm".to_string());

        let mut file = tempfile::Builder::new()
            .prefix("voice-memo-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&upload.bytes)?;
        file.flush()?;

        Ok(Self { file, filename })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Delete the temp file. Failures are logged only: by now the memo has
    /// either been processed or the request has already failed.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed temporary audio {}", path.display()),
            Err(e) => warn!(
                "Failed to remove temporary audio {}: {}",
                path.display(),
                e
            ),
        }
    }
}

/// Runs transcription, then extraction, for one voice memo.
pub struct ExtractionPipeline {
    transcriber: Arc<dyn Transcriber>,
    extractor: Arc<dyn Extractor>,
    stage_timeout: Duration,
}

impl ExtractionPipeline {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        extractor: Arc<dyn Extractor>,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            transcriber,
            extractor,
            stage_timeout,
        }
    }

    /// Pipeline backed by OpenAI for both stages, sharing one HTTP client.
    pub fn openai(cfg: &OpenAiConfig) -> anyhow::Result<Self> {
        let client = OpenAiClient::from_config(cfg)?;
        let transcriber =
            OpenAiTranscriber::new(client.clone(), &cfg.transcription_model, &cfg.language);
        let extractor = OpenAiExtractor::new(client, &cfg.extraction_model);

        Ok(Self::new(
            Arc::new(transcriber),
            Arc::new(extractor),
            cfg.timeout(),
        ))
    }

    /// Turn a voice memo into a treatment candidate.
    ///
    /// Transcription and extraction failures are returned as
    /// [`Error::Transcription`] and [`Error::Extraction`] respectively; a
    /// stage that overruns its deadline yields [`Error::Timeout`]. The temp
    /// file is gone by the time this returns, whatever the outcome.
    pub async fn transcribe_and_extract(&self, upload: AudioUpload) -> Result<ExtractionCandidate> {
        if upload.bytes.is_empty() {
            return Err(TranscriptionError::EmptyAudio.into());
        }

        let size = upload.bytes.len();
        let audio = tokio::task::spawn_blocking(move || ScopedAudio::stage(upload))
            .await
            .map_err(|e| Error::TempFile(std::io::Error::other(e)))?
            .map_err(Error::TempFile)?;

        info!(
            "Voice memo staged: {} ({} bytes) at {}",
            audio.filename(),
            size,
            audio.path().display()
        );

        let outcome = self.run(&audio).await;
        audio.release();

        match &outcome {
            Ok(c) => info!(
                "Voice memo extracted: service_type={:?}, {} products",
                c.service_type,
                c.products_used.len()
            ),
            Err(e) => warn!("Voice memo pipeline failed: {}", e),
        }
        outcome
    }

    async fn run(&self, audio: &ScopedAudio) -> Result<ExtractionCandidate> {
        let transcript = timeout(self.stage_timeout, self.transcriber.transcribe(audio))
            .await
            .map_err(|_| Error::Timeout {
                stage: Stage::Transcription,
                after: self.stage_timeout,
            })??;

        debug!(
            "Transcript from {}: {} chars",
            self.transcriber.name(),
            transcript.chars().count()
        );

        let candidate = timeout(self.stage_timeout, self.extractor.extract(&transcript))
            .await
            .map_err(|_| Error::Timeout {
                stage: Stage::Extraction,
                after: self.stage_timeout,
            })??;

        Ok(candidate.normalized())
    }
}
