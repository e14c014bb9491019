use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub openai: OpenAiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    pub cors_origins: Vec<String>,
    /// Largest accepted request body (photos, voice memos)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub transcription_model: String,
    pub extraction_model: String,
    /// ISO-639-1 hint passed to speech-to-text
    pub language: String,
    /// Upper bound for each upstream call
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    /// URL path under which stored files are served
    pub public_prefix: String,
}

impl StorageConfig {
    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.upload_dir).as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot file; in-memory only when unset
    pub snapshot_path: Option<String>,
}

impl StoreConfig {
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot_path
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
    }
}

impl Config {
    /// Load `path` (any format the `config` crate understands, extension
    /// optional, file optional) on top of built-in defaults, then apply
    /// `NOTEASTYLE__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "Note-a-Style API")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8000)?
            .set_default("service.cors_origins", vec!["http://localhost:3000"])?
            .set_default("service.max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("openai.api_key", "")?
            .set_default("openai.base_url", "https://api.openai.com/v1")?
            .set_default("openai.transcription_model", "gpt-4o-mini-transcribe")?
            .set_default("openai.extraction_model", "gpt-4o")?
            .set_default("openai.language", "ko")?
            .set_default("openai.timeout_secs", 60)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.public_prefix", "/uploads")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("NOTEASTYLE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("service.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
