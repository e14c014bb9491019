use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::records::{Directory, Gallery, Treatments};
use crate::storage::LocalStorage;
use crate::store::Store;
use crate::voice::ExtractionPipeline;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub directory: Directory,
    pub treatments: Treatments,
    pub gallery: Gallery,
    pub pipeline: Arc<ExtractionPipeline>,
    /// Served statically under its public prefix
    pub uploads: LocalStorage,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        store: Store,
        uploads: LocalStorage,
        pipeline: ExtractionPipeline,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            directory: Directory::new(store.clone()),
            treatments: Treatments::new(store.clone()),
            gallery: Gallery::new(store, Arc::new(uploads.clone())),
            pipeline: Arc::new(pipeline),
            uploads,
        }
    }

    /// Wire the store, file storage and OpenAI pipeline from configuration.
    pub async fn from_config(cfg: &Config) -> Result<Self> {
        let store = match cfg.store.snapshot_path() {
            Some(path) => Store::open(path.clone())
                .await
                .with_context(|| format!("failed to open store at {}", path.display()))?,
            None => {
                info!("No store.snapshot_path configured, data is kept in memory only");
                Store::in_memory()
            }
        };

        let upload_dir = cfg.storage.upload_dir();
        tokio::fs::create_dir_all(&upload_dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", upload_dir.display()))?;
        let uploads = LocalStorage::new(upload_dir, &cfg.storage.public_prefix);

        if cfg.openai.api_key.is_empty() {
            warn!("openai.api_key is empty; voice memo transcription will fail");
        }
        let pipeline = ExtractionPipeline::openai(&cfg.openai)?;

        Ok(Self::new(&cfg.service.name, store, uploads, pipeline))
    }
}
