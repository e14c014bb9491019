use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::FileStorage;
use crate::error::StorageError;

/// Stores files under a local directory and hands out `/uploads/...` style
/// references that the HTTP layer serves statically.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Map a reference back to its file, refusing anything that would
    /// escape the storage root.
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let relative = reference
            .strip_prefix(&self.public_prefix)
            .and_then(|r| r.strip_prefix('/'))
            .filter(|r| !r.is_empty())
            .ok_or_else(|| StorageError::UnknownReference(reference.to_string()))?;

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::UnknownReference(reference.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

/// Extension of the original file name, kept so served files get a sensible
/// content type. Only short alphanumeric extensions are kept.
fn extension_of(filename_hint: &str) -> Option<String> {
    Path::new(filename_hint)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

fn clean_subfolder(subfolder: &str) -> Result<PathBuf, StorageError> {
    let path = Path::new(subfolder.trim_matches('/'));
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(StorageError::UnknownReference(subfolder.to_string()));
    }
    Ok(path.to_path_buf())
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn save(
        &self,
        bytes: &[u8],
        filename_hint: &str,
        subfolder: &str,
    ) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let subfolder = clean_subfolder(subfolder)?;
        let dir = self.root.join(&subfolder);
        tokio::fs::create_dir_all(&dir).await?;

        let name = match extension_of(filename_hint) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        info!("Stored {} bytes at {}", bytes.len(), path.display());

        let mut reference = self.public_prefix.clone();
        for part in subfolder.iter() {
            reference.push('/');
            reference.push_str(&part.to_string_lossy());
        }
        reference.push('/');
        reference.push_str(&name);
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.resolve(reference)?;
        tokio::fs::remove_file(&path).await?;
        info!("Removed stored file {}", path.display());
        Ok(())
    }
}
