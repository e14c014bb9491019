//! File storage for uploaded photos.

mod local;

use async_trait::async_trait;

use crate::error::StorageError;

pub use local::LocalStorage;

/// Where uploaded files end up.
///
/// Implementations return a stable reference (a URL path) that is stored on
/// the owning row and can later be passed back to [`FileStorage::remove`].
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn save(
        &self,
        bytes: &[u8],
        filename_hint: &str,
        subfolder: &str,
    ) -> Result<String, StorageError>;

    async fn remove(&self, reference: &str) -> Result<(), StorageError>;
}
