use std::path::Path;

use tracing::debug;

use super::Tables;
use crate::error::{Error, Result};

pub(super) async fn load(path: &Path) -> Result<Tables> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            Error::Persistence(format!("corrupt snapshot {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tables::default()),
        Err(e) => Err(Error::Persistence(format!(
            "failed to read snapshot {}: {e}",
            path.display()
        ))),
    }
}

/// Write the snapshot next to its final location, then rename over it so a
/// crash mid-write never leaves a truncated file behind.
pub(super) async fn save(path: &Path, tables: &Tables) -> Result<()> {
    let bytes = serde_json::to_vec(tables)
        .map_err(|e| Error::Persistence(format!("failed to encode snapshot: {e}")))?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::Persistence(format!("failed to create {}: {e}", dir.display())))?;
    }

    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, &bytes)
        .await
        .map_err(|e| Error::Persistence(format!("failed to write snapshot: {e}")))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| Error::Persistence(format!("failed to replace snapshot: {e}")))?;

    debug!("Snapshot written: {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
