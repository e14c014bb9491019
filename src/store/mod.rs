//! In-process entity store.
//!
//! Every entity lives in an insertion-ordered table keyed by id. Writes go
//! through [`Store::transaction`], which runs under a single async mutex:
//! transactions are serialized, and a transaction that returns an error (or
//! whose snapshot cannot be written) is rolled back from its undo journal.

mod snapshot;
mod tables;
mod transaction;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};

pub use tables::Tables;
pub use transaction::Transaction;

#[derive(Clone)]
pub struct Store {
    tables: Arc<Mutex<Tables>>,
    snapshot_path: Option<Arc<PathBuf>>,
}

impl Store {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            snapshot_path: None,
        }
    }

    /// Store backed by a JSON snapshot file, loaded now if it exists and
    /// rewritten after every committed transaction.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = snapshot::load(&path).await?;
        info!(
            "Opened store at {} ({} customers, {} treatments)",
            path.display(),
            tables.customer_count(),
            tables.treatment_count()
        );

        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
            snapshot_path: Some(Arc::new(path)),
        })
    }

    /// Run a read-only closure against a consistent view of all tables.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Tables) -> T,
    {
        let tables = self.tables.lock().await;
        f(&tables)
    }

    /// Run `f` as one atomic unit: either every write it makes is kept, or
    /// none are.
    ///
    /// Once the lock is taken the unit runs on its own task, so a caller that
    /// goes away mid-snapshot cannot leave the file ahead of memory.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut tables = self.tables.clone().lock_owned().await;
        let snapshot_path = self.snapshot_path.clone();

        let unit = tokio::spawn(async move {
            let mut tx = Transaction::new(&mut tables);

            let value = f(&mut tx)?;

            if tx.is_dirty() {
                if let Some(path) = &snapshot_path {
                    snapshot::save(path, &tx).await?;
                }
            }

            tx.commit();
            Ok::<T, Error>(value)
        });

        unit.await
            .map_err(|e| Error::Persistence(format!("transaction aborted: {e}")))?
    }
}
