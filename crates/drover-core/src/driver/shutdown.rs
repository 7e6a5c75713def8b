use std::sync::Arc;

use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::storage::Store;

/// Whether a loop that started at `loop_start` must stop at `now`.
///
/// True only when a signal exists, was issued at or after the loop started,
/// and is not future-dated.
pub fn should_shutdown(signal: Option<f64>, loop_start: f64, now: f64) -> bool {
    signal.is_some_and(|at| at >= loop_start && at <= now)
}

/// Reads and writes the shutdown timestamp shared by every driver on a store.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    store: Arc<dyn Store>,
    key: String,
}

impl ShutdownCoordinator {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The stored signal timestamp, if one has been set.
    pub fn signal(&self) -> StorageResult<Option<f64>> {
        match self.store.get(&self.key)? {
            Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|e| {
                StorageError::CorruptData(format!("shutdown signal {:?}: {e}", raw))
            }),
            None => Ok(None),
        }
    }

    pub fn should_shutdown(&self, loop_start: f64, now: f64) -> StorageResult<bool> {
        Ok(should_shutdown(self.signal()?, loop_start, now))
    }

    /// Persist `at` as the shutdown timestamp, replacing any earlier signal.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn signal_shutdown(&self, at: f64) -> StorageResult<()> {
        self.store.set(&self.key, &at.to_string())?;
        info!(at, "shutdown signalled");
        Ok(())
    }
}
