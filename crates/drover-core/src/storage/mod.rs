pub(crate) mod keys;
mod memory;
mod rocksdb;
mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageResult;

pub use self::memory::MemoryStore;
pub use self::rocksdb::RocksDbStore;
pub use traits::Store;

/// Build the backing store selected by `config`.
pub fn open(config: &StorageConfig) -> StorageResult<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::RocksDb => {
            info!(data_dir = %config.data_dir.display(), "opening rocksdb store");
            Ok(Arc::new(RocksDbStore::open(&config.data_dir)?))
        }
    }
}
