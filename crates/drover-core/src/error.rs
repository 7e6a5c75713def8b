/// Low-level storage errors (RocksDB, lock state, stored data).
/// This is the error type for the `Store` trait. Store operations can only
/// fail with infrastructure errors, never driver errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("rocksdb error: {0}")]
    RocksDb(String),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("invalid score: {0}")]
    InvalidScore(f64),

    #[error("invalid store key: {0}")]
    InvalidKey(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        StorageError::RocksDb(err.into_string())
    }
}

/// A message could not be turned into its stored string form or back.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("failed to encode message: {0}")]
    Encode(String),

    #[error("failed to decode message: {0}")]
    Decode(String),
}

/// Driver-level errors returned from `send`, `wait` and setup.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("unknown priority: {0}")]
    UnknownPriority(i32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
pub type Result<T> = std::result::Result<T, DriverError>;
