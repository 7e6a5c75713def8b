use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{DriverError, Result};

/// Top-level configuration, deserializable from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub driver: DriverConfig,
    pub storage: StorageConfig,
}

/// Dispatch driver configuration (queue keys, poll interval, cutoff).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Store key of the queue registered at `DEFAULT_PRIORITY`.
    pub default_queue: String,
    /// Store key of the sorted set holding not-yet-due messages.
    pub schedule_key: String,
    /// Store key of the shutdown signal timestamp.
    pub shutdown_key: String,
    /// Idle sleep between empty polls. 0 means poll again immediately.
    pub refresh_interval_ms: u64,
    /// Messages delivered per `wait` call before it returns. 0 means unbounded.
    pub max_items: u64,
    pub priority_queues: Vec<PriorityQueueConfig>,
}

/// A queue registered at setup, in addition to the default queue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriorityQueueConfig {
    pub name: String,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    RocksDb,
}

/// Backing store selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// RocksDB data directory. Ignored by the memory backend.
    pub data_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            default_queue: "drover:queue:default".to_string(),
            schedule_key: "drover:scheduled".to_string(),
            shutdown_key: "drover:shutdown".to_string(),
            refresh_interval_ms: 1000,
            max_items: 0,
            priority_queues: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::RocksDb,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    const SEARCH_PATHS: [&'static str; 2] = ["drover.toml", "/etc/drover/drover.toml"];

    /// Parse configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DriverError::InvalidConfig(format!("error reading {}: {e}", path.display()))
        })?;
        toml::from_str(&contents).map_err(|e| {
            DriverError::InvalidConfig(format!("error parsing {}: {e}", path.display()))
        })
    }

    /// Load the first config file found in the search paths, or defaults.
    pub fn load() -> Result<Self> {
        for path in Self::SEARCH_PATHS {
            if Path::new(path).exists() {
                let config = Self::from_file(path)?;
                info!(path, "loaded configuration");
                return Ok(config);
            }
        }

        info!("no config file found, using defaults");
        Ok(Self::default())
    }
}
