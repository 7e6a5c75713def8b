pub mod clock;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod message;
pub mod storage;
pub mod telemetry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{JsonSerializer, Serializer};
pub use config::{Config, DriverConfig, PriorityQueueConfig, StorageBackend, StorageConfig};
pub use driver::{
    should_shutdown, Driver, PriorityRegistry, Schedule, ShutdownCoordinator, StopReason,
    WaitSummary, DEFAULT_PRIORITY,
};
pub use error::{DriverError, Result, SerializeError, StorageError, StorageResult};
pub use message::Message;
pub use storage::{MemoryStore, RocksDbStore, Store};
