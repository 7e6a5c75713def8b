mod registry;
mod schedule;
mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::codec::{JsonSerializer, Serializer};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use crate::message::Message;
use crate::storage::Store;

pub use registry::PriorityRegistry;
pub use schedule::Schedule;
pub use shutdown::{should_shutdown, ShutdownCoordinator};

/// Priority of the configured default queue.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Scheduled entries promoted per loop iteration.
const PROMOTE_PER_ITERATION: usize = 1;

/// Why a `wait` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    MaxItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSummary {
    pub reason: StopReason,
    /// Messages handed to the callback during this call.
    pub processed: u64,
}

/// Sends messages into priority queues on a shared store and runs the
/// blocking consumer loop that delivers them.
///
/// Any number of drivers may share one store; the store's atomic pop keeps
/// them from receiving the same message.
pub struct Driver {
    store: Arc<dyn Store>,
    serializer: Arc<dyn Serializer>,
    clock: Arc<dyn Clock>,
    registry: PriorityRegistry,
    schedule: Schedule,
    shutdown: ShutdownCoordinator,
    refresh_interval: Duration,
    max_items: u64,
}

impl Driver {
    /// Create a driver with the JSON serializer and the system clock.
    pub fn new(store: Arc<dyn Store>, config: &DriverConfig) -> Self {
        let serializer: Arc<dyn Serializer> = Arc::new(JsonSerializer);

        let mut registry = PriorityRegistry::new();
        registry.register(DEFAULT_PRIORITY, config.default_queue.clone());
        for queue in &config.priority_queues {
            registry.register(queue.priority, queue.name.clone());
        }

        Self {
            schedule: Schedule::new(store.clone(), serializer.clone(), &config.schedule_key),
            shutdown: ShutdownCoordinator::new(store.clone(), &config.shutdown_key),
            store,
            serializer,
            clock: Arc::new(SystemClock),
            registry,
            refresh_interval: Duration::from_millis(config.refresh_interval_ms),
            max_items: config.max_items,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.schedule = Schedule::new(
            self.store.clone(),
            serializer.clone(),
            self.schedule.key().to_string(),
        );
        self.serializer = serializer;
        self
    }

    /// Register `name` as the queue for `priority`, replacing any previous one.
    pub fn setup_priority_queue(&mut self, name: impl Into<String>, priority: i32) {
        let name = name.into();
        info!(%name, priority, "priority queue registered");
        self.registry.register(priority, name);
    }

    pub fn registry(&self) -> &PriorityRegistry {
        &self.registry
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Advise every loop started before `at` to stop once `at` has passed.
    pub fn signal_shutdown(&self, at: f64) -> Result<()> {
        Ok(self.shutdown.signal_shutdown(at)?)
    }

    /// Submit a message. A message that is not yet due goes to the schedule;
    /// everything else goes straight to its priority queue.
    ///
    /// `priority` falls back to the priority stamped on the message, then to
    /// [`DEFAULT_PRIORITY`]. Returns whether the store added a new entry.
    #[tracing::instrument(skip_all, fields(msg_id = %message.id))]
    pub fn send(&self, mut message: Message, priority: Option<i32>) -> Result<bool> {
        let priority = priority.or(message.priority).unwrap_or(DEFAULT_PRIORITY);
        let key = self.registry.resolve(priority)?;
        message.priority = Some(priority);

        match message.execute_at {
            Some(at) if at > self.clock.now() => {
                debug!(priority, execute_at = at, "scheduling message");
                self.schedule.enqueue(&message, at)
            }
            _ => {
                let raw = self.serializer.serialize(&message)?;
                debug!(priority, %key, "enqueueing message");
                Ok(self.store.set_add(key, &raw)?)
            }
        }
    }

    /// Pop one message from the highest-priority non-empty queue among
    /// `priorities` (all registered queues when empty). Does not block.
    pub fn pop(&self, priorities: &[i32]) -> Result<Option<(Message, i32)>> {
        let scan = self.scan_order(priorities)?;
        self.pop_from(&scan)
    }

    /// Run the consumer loop, calling `callback(message, priority)` for each
    /// delivered message until a shutdown signal applies or `max_items`
    /// messages have been delivered.
    ///
    /// Both stop conditions are normal returns. Store and decode errors end
    /// the loop and are returned to the caller; a message whose decode fails
    /// has already been removed from the store.
    #[tracing::instrument(skip_all, fields(max_items = self.max_items))]
    pub fn wait<F>(&self, mut callback: F, priorities: &[i32]) -> Result<WaitSummary>
    where
        F: FnMut(Message, i32),
    {
        let scan = self.scan_order(priorities)?;
        let started_at = self.clock.now();
        let mut processed: u64 = 0;
        info!(queues = scan.len(), "dispatch loop started");

        let reason = loop {
            // Checkpoint: shutdown signal
            if self.shutdown.should_shutdown(started_at, self.clock.now())? {
                break StopReason::Shutdown;
            }

            // Checkpoint: max-items cutoff
            if self.max_items > 0 && processed >= self.max_items {
                break StopReason::MaxItems;
            }

            // Promote at most one due scheduled message
            self.schedule
                .promote_due(self.clock.now(), PROMOTE_PER_ITERATION, |message| {
                    self.send(message, None).map(|_| ())
                })?;

            // Scan priorities and deliver
            if let Some((message, priority)) = self.pop_from(&scan)? {
                debug!(msg_id = %message.id, priority, "delivering message");
                callback(message, priority);
                processed += 1;
                continue;
            }

            // Idle: honour a signal raised while polling before sleeping
            if self.shutdown.should_shutdown(started_at, self.clock.now())? {
                break StopReason::Shutdown;
            }
            if !self.refresh_interval.is_zero() {
                self.clock.sleep(self.refresh_interval);
            }
        };

        info!(?reason, processed, "dispatch loop stopped");
        Ok(WaitSummary { reason, processed })
    }

    /// Registered queues to scan, highest priority first, restricted to
    /// `priorities` when it is non-empty.
    fn scan_order(&self, priorities: &[i32]) -> Result<Vec<(i32, String)>> {
        for priority in priorities {
            self.registry.resolve(*priority)?;
        }
        Ok(self
            .registry
            .ordered_keys()
            .filter(|(priority, _)| priorities.is_empty() || priorities.contains(priority))
            .map(|(priority, key)| (priority, key.to_string()))
            .collect())
    }

    fn pop_from(&self, scan: &[(i32, String)]) -> Result<Option<(Message, i32)>> {
        for (priority, key) in scan {
            let Some(raw) = self.store.set_pop(key)? else {
                continue;
            };
            return match self.serializer.deserialize(&raw) {
                Ok(message) => Ok(Some((message, *priority))),
                Err(e) => {
                    error!(%key, error = %e, "popped message could not be decoded");
                    Err(DriverError::Serialize(e))
                }
            };
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests;
