use std::collections::BTreeMap;

use crate::error::{DriverError, Result};

/// Maps each priority to the store key of its queue.
#[derive(Debug, Clone, Default)]
pub struct PriorityRegistry {
    queues: BTreeMap<i32, String>,
}

impl PriorityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` for `priority`, replacing any previous key.
    pub fn register(&mut self, priority: i32, key: impl Into<String>) {
        self.queues.insert(priority, key.into());
    }

    pub fn resolve(&self, priority: i32) -> Result<&str> {
        self.queues
            .get(&priority)
            .map(String::as_str)
            .ok_or(DriverError::UnknownPriority(priority))
    }

    /// Registered queues, highest priority first.
    pub fn ordered_keys(&self) -> impl Iterator<Item = (i32, &str)> {
        self.queues
            .iter()
            .rev()
            .map(|(priority, key)| (*priority, key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
