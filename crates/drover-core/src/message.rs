use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work handed to the driver. The payload is opaque to the driver;
/// only `execute_at` and `priority` influence routing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub headers: HashMap<String, String>,
    pub payload: Vec<u8>,
    /// Seconds since the Unix epoch after which the message may be delivered.
    pub execute_at: Option<f64>,
    /// Priority the message was routed to. Stamped by `Driver::send` before
    /// serialization so a scheduled message is promoted back to it.
    pub priority: Option<i32>,
}

impl Message {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Self::new_id(),
            headers: HashMap::new(),
            payload: payload.into(),
            execute_at: None,
            priority: None,
        }
    }

    /// Generate a new UUIDv7 message ID.
    pub fn new_id() -> Uuid {
        Uuid::now_v7()
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn execute_at(mut self, at: f64) -> Self {
        self.execute_at = Some(at);
        self
    }

    /// True when the message has no execution time or it is not after `now`.
    pub fn is_due(&self, now: f64) -> bool {
        self.execute_at.map_or(true, |at| at <= now)
    }
}
