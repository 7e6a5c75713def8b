use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::Serializer;
use crate::error::Result;
use crate::message::Message;
use crate::storage::Store;

/// The sorted set of messages that are not yet due, scored by `execute_at`.
#[derive(Clone)]
pub struct Schedule {
    store: Arc<dyn Store>,
    serializer: Arc<dyn Serializer>,
    key: String,
}

impl Schedule {
    pub fn new(
        store: Arc<dyn Store>,
        serializer: Arc<dyn Serializer>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            serializer,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store `message` to become due at `at`. Returns false if an entry with
    /// the same serialized form was already scheduled; its score is replaced.
    pub fn enqueue(&self, message: &Message, at: f64) -> Result<bool> {
        let raw = self.serializer.serialize(message)?;
        Ok(self.store.sorted_add(&self.key, at, &raw)?)
    }

    /// Move up to `limit` due entries out of the schedule, oldest first,
    /// handing each decoded message to `resend`. Returns how many were resent.
    ///
    /// Each entry is removed before it is decoded and resent. An entry whose
    /// removal reports it already gone was claimed by another driver and is
    /// skipped. A crash or decode failure after removal loses that entry.
    pub fn promote_due<F>(&self, now: f64, limit: usize, mut resend: F) -> Result<usize>
    where
        F: FnMut(Message) -> Result<()>,
    {
        let due = self
            .store
            .sorted_range_by_score(&self.key, f64::NEG_INFINITY, now, limit)?;

        let mut promoted = 0;
        for raw in due {
            if !self.store.sorted_remove(&self.key, &raw)? {
                debug!(key = %self.key, "scheduled entry already claimed");
                continue;
            }
            let message = match self.serializer.deserialize(&raw) {
                Ok(message) => message,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "dropping undecodable scheduled entry");
                    return Err(e.into());
                }
            };
            debug!(msg_id = %message.id, "promoting scheduled message");
            resend(message)?;
            promoted += 1;
        }
        Ok(promoted)
    }

    /// Number of entries still waiting.
    pub fn len(&self) -> Result<usize> {
        Ok(self.store.sorted_len(&self.key)?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
