use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{StorageError, StorageResult};
use crate::storage::keys::encode_score;
use crate::storage::traits::Store;

#[derive(Default)]
struct SortedSet {
    by_member: HashMap<String, u64>,
    by_score: BTreeSet<(u64, String)>,
}

#[derive(Default)]
struct Inner {
    sets: HashMap<String, HashSet<String>>,
    sorted: HashMap<String, SortedSet>,
    values: HashMap<String, String>,
}

/// In-process store. Every operation runs under one mutex, which makes
/// each call atomic with respect to all others.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl Store for MemoryStore {
    fn set_add(&self, key: &str, member: &str) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        Ok(inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn set_pop(&self, key: &str) -> StorageResult<Option<String>> {
        let mut inner = self.lock()?;
        let Some(set) = inner.sets.get_mut(key) else {
            return Ok(None);
        };
        // HashSet iteration order is randomized per instance, which stands in
        // for SPOP's random choice.
        let member = set.iter().next().cloned();
        if let Some(m) = &member {
            set.remove(m);
        }
        Ok(member)
    }

    fn set_len(&self, key: &str) -> StorageResult<usize> {
        let inner = self.lock()?;
        Ok(inner.sets.get(key).map_or(0, HashSet::len))
    }

    fn sorted_add(&self, key: &str, score: f64, member: &str) -> StorageResult<bool> {
        if score.is_nan() {
            return Err(StorageError::InvalidScore(score));
        }
        let encoded = encode_score(score);
        let mut inner = self.lock()?;
        let zset = inner.sorted.entry(key.to_string()).or_default();
        let previous = zset.by_member.insert(member.to_string(), encoded);
        if let Some(old) = previous {
            zset.by_score.remove(&(old, member.to_string()));
        }
        zset.by_score.insert((encoded, member.to_string()));
        Ok(previous.is_none())
    }

    fn sorted_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        limit: usize,
    ) -> StorageResult<Vec<String>> {
        if min.is_nan() || max.is_nan() {
            return Err(StorageError::InvalidScore(f64::NAN));
        }
        let inner = self.lock()?;
        let Some(zset) = inner.sorted.get(key) else {
            return Ok(Vec::new());
        };
        let (lo, hi) = (encode_score(min), encode_score(max));
        Ok(zset
            .by_score
            .range((lo, String::new())..)
            .take_while(|(score, _)| *score <= hi)
            .take(limit)
            .map(|(_, member)| member.clone())
            .collect())
    }

    fn sorted_remove(&self, key: &str, member: &str) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        let Some(zset) = inner.sorted.get_mut(key) else {
            return Ok(false);
        };
        match zset.by_member.remove(member) {
            Some(score) => {
                zset.by_score.remove(&(score, member.to_string()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn sorted_len(&self, key: &str) -> StorageResult<usize> {
        let inner = self.lock()?;
        Ok(inner.sorted.get(key).map_or(0, |z| z.by_member.len()))
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let inner = self.lock()?;
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.lock()?;
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
