use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use crate::error::{StorageError, StorageResult};
use crate::storage::keys;
use crate::storage::traits::Store;

const CF_SETS: &str = "sets";
const CF_ZSETS: &str = "zsets";
const CF_ZSCORES: &str = "zscores";
const CF_STATE: &str = "state";

/// All column family names (excluding `default` which RocksDB creates automatically).
const COLUMN_FAMILIES: &[&str] = &[CF_SETS, CF_ZSETS, CF_ZSCORES, CF_STATE];

type DB = DBWithThreadMode<MultiThreaded>;

/// RocksDB-backed store.
///
/// Sorted sets live in two column families: `zsets` keyed by score for range
/// scans, and `zscores` mapping member → score for updates and removal.
/// Read-modify-write operations hold `write_lock` and commit one `WriteBatch`,
/// so concurrent drivers sharing this store never pop the same member.
pub struct RocksDbStore {
    db: DB,
    write_lock: Mutex<()>,
}

impl RocksDbStore {
    /// Open or create a RocksDB database at the given path with all column families.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> StorageResult<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::RocksDb(format!("column family not found: {name}")))
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn count_prefix(&self, cf_name: &str, prefix: &[u8]) -> StorageResult<usize> {
        let cf = self.cf(cf_name)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix, Direction::Forward));
        let mut count = 0;
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    fn read_score(&self, key: &str, member: &str) -> StorageResult<Option<f64>> {
        let cf = self.cf(CF_ZSCORES)?;
        match self.db.get_cf(&cf, keys::member_key(key, member)?)? {
            Some(value) => {
                let bytes: [u8; 8] = value.as_slice().try_into().map_err(|_| {
                    StorageError::CorruptData(format!("score for member of {key}"))
                })?;
                Ok(Some(keys::decode_score(u64::from_be_bytes(bytes))))
            }
            None => Ok(None),
        }
    }
}

impl Store for RocksDbStore {
    fn set_add(&self, key: &str, member: &str) -> StorageResult<bool> {
        let _guard = self.lock()?;
        let cf = self.cf(CF_SETS)?;
        let member_key = keys::member_key(key, member)?;
        if self.db.get_cf(&cf, &member_key)?.is_some() {
            return Ok(false);
        }
        self.db.put_cf(&cf, &member_key, b"")?;
        Ok(true)
    }

    fn set_pop(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock()?;
        let cf = self.cf(CF_SETS)?;
        let prefix = keys::key_prefix(key)?;
        let mut iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(prefix.as_slice(), Direction::Forward));
        // First member in key order; callers only rely on "some member".
        let Some(item) = iter.next() else {
            return Ok(None);
        };
        let (raw, _) = item?;
        if !raw.starts_with(&prefix) {
            return Ok(None);
        }
        let member = String::from_utf8(raw[prefix.len()..].to_vec())
            .map_err(|e| StorageError::CorruptData(format!("set member in {key}: {e}")))?;
        self.db.delete_cf(&cf, &raw)?;
        Ok(Some(member))
    }

    fn set_len(&self, key: &str) -> StorageResult<usize> {
        self.count_prefix(CF_SETS, &keys::key_prefix(key)?)
    }

    fn sorted_add(&self, key: &str, score: f64, member: &str) -> StorageResult<bool> {
        if score.is_nan() {
            return Err(StorageError::InvalidScore(score));
        }
        let _guard = self.lock()?;
        let previous = self.read_score(key, member)?;

        let zsets = self.cf(CF_ZSETS)?;
        let zscores = self.cf(CF_ZSCORES)?;
        let mut batch = WriteBatch::default();
        if let Some(old) = previous {
            batch.delete_cf(&zsets, keys::score_key(key, old, member)?);
        }
        batch.put_cf(&zsets, keys::score_key(key, score, member)?, b"");
        batch.put_cf(
            &zscores,
            keys::member_key(key, member)?,
            keys::encode_score(score).to_be_bytes(),
        );
        self.db.write(batch)?;
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
        let cf = self.cf(CF_ZSETS)?;
        let prefix = keys::key_prefix(key)?;
        let start = keys::score_prefix(key, min)?;
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(start.as_slice(), Direction::Forward));

        let mut results = Vec::new();
        for item in iter {
            if results.len() >= limit {
                break;
            }
            let (raw, _) = item?;
            if !raw.starts_with(&prefix) {
                break;
            }
            let (score, member) = keys::parse_score_key(&raw, prefix.len())
                .ok_or_else(|| StorageError::CorruptData(format!("score key in {key}")))?;
            if score > max {
                break;
            }
            let member = String::from_utf8(member.to_vec())
                .map_err(|e| StorageError::CorruptData(format!("member in {key}: {e}")))?;
            results.push(member);
        }
        Ok(results)
    }

    fn sorted_remove(&self, key: &str, member: &str) -> StorageResult<bool> {
        let _guard = self.lock()?;
        let Some(score) = self.read_score(key, member)? else {
            return Ok(false);
        };

        let zsets = self.cf(CF_ZSETS)?;
        let zscores = self.cf(CF_ZSCORES)?;
        let mut batch = WriteBatch::default();
        batch.delete_cf(&zsets, keys::score_key(key, score, member)?);
        batch.delete_cf(&zscores, keys::member_key(key, member)?);
        self.db.write(batch)?;
        Ok(true)
    }

    fn sorted_len(&self, key: &str) -> StorageResult<usize> {
        self.count_prefix(CF_ZSCORES, &keys::key_prefix(key)?)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let cf = self.cf(CF_STATE)?;
        match self.db.get_cf(&cf, key.as_bytes())? {
            Some(value) => Ok(Some(String::from_utf8(value).map_err(|e| {
                StorageError::CorruptData(format!("value for {key}: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let cf = self.cf(CF_STATE)?;
        self.db.put_cf(&cf, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }
}
