use crate::error::StorageResult;

/// The set and sorted-set primitives the driver needs from a backing store.
/// Implementations must be thread-safe, and `set_pop` / `sorted_remove` must
/// be atomic: two callers racing on the same entry never both receive it.
pub trait Store: Send + Sync {
    // --- Set operations ---

    /// Add `member` to the set at `key`. Returns false if it was already present.
    fn set_add(&self, key: &str, member: &str) -> StorageResult<bool>;

    /// Remove and return an arbitrary member of the set at `key`.
    fn set_pop(&self, key: &str) -> StorageResult<Option<String>>;

    /// Number of members in the set at `key`.
    fn set_len(&self, key: &str) -> StorageResult<usize>;

    // --- Sorted set operations ---

    /// Add `member` with `score`, replacing the score of an existing member.
    /// Returns false if the member was already present.
    fn sorted_add(&self, key: &str, score: f64, member: &str) -> StorageResult<bool>;

    /// Members with `min <= score <= max`, lowest score first, at most `limit`.
    fn sorted_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        limit: usize,
    ) -> StorageResult<Vec<String>>;

    /// Remove `member`. Returns false if it was not present.
    fn sorted_remove(&self, key: &str, member: &str) -> StorageResult<bool>;

    /// Number of members in the sorted set at `key`.
    fn sorted_len(&self, key: &str) -> StorageResult<usize>;

    // --- Value operations ---

    /// Retrieve a plain value by key.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a plain value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}
