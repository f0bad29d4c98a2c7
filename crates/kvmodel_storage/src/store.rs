//! Key-value store trait definition.

use crate::batch::{BatchOp, WriteBatch};
use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Field-to-string mapping held by a hash key.
pub type HashFields = BTreeMap<String, String>;

/// Inclusive score bounds for a sorted-set range query.
///
/// Missing bounds are expressed with infinities, so `ScoreRange::all()`
/// selects every member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    /// Lowest accepted score (inclusive).
    pub min: f64,
    /// Highest accepted score (inclusive).
    pub max: f64,
}

impl ScoreRange {
    /// Creates a closed range `[min, max]`.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Creates a range from optional bounds, defaulting to the infinities.
    #[must_use]
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.unwrap_or(f64::NEG_INFINITY),
            max: max.unwrap_or(f64::INFINITY),
        }
    }

    /// The unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Returns true if `score` lies inside the range.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// An ordered key-value store.
///
/// The store offers the primitives the mapping layer projects records onto:
/// hashes for primary records, plain strings for lookups, atomic counters
/// and score-sorted sets. Implementations talk to a remote server or keep
/// everything in memory; callers treat every method as a fallible remote call.
///
/// # Invariants
///
/// - `incr` is atomic: concurrent callers never observe the same value
/// - `hash_set` replaces the whole hash
/// - `zadd` on an existing member overwrites its score
/// - rank and score ranges are inclusive on both ends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads every field of a hash, or `None` if the key does not exist.
    async fn hash_get(&self, key: &str) -> StorageResult<Option<HashFields>>;

    /// Replaces the hash stored at `key` with `fields`.
    async fn hash_set(&self, key: &str, fields: HashFields) -> StorageResult<()>;

    /// Deletes a key of any kind. Returns true if it existed.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Returns true if the key exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Atomically increments the counter at `key` and returns the new value.
    ///
    /// A missing counter starts from zero, so the first call returns 1.
    async fn incr(&self, key: &str) -> StorageResult<i64>;

    /// Reads a string value.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a string value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Adds `member` to the sorted set at `key`, or updates its score.
    async fn zadd(&self, key: &str, score: f64, member: &str) -> StorageResult<()>;

    /// Returns members ranked `start..=stop`.
    ///
    /// With `reverse` the ranking is from the highest score down.
    async fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>>;

    /// Returns members whose score lies in `range`, skipping `offset` and
    /// returning at most `limit` of them.
    ///
    /// With `reverse` members come from the highest score down.
    async fn zrange_by_score(
        &self,
        key: &str,
        range: ScoreRange,
        offset: usize,
        limit: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>>;

    /// Dispatches a batch of writes as one unit.
    ///
    /// The default runs the operations in order and stops at the first
    /// failure. Operations applied before the failure stay applied: a batch
    /// is best-effort, not a transaction.
    async fn exec(&self, batch: WriteBatch) -> StorageResult<()> {
        for (index, op) in batch.into_ops().into_iter().enumerate() {
            let result = match op {
                BatchOp::Set { key, value } => self.set(&key, &value).await,
                BatchOp::ZAdd { key, score, member } => self.zadd(&key, score, &member).await,
            };
            if let Err(e) = result {
                return Err(StorageError::BatchFailed {
                    index,
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_range_defaults_to_infinities() {
        let range = ScoreRange::from_bounds(None, Some(10.0));
        assert_eq!(range.min, f64::NEG_INFINITY);
        assert_eq!(range.max, 10.0);
        assert!(range.contains(-1e300));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.5));
    }

    #[test]
    fn score_range_is_closed() {
        let range = ScoreRange::new(1.0, 2.0);
        assert!(range.contains(1.0));
        assert!(range.contains(2.0));
        assert!(!range.contains(0.999));
        assert!(ScoreRange::all().contains(f64::INFINITY));
    }
}
