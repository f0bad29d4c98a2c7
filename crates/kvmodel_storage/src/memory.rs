//! In-memory key-value store.

use crate::error::{StorageError, StorageResult};
use crate::store::{HashFields, KeyValueStore, ScoreRange};
use crate::zset::SortedSet;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A value held under one key.
#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    Hash(HashFields),
    Sorted(SortedSet),
}

/// An in-memory store.
///
/// This store keeps every key in process memory and is suitable for:
/// - Unit and integration tests
/// - Embedding the mapping layer without a server
///
/// # Thread Safety
///
/// All operations take a single lock for their duration, so each call is
/// atomic with respect to the others. Batches are not: other callers may
/// interleave between the operations of a batch.
///
/// # Example
///
/// ```rust
/// use kvmodel_storage::{InMemoryStore, KeyValueStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// assert_eq!(store.incr("_meta:user").await.unwrap(), 1);
/// assert_eq!(store.incr("_meta:user").await.unwrap(), 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns every key, sorted.
    ///
    /// Useful for tests and debugging.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the score of `member` in the sorted set at `key`.
    #[must_use]
    pub fn zscore(&self, key: &str, member: &str) -> Option<f64> {
        match self.entries.read().get(key) {
            Some(Entry::Sorted(set)) => set.score(member),
            _ => None,
        }
    }

    /// Number of members in the sorted set at `key` (0 if missing).
    #[must_use]
    pub fn zcard(&self, key: &str) -> usize {
        match self.entries.read().get(key) {
            Some(Entry::Sorted(set)) => set.len(),
            _ => 0,
        }
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn hash_get(&self, key: &str) -> StorageResult<Option<HashFields>> {
        match self.entries.read().get(key) {
            None => Ok(None),
            Some(Entry::Hash(fields)) => Ok(Some(fields.clone())),
            Some(_) => Err(StorageError::wrong_type(key, "hash")),
        }
    }

    async fn hash_set(&self, key: &str, fields: HashFields) -> StorageResult<()> {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(key) {
            if !matches!(existing, Entry::Hash(_)) {
                return Err(StorageError::wrong_type(key, "hash"));
            }
        }
        entries.insert(key.to_string(), Entry::Hash(fields));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    async fn incr(&self, key: &str) -> StorageResult<i64> {
        let mut entries = self.entries.write();
        let current = match entries.get(key) {
            None => 0,
            Some(Entry::Text(text)) => text.parse::<i64>().map_err(|_| StorageError::NotAnInteger {
                key: key.to_string(),
            })?,
            Some(_) => return Err(StorageError::wrong_type(key, "string")),
        };
        let next = current.checked_add(1).ok_or_else(|| StorageError::NotAnInteger {
            key: key.to_string(),
        })?;
        entries.insert(key.to_string(), Entry::Text(next.to_string()));
        Ok(next)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.entries.read().get(key) {
            None => Ok(None),
            Some(Entry::Text(text)) => Ok(Some(text.clone())),
            Some(_) => Err(StorageError::wrong_type(key, "string")),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        // Like SET, this replaces a key of any kind.
        self.entries
            .write()
            .insert(key.to_string(), Entry::Text(value.to_string()));
        Ok(())
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> StorageResult<()> {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Sorted(SortedSet::new()));
        match entry {
            Entry::Sorted(set) => {
                set.insert(score, member);
                Ok(())
            }
            _ => Err(StorageError::wrong_type(key, "zset")),
        }
    }

    async fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>> {
        match self.entries.read().get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Sorted(set)) => Ok(set.range_by_rank(start, stop, reverse)),
            Some(_) => Err(StorageError::wrong_type(key, "zset")),
        }
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        range: ScoreRange,
        offset: usize,
        limit: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>> {
        match self.entries.read().get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Sorted(set)) => Ok(set.range_by_score(range, offset, limit, reverse)),
            Some(_) => Err(StorageError::wrong_type(key, "zset")),
        }
    }
}
