//! Failure injection.
//!
//! [`FlakyStore`] wraps an [`InMemoryStore`] and fails selected operations
//! on demand, to exercise the partial-write paths of the mapping layer.

use async_trait::async_trait;
use kvmodel_storage::{
    HashFields, InMemoryStore, KeyValueStore, ScoreRange, StorageError, StorageResult, WriteBatch,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A key-value store whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: Arc<InMemoryStore>,
    fail_exec: AtomicBool,
    fail_hash_set: AtomicBool,
    fail_incr: AtomicBool,
    exec_calls: AtomicUsize,
}

impl FlakyStore {
    /// Creates a store over a fresh in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over `inner`.
    pub fn wrap(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// The wrapped store, for inspecting what was written.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    /// Makes batch execution fail.
    pub fn set_fail_exec(&self, fail: bool) {
        self.fail_exec.store(fail, Ordering::SeqCst);
    }

    /// Makes hash writes, and so primary record writes, fail.
    pub fn set_fail_hash_set(&self, fail: bool) {
        self.fail_hash_set.store(fail, Ordering::SeqCst);
    }

    /// Makes counter increments, and so id allocation, fail.
    pub fn set_fail_incr(&self, fail: bool) {
        self.fail_incr.store(fail, Ordering::SeqCst);
    }

    /// Number of batches dispatched, failed ones included.
    pub fn exec_calls(&self) -> usize {
        self.exec_calls.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, operation: &str) -> StorageResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::backend(format!("injected {operation} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn hash_get(&self, key: &str) -> StorageResult<Option<HashFields>> {
        self.inner.hash_get(key).await
    }

    async fn hash_set(&self, key: &str, fields: HashFields) -> StorageResult<()> {
        Self::check(&self.fail_hash_set, "hash_set")?;
        self.inner.hash_set(key, fields).await
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn incr(&self, key: &str) -> StorageResult<i64> {
        Self::check(&self.fail_incr, "incr")?;
        self.inner.incr(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.set(key, value).await
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> StorageResult<()> {
        self.inner.zadd(key, score, member).await
    }

    async fn zrange(
        &self,
        key: &str,
        start: usize,
        stop: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>> {
        self.inner.zrange(key, start, stop, reverse).await
    }

    async fn zrange_by_score(
        &self,
        key: &str,
        range: ScoreRange,
        offset: usize,
        limit: usize,
        reverse: bool,
    ) -> StorageResult<Vec<String>> {
        self.inner
            .zrange_by_score(key, range, offset, limit, reverse)
            .await
    }

    async fn exec(&self, batch: WriteBatch) -> StorageResult<()> {
        self.exec_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exec.load(Ordering::SeqCst) {
            return Err(StorageError::BatchFailed {
                index: 0,
                message: "injected exec failure".to_string(),
            });
        }
        self.inner.exec(batch).await
    }
}
