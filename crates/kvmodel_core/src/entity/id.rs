//! Id allocation.

use crate::error::CoreResult;
use crate::keys;
use async_trait::async_trait;
use kvmodel_codec::RecordId;
use kvmodel_storage::{KeyValueStore, StorageError};
use std::sync::Arc;

/// Hands out record ids.
///
/// Ids are scoped per model. Two calls for the same model never return the
/// same id, even when issued concurrently.
#[async_trait]
pub trait IdAllocator: Send + Sync {
    /// Returns the next id for `model`.
    async fn next_id(&self, model: &str) -> CoreResult<RecordId>;
}

/// Allocates ids from an atomic counter per model, starting at 1.
///
/// The counter for model `user` lives at `<prefix>user`.
pub struct CounterIdAllocator {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl CounterIdAllocator {
    /// Creates an allocator whose counters live under `prefix`.
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl IdAllocator for CounterIdAllocator {
    async fn next_id(&self, model: &str) -> CoreResult<RecordId> {
        let key = keys::counter_key(&self.prefix, model);
        let value = self.store.incr(&key).await?;
        match u64::try_from(value) {
            Ok(id) if id > 0 => Ok(RecordId::new(id)),
            _ => Err(StorageError::backend(format!(
                "counter {key} produced non-positive id {value}"
            ))
            .into()),
        }
    }
}

impl std::fmt::Debug for CounterIdAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterIdAllocator")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use kvmodel_storage::InMemoryStore;

    fn allocator() -> (Arc<InMemoryStore>, CounterIdAllocator) {
        let store = Arc::new(InMemoryStore::new());
        let allocator = CounterIdAllocator::new(store.clone(), "_meta:");
        (store, allocator)
    }

    #[tokio::test]
    async fn ids_start_at_one_per_model() {
        let (_, ids) = allocator();
        assert_eq!(ids.next_id("user").await.unwrap(), RecordId::new(1));
        assert_eq!(ids.next_id("user").await.unwrap(), RecordId::new(2));
        assert_eq!(ids.next_id("post").await.unwrap(), RecordId::new(1));
    }

    #[tokio::test]
    async fn counter_lives_under_prefix() {
        let (store, ids) = allocator();
        ids.next_id("user").await.unwrap();
        assert_eq!(store.get("_meta:user").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn negative_counter_is_rejected() {
        let (store, ids) = allocator();
        store.set("_meta:user", "-5").await.unwrap();
        let result = ids.next_id("user").await;
        assert!(matches!(result, Err(CoreError::Storage(_))));
    }
}
