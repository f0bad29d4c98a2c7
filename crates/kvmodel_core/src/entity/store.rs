//! Primary record storage.

use crate::error::CoreResult;
use crate::keys;
use async_trait::async_trait;
use kvmodel_codec::{FieldMap, RecordId};
use kvmodel_storage::KeyValueStore;
use std::sync::Arc;

/// Stores the encoded primary record of each (model, id).
///
/// Implementations are remote and fallible; the mapping layer does not
/// cache anything read through them.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Reads a record's fields, or `None` if it does not exist.
    async fn get(&self, model: &str, id: RecordId) -> CoreResult<Option<FieldMap>>;

    /// Writes a record's fields, replacing whatever was stored.
    async fn set(&self, model: &str, id: RecordId, fields: FieldMap) -> CoreResult<()>;

    /// Deletes a record. Returns true if it existed.
    async fn delete(&self, model: &str, id: RecordId) -> CoreResult<bool>;

    /// Returns true if the record exists.
    async fn exists(&self, model: &str, id: RecordId) -> CoreResult<bool>;
}

/// Keeps each record in a hash at `<model>:<id>`.
pub struct HashEntityStore {
    store: Arc<dyn KeyValueStore>,
}

impl HashEntityStore {
    /// Creates an entity store over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntityStore for HashEntityStore {
    async fn get(&self, model: &str, id: RecordId) -> CoreResult<Option<FieldMap>> {
        Ok(self.store.hash_get(&keys::record_key(model, id)).await?)
    }

    async fn set(&self, model: &str, id: RecordId, fields: FieldMap) -> CoreResult<()> {
        Ok(self
            .store
            .hash_set(&keys::record_key(model, id), fields)
            .await?)
    }

    async fn delete(&self, model: &str, id: RecordId) -> CoreResult<bool> {
        Ok(self.store.delete(&keys::record_key(model, id)).await?)
    }

    async fn exists(&self, model: &str, id: RecordId) -> CoreResult<bool> {
        Ok(self.store.exists(&keys::record_key(model, id)).await?)
    }
}

impl std::fmt::Debug for HashEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashEntityStore").finish_non_exhaustive()
    }
}
