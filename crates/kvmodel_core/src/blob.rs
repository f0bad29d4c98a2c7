//! Blob collaborators for large fields.

use crate::error::CoreResult;
use async_trait::async_trait;
use kvmodel_codec::RecordId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// External storage for one blob field.
///
/// A blob field's content never enters the primary record. The mapping
/// layer routes it here, keyed by the owning record's id, and never looks
/// inside it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads the blob of record `id`.
    async fn get(&self, id: RecordId) -> CoreResult<Option<Vec<u8>>>;

    /// Writes the blob of record `id`, replacing any previous one.
    async fn set(&self, id: RecordId, blob: Vec<u8>) -> CoreResult<()>;

    /// Deletes the blob of record `id`. Returns true if it existed.
    async fn del(&self, id: RecordId) -> CoreResult<bool>;
}

/// A blob store held in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<RecordId, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Returns true if no blob is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, id: RecordId) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(&id).cloned())
    }

    async fn set(&self, id: RecordId, blob: Vec<u8>) -> CoreResult<()> {
        self.blobs.write().insert(id, blob);
        Ok(())
    }

    async fn del(&self, id: RecordId) -> CoreResult<bool> {
        Ok(self.blobs.write().remove(&id).is_some())
    }
}
