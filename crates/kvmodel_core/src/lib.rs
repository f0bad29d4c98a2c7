//! # kvmodel Core
//!
//! Schema-driven entity mapping over an ordered key-value store.
//!
//! Models are declared once as [`ModelSchema`]s and registered with a
//! [`ModelRegistry`]. Each record of a model is kept as a hash; its
//! secondary structures live next to it in the same store:
//!
//! - Ordered indices as score-sorted sets, listable by rank or score window
//! - Unique fields as value-to-id lookups
//! - Many-to-one relations as per-target sorted sets of pointing ids
//! - Reference fields expanded into nested records on read
//!
//! Writes are not transactional. The primary record and the batch of
//! secondary entries are issued together, and a failure of the batch is
//! reported rather than rolled back.
//!
//! ## Usage
//!
//! ```rust
//! use kvmodel_core::{ListQuery, ModelRegistry, ModelSchema, Record, RecordId};
//! use kvmodel_storage::InMemoryStore;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let registry = ModelRegistry::builder(Arc::new(InMemoryStore::new()))
//!     .model(ModelSchema::new("user").index("create_at").unique("email"))
//!     .build()?;
//! let users = registry.model("user")?;
//!
//! users.insert(Record::new().with("username", "a").with("email", "a@x.com")).await?;
//! users.insert(Record::new().with("username", "b").with("email", "b@x.com")).await?;
//!
//! let a = users.get_by_unique("email", "a@x.com").await?;
//! assert_eq!(a.and_then(|r| r.id()), Some(RecordId::new(1)));
//!
//! let ids = users.list_ids("create_at", &ListQuery::ascending()).await?;
//! assert_eq!(ids, vec![RecordId::new(1), RecordId::new(2)]);
//! # Ok::<(), kvmodel_core::CoreError>(())
//! # }).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod collection;
mod config;
mod entity;
mod error;
mod index;
pub mod keys;
mod model;
mod registry;
mod relation;
mod schema;

pub use blob::{BlobStore, MemoryBlobStore};
pub use collection::{Entity, TypedModel};
pub use config::{Config, DEFAULT_COUNTER_PREFIX, DEFAULT_MAX_INSERT_ATTEMPTS};
pub use entity::{CounterIdAllocator, EntityStore, HashEntityStore, IdAllocator};
pub use error::{CoreError, CoreResult};
pub use index::{IndexMaintainer, ListQuery, Order, UniqueConstraintMaintainer, DEFAULT_LIMIT};
pub use model::Model;
pub use registry::{ModelRegistry, RegistryBuilder};
pub use relation::RelationResolver;
pub use schema::{IndexDescriptor, IndexKind, ModelSchema};

// Re-export value types for convenience
pub use kvmodel_codec::{FieldType, Record, RecordId, Value};
