//! # kvmodel Storage
//!
//! The ordered key-value store contract used by kvmodel.
//!
//! The mapping layer only needs a handful of primitives, the same ones a
//! Redis server offers:
//!
//! - hashes for primary records
//! - plain strings for unique lookups
//! - atomic counters for id allocation
//! - score-sorted sets for ordered indices and relation pointers
//! - best-effort batches of writes
//!
//! [`KeyValueStore`] is the async trait a concrete client implements.
//! [`InMemoryStore`] is a complete in-process implementation used by tests
//! and by applications that do not need a server.
//!
//! ## Example
//!
//! ```rust
//! use kvmodel_storage::{InMemoryStore, KeyValueStore, ScoreRange};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! store.zadd("user+create_at", 20.0, "2").await.unwrap();
//! store.zadd("user+create_at", 10.0, "1").await.unwrap();
//!
//! let ids = store
//!     .zrange_by_score("user+create_at", ScoreRange::all(), 0, 10, false)
//!     .await
//!     .unwrap();
//! assert_eq!(ids, vec!["1", "2"]);
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod error;
mod memory;
mod store;
mod zset;

pub use batch::{BatchOp, WriteBatch};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
pub use store::{HashFields, KeyValueStore, ScoreRange};
pub use zset::SortedSet;
