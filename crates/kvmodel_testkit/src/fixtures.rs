//! Test fixtures and registry helpers.
//!
//! Provides the `user` and `post` models used across the integration
//! tests, and a registry wired to in-memory collaborators.

use kvmodel_codec::{FieldType, Record, RecordId};
use kvmodel_core::{Config, MemoryBlobStore, ModelRegistry, ModelSchema};
use kvmodel_storage::{InMemoryStore, KeyValueStore};
use std::sync::Arc;

/// The `user` model.
///
/// Ordered by `create_at`, unique by `email` and `username`, and pointing
/// at the user who sent the invitation through `invitor`.
pub fn user_schema() -> ModelSchema {
    ModelSchema::new("user")
        .field("age", FieldType::Numeric)
        .index("create_at")
        .unique("email")
        .unique("username")
        .reference("invitor", "user")
}

/// The `post` model, whose `body` lives in `bodies`.
///
/// Ordered by `votes`, with a many-to-one relation to its author.
pub fn post_schema(bodies: Arc<MemoryBlobStore>) -> ModelSchema {
    ModelSchema::new("post")
        .field("votes", FieldType::Numeric)
        .index("votes")
        .many_to_one("author", Some("user"))
        .blob("body", bodies)
}

/// A `user` record ready to insert.
pub fn user_record(username: &str) -> Record {
    Record::new()
        .with("username", username)
        .with("email", format!("{username}@x.com"))
}

/// A `post` record by `author` ready to insert.
pub fn post_record(title: &str, author: RecordId, votes: f64) -> Record {
    Record::new()
        .with("title", title)
        .with("author_id", author)
        .with("votes", votes)
}

/// A registry over in-memory collaborators, with the fixture models.
pub struct TestRegistry {
    /// The registry.
    pub registry: ModelRegistry,
    /// The store behind it, when it is a plain in-memory store.
    pub kv: Option<Arc<InMemoryStore>>,
    /// The blob store of `post.body`.
    pub bodies: Arc<MemoryBlobStore>,
}

impl TestRegistry {
    /// Creates a registry over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a registry over a fresh in-memory store with `config`.
    pub fn with_config(config: Config) -> Self {
        let kv = Arc::new(InMemoryStore::new());
        let mut fx = Self::build(kv.clone(), config);
        fx.kv = Some(kv);
        fx
    }

    /// Creates a registry over `store`.
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self::build(store, Config::default())
    }

    fn build(store: Arc<dyn KeyValueStore>, config: Config) -> Self {
        let bodies = Arc::new(MemoryBlobStore::new());
        let registry = ModelRegistry::builder(store)
            .config(config)
            .model(user_schema())
            .model(post_schema(bodies.clone()))
            .build()
            .expect("fixture models are valid");
        Self {
            registry,
            kv: None,
            bodies,
        }
    }

    /// The in-memory store behind the registry.
    ///
    /// # Panics
    ///
    /// Panics if the registry was built over another store.
    pub fn kv(&self) -> &InMemoryStore {
        self.kv
            .as_deref()
            .expect("registry is not backed by a plain in-memory store")
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestRegistry {
    type Target = ModelRegistry;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Inserts `count` users named `u0`, `u1`, ... and returns their ids.
    pub async fn seed_users(registry: &ModelRegistry, count: usize) -> Vec<RecordId> {
        let users = registry.model("user").expect("user model registered");
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let user = users
                .insert(user_record(&format!("u{i}")))
                .await
                .expect("failed to insert user");
            ids.push(user.id().expect("inserted user has an id"));
        }
        ids
    }

    /// Inserts one post per entry of `votes`, all by `author`.
    pub async fn seed_posts(registry: &ModelRegistry, author: RecordId, votes: &[f64]) -> Vec<RecordId> {
        let posts = registry.model("post").expect("post model registered");
        let mut ids = Vec::with_capacity(votes.len());
        for (i, &vote) in votes.iter().enumerate() {
            let post = posts
                .insert(post_record(&format!("p{i}"), author, vote))
                .await
                .expect("failed to insert post");
            ids.push(post.id().expect("inserted post has an id"));
        }
        ids
    }
}
