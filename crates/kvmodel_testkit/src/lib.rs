//! # kvmodel Testkit
//!
//! Test utilities for kvmodel.
//!
//! This crate provides:
//! - Fixture models and registry helpers
//! - A failure-injecting key-value store
//! - Property-based test generators using proptest
//! - Concurrent load helpers
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust
//! use kvmodel_testkit::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let fx = TestRegistry::new();
//! let users = fx.model("user").unwrap();
//! let user = users.insert(user_record("a")).await.unwrap();
//! assert_eq!(user.id().map(|id| id.as_u64()), Some(1));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod failure;
pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::failure::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
}

pub use failure::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use stress::*;
