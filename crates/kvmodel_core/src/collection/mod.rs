//! Typed model API.
//!
//! Provides `TypedModel<T>` for working with Rust types instead of raw
//! records, converting through the `Entity` trait.

mod codec;
mod typed;

pub use codec::Entity;
pub use typed::TypedModel;
