//! Secondary structures.
//!
//! Secondary structures hold record ids, never record content:
//!
//! - [`IndexMaintainer`]: ordered indices and many-to-one pointers, kept in
//!   score-sorted sets and queried by rank or score window
//! - [`UniqueConstraintMaintainer`]: value-to-id lookups for unique fields
//!
//! Both stage their writes into a [`kvmodel_storage::WriteBatch`] that is
//! dispatched next to the primary record write. The two are not atomic.

mod ordered;
mod query;
mod unique;

pub use ordered::IndexMaintainer;
pub use query::{ListQuery, Order, DEFAULT_LIMIT};
pub use unique::UniqueConstraintMaintainer;
