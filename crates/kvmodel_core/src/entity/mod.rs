//! Record identity and primary record storage.

mod id;
mod store;

pub use id::{CounterIdAllocator, IdAllocator};
pub use store::{EntityStore, HashEntityStore};
