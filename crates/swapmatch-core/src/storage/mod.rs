mod filters;
mod memory;
mod redb_storage;
mod traits;

pub use filters::{RequestFilter, StoreStats};
pub use memory::MemoryStore;
pub use redb_storage::{RedbStore, CURRENT_SCHEMA_VERSION};
pub use traits::RequestStore;
