//! Persistence layer: the raw key-value trait, an in-memory store, and the
//! typed best-effort gateway the rest of the core talks to.

pub mod gateway;
pub mod kv_store;
pub mod memory;

pub use gateway::PersistenceGateway;
pub use kv_store::KvStore;
pub use memory::MemoryKvStore;
