//! Infrastructure implementations for the Chimera builder.
//!
//! Provides the durable `KvStore` backing (one JSON file per key) and data
//! directory resolution. The in-memory store lives in `chimera-core` so the
//! core can fall back to it when no durable storage is available.

pub mod json_store;
pub mod paths;

pub use json_store::FileKvStore;
