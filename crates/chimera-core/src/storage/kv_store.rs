//! Key-value store trait.
//!
//! Defines the opaque blob store the builder persists into. Implementations
//! live in `chimera-infra` (file-backed) and [`super::memory`] (in-memory).

use chimera_types::error::StorageError;

/// Trait for opaque key-value persistence.
///
/// Values are arbitrary JSON. Uses RPITIT (native async fn in traits,
/// Rust 2024 edition). A missing key is `Ok(None)`, never an error.
pub trait KvStore: Send + Sync {
    /// Load the value stored under `key`, if any.
    fn load(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StorageError>> + Send;

    /// Store a value under `key` (upsert).
    fn save(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Remove `key`. No-op if the key does not exist.
    fn clear(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
