use thiserror::Error;

/// Errors from raw key-value store operations.
///
/// These surface only at the `KvStore` implementation layer; the
/// persistence gateway above it swallows them (with a warning) so storage
/// trouble never takes down a session.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
