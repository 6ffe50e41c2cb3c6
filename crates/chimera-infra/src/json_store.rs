//! File-backed key-value store.
//!
//! Implements `KvStore` from `chimera-core` with one `<key>.json` file per
//! key under a data directory. Writes go through a temp file and a rename
//! so a crash mid-write leaves the previous value intact. A malformed file
//! on disk reads as "no prior state" rather than an error, matching the
//! decode-or-default contract at the persistence boundary.

use std::path::{Path, PathBuf};

use tracing::warn;

use chimera_core::storage::KvStore;
use chimera_types::error::StorageError;

/// Durable `KvStore` rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Map a storage key to a safe file stem: alphanumerics, dots, dashes and
/// underscores pass through, everything else becomes an underscore.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn read_value(path: &Path) -> Result<Option<serde_json::Value>, StorageError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(path = %path.display(), %err, "malformed stored value, treating as absent");
            Ok(None)
        }
    }
}

impl KvStore for FileKvStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        read_value(&self.path_for(key)).await
    }

    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let encoded = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&tmp, encoded).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
