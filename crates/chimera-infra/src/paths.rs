//! Data directory resolution.

use std::path::PathBuf;

/// The default data directory: the platform data dir plus `chimera`,
/// falling back to a hidden directory under the cwd when the platform
/// offers none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("chimera"))
        .unwrap_or_else(|| PathBuf::from(".chimera"))
}
