//! Shared CLI application state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use chimera_core::storage::PersistenceGateway;
use chimera_infra::FileKvStore;
use chimera_infra::paths::default_data_dir;
use chimera_types::catalog::Catalog;
use chimera_types::config::AppConfig;

/// Everything a subcommand needs: catalog, config, and the persistence
/// gateway over the file store.
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: AppConfig,
    pub gateway: Arc<PersistenceGateway<FileKvStore>>,
}

impl AppState {
    /// Build state rooted at `data_dir` (default: the platform data dir).
    ///
    /// A missing or malformed `config.toml` degrades to defaults; it never
    /// blocks session start.
    pub async fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let config = match tokio::fs::read_to_string(data_dir.join("config.toml")).await {
            Ok(raw) => AppConfig::from_toml_lenient(&raw),
            Err(_) => AppConfig::default(),
        };

        Ok(Self {
            catalog: Arc::new(Catalog::builtin()),
            config,
            gateway: Arc::new(PersistenceGateway::new(FileKvStore::new(data_dir))),
        })
    }
}
