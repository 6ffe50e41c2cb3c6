//! Application configuration.
//!
//! `AppConfig` represents the optional `config.toml` in the data directory.
//! All fields have defaults; a missing or malformed file degrades to
//! `AppConfig::default()` rather than failing session start.

use serde::{Deserialize, Serialize};

use crate::generation::{GenerationStep, default_steps};

/// Top-level configuration for the Chimera builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credits debited per generation.
    #[serde(default = "default_generate_cost")]
    pub generate_cost: u64,

    /// Override for the generation step table. Empty means "use the
    /// built-in steps".
    #[serde(default)]
    pub steps: Vec<GenerationStep>,
}

fn default_generate_cost() -> u64 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generate_cost: default_generate_cost(),
            steps: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Parse TOML, degrading to defaults on any error.
    pub fn from_toml_lenient(raw: &str) -> Self {
        toml::from_str(raw).unwrap_or_default()
    }

    /// The effective step table: the configured override, or the built-in
    /// five-step table when none is configured.
    pub fn effective_steps(&self) -> Vec<GenerationStep> {
        if self.steps.is_empty() {
            default_steps()
        } else {
            self.steps.clone()
        }
    }
}
