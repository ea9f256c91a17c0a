//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, read_config, SealnoteConfig};

/// Resolve the config file path, checking SEALNOTE_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("SEALNOTE_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, or defaults when there is none.
pub fn load_config() -> anyhow::Result<SealnoteConfig> {
    let path = resolve_config_path()?;
    if !path.exists() {
        return Ok(SealnoteConfig::default());
    }
    read_config(&path)
}

/// Resolve the store path from CLI args, then config, then the XDG default.
pub fn resolve_store_path(cli: &Cli, config: &SealnoteConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.store.as_deref() {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.store.path.as_deref() {
        return Ok(PathBuf::from(path));
    }
    default_store_path()
}

/// Error message when the store file is missing.
pub fn missing_store_message(path: &Path) -> String {
    format!(
        "No store found at {}\n\nRun:\n  sealnote init\n\nOr specify a store path:\n  SEALNOTE_STORE=/path/to/notes.db sealnote init",
        path.display()
    )
}
