use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sealnote_core::crypto::DEFAULT_ITERATIONS;
use sealnote_core::unlock::DEFAULT_POLL_INTERVAL;

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_ORIGIN: &str = "https://sealnote.local";
pub const DEFAULT_RP_ID: &str = "sealnote.local";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SealnoteConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub vault: VaultSection,
    #[serde(default)]
    pub relay: RelaySection,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSection {
    pub iterations: u32,
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    pub url: String,
    pub origin: String,
    pub rp_id: String,
    pub poll_interval_ms: u64,
    /// Where this device keeps its signing key when acting as the second
    /// device. Defaults to the data directory.
    pub authenticator_path: Option<String>,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELAY_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            rp_id: DEFAULT_RP_ID.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            authenticator_path: None,
        }
    }
}

impl RelaySection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("sealnote.db"))
}

pub fn default_authenticator_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("authenticator.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<SealnoteConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &SealnoteConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sealnote"));
        }
    }
    Ok(home_dir()?.join(".config").join("sealnote"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sealnote"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("sealnote"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
