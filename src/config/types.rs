//! Core configuration types and loading.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use tracing::{error, warn};

use super::commands::CommandsConfig;
use super::defaults::{default_self_id, default_storage_path};
use super::detection::DetectionConfig;
use super::enforcement::EnforcementConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Moderator configuration.
///
/// Every table and field is optional; missing values take the documented
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Identity of the moderator account on the platform.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Probe sequence and classification.
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Throttling of tagged accounts.
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    /// Admin command words and ignored commands.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Where group records are kept.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Optional Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults where the file is
    /// missing or malformed.
    ///
    /// A file that is not valid TOML yields the full defaults. Otherwise
    /// each table is read on its own: a table with a bad value falls back
    /// to its defaults while the other tables are kept.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file unreadable; using default configuration");
                return Self::default();
            }
        };
        let table: toml::Table = match toml::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Config file is not valid TOML; using default configuration");
                return Self::default();
            }
        };

        Self {
            platform: section(&table, "platform", path),
            detection: section(&table, "detection", path),
            enforcement: section(&table, "enforcement", path),
            commands: section(&table, "commands", path),
            storage: section(&table, "storage", path),
            metrics: section(&table, "metrics", path),
        }
    }
}

/// Deserialize one top-level table, or its defaults if absent or invalid.
fn section<T>(table: &toml::Table, key: &str, path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = table.get(key) else {
        return T::default();
    };
    match value.clone().try_into() {
        Ok(section) => section,
        Err(e) => {
            error!(
                path = %path.display(),
                section = key,
                error = %e,
                "Invalid config table; using its defaults"
            );
            T::default()
        }
    }
}

/// Platform identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Account id of the moderator itself (its own messages are never judged).
    #[serde(default = "default_self_id")]
    pub self_id: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            self_id: default_self_id(),
        }
    }
}

/// Record storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON record file.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Port for the `/metrics` HTTP endpoint; disabled when unset.
    pub port: Option<u16>,
}
