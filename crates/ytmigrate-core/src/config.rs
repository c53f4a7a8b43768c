//! Persistent application configuration.
//!
//! Configuration lives in a JSON file under the platform config
//! directory. Every path the migration touches (client secrets, the two
//! token caches, the two ledgers, the subscription export) is
//! configurable; defaults put everything under the application's own
//! config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Directory name under the platform config root.
const APP_DIR: &str = "ytmigrate";
/// Config file name inside the application directory.
const CONFIG_FILE: &str = "config.json";

/// All user-tunable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// OAuth installed-app client secrets file.
    pub client_secrets_path: PathBuf,
    /// Token cache for the account being read from.
    pub source_token_cache: PathBuf,
    /// Token cache for the account being written to.
    pub destination_token_cache: PathBuf,
    /// Progress ledger for playlist item transfers.
    pub playlist_ledger_path: PathBuf,
    /// Progress ledger for channel subscriptions.
    pub subscription_ledger_path: PathBuf,
    /// Exported subscriptions CSV consumed by the subscription run.
    pub subscriptions_csv_path: PathBuf,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        let base = default_app_dir();
        Self {
            client_secrets_path: base.join("client_secrets.json"),
            source_token_cache: base.join("token-source.json"),
            destination_token_cache: base.join("token-destination.json"),
            playlist_ledger_path: base.join("processed_playlist_items.log"),
            subscription_ledger_path: base.join("processed_subscriptions.log"),
            subscriptions_csv_path: base.join("subscriptions.csv"),
        }
    }
}

/// Application directory under the platform config root, falling back
/// to the working directory when the platform reports none.
#[must_use]
pub fn default_app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Loads and saves the configuration file.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager over the default config location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_path: default_app_dir().join(CONFIG_FILE),
        }
    }

    /// Manager over an explicit config file path.
    #[must_use]
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Path of the config file this manager reads and writes.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<MigrationConfig> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(MigrationConfig::default());
        }

        let raw = fs::read_to_string(&self.config_path)?;
        let config = serde_json::from_str(&raw).map_err(|e| {
            Error::Configuration(format!(
                "malformed config at {}: {e}",
                self.config_path.display()
            ))
        })?;
        info!(path = %self.config_path.display(), "loaded config");
        Ok(config)
    }

    /// Persist the configuration, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, config: &MigrationConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, raw)?;
        info!(path = %self.config_path.display(), "saved config");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
