//! Configuration schema definitions.

use crate::accessibility::Accessibility;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main SecureDefaults configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Suite (namespace) of the store. `None` selects the standard suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,

    /// Vault entry attributes.
    #[serde(default)]
    pub keychain: KeychainConfig,

    /// Plain store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vault backend settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Attributes attached to every vault entry the store writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeychainConfig {
    /// Current accessibility policy.
    #[serde(default)]
    pub accessibility: Accessibility,

    /// Sharing group for the entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
}

/// Plain store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Plain store file. Defaults to `<home>/defaults/<suite>.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Vault backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub backend: VaultBackend,

    /// File backend location. Defaults to `<home>/vault.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Which vault implementation holds key material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    /// JSON file with owner-only permissions.
    #[default]
    File,
    /// macOS keychain generic-password items.
    Keychain,
    /// Process memory; lost on exit.
    Memory,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `SECUREDEFAULTS_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
