//! Configuration loading and persistence.

use super::{Config, VaultBackend};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Suite names become vault entry suffixes and file stems
        if let Some(suite) = &self.suite {
            if suite.trim().is_empty() {
                errors.push("Suite name must not be empty".to_string());
            }
            if suite.contains('/') || suite.contains('\\') || suite == ".." {
                errors.push(format!(
                    "Suite name '{}' must not contain path separators",
                    suite
                ));
            }
        }

        // 2. Deprecated policies are only read for migration
        if self.keychain.accessibility.is_deprecated() {
            errors.push(format!(
                "Accessibility '{}' is deprecated and cannot be the current policy",
                self.keychain.accessibility
            ));
        }

        // 3. Empty access group is almost certainly a typo
        if let Some(group) = &self.keychain.access_group {
            if group.trim().is_empty() {
                errors.push("Access group must not be empty when set".to_string());
            }
        }

        // 4. Keychain backend is only available on macOS
        if self.vault.backend == VaultBackend::Keychain && !cfg!(target_os = "macos") {
            errors.push("Keychain vault backend is only available on macOS".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            warn!(count = errors.len(), "config failed validation");
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Resolve the plain store file for the configured suite.
    pub fn storage_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.path {
            Some(path) => Ok(paths::expand_tilde(&path.to_string_lossy())),
            None => paths::defaults_file(self.suite.as_deref()),
        }
    }

    /// Resolve the file-backed vault location.
    pub fn vault_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.vault.path {
            Some(path) => Ok(paths::expand_tilde(&path.to_string_lossy())),
            None => paths::vault_file(),
        }
    }
}
