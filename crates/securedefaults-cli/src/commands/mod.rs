//! CLI command implementations.

pub mod config;
pub mod store;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use securedefaults::ConfiguredDefaults;
use securedefaults_core::{Config, SecretString};

/// Resolved settings shared by the store commands.
pub struct Context {
    config_path: PathBuf,
    config: Config,
    password: Option<String>,
}

impl Context {
    pub fn new(config_path: PathBuf, config: Config, password: Option<String>) -> Self {
        Self {
            config_path,
            config,
            password,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the configured store.
    pub fn open(&self) -> anyhow::Result<ConfiguredDefaults> {
        ConfiguredDefaults::from_config(&self.config).context("Failed to open store")
    }

    /// Open the store, attaching a password when no key material exists yet.
    pub fn open_for_write(&self) -> anyhow::Result<ConfiguredDefaults> {
        let store = self.open()?;
        if store.is_key_materialized() {
            return Ok(store);
        }
        Ok(store.with_password(self.password()?))
    }

    /// Password from `--password`/`SECUREDEFAULTS_PASSWORD`, else prompted.
    pub fn password(&self) -> anyhow::Result<SecretString> {
        let password = match &self.password {
            Some(p) => p.clone(),
            None => rpassword::prompt_password("Password: ")
                .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
        };
        if password.is_empty() {
            anyhow::bail!("Password must not be empty");
        }
        Ok(SecretString::new(password))
    }
}
