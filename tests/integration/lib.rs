//! Shared fixtures for the integration tests.

use std::path::Path;

use securedefaults::ConfiguredDefaults;
use securedefaults_core::config::VaultBackend;
use securedefaults_core::Config;

/// Config keeping one plain store per suite and a shared file vault under
/// `dir`.
pub fn file_config(dir: &Path, suite: Option<&str>) -> Config {
    let mut config = Config::default();
    config.suite = suite.map(str::to_string);
    let stem = suite.unwrap_or(securedefaults_core::paths::STANDARD_SUITE);
    config.storage.path = Some(dir.join(format!("{stem}.json")));
    config.vault.backend = VaultBackend::File;
    config.vault.path = Some(dir.join("vault.json"));
    config
}

/// Open the store described by [`file_config`], as a fresh process would.
pub fn open(dir: &Path, suite: Option<&str>) -> ConfiguredDefaults {
    ConfiguredDefaults::from_config(&file_config(dir, suite)).expect("open store")
}
