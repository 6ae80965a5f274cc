//! Path resolution utilities.

use crate::env::{get_var, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Suite file stem used when no suite name is configured.
pub const STANDARD_SUITE: &str = "standard";

/// Get the SecureDefaults base directory.
///
/// `SECUREDEFAULTS_HOME` wins over the default `~/.securedefaults`.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = get_var(vars::SECUREDEFAULTS_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".securedefaults"))
}

/// Get the main config file path (~/.securedefaults/securedefaults.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = get_var(vars::SECUREDEFAULTS_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("securedefaults.json5"))
}

/// Get the directory holding plain store files (~/.securedefaults/defaults).
pub fn defaults_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("defaults"))
}

/// Get the plain store file for a suite.
pub fn defaults_file(suite: Option<&str>) -> Result<PathBuf, ConfigError> {
    let stem = suite.unwrap_or(STANDARD_SUITE);
    Ok(defaults_dir()?.join(format!("{stem}.json")))
}

/// Get the file-backed vault path (~/.securedefaults/vault.json).
pub fn vault_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("vault.json"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/test");
        assert!(!expanded.to_string_lossy().contains('~'));
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn test_defaults_file_uses_suite_name() {
        let named = defaults_file(Some("com.example.app")).unwrap();
        assert!(named.ends_with("defaults/com.example.app.json"));

        let standard = defaults_file(None).unwrap();
        assert!(standard.ends_with("defaults/standard.json"));
    }

    #[test]
    fn test_vault_file_under_base_dir() {
        let vault = vault_file().unwrap();
        assert!(vault.starts_with(base_dir().unwrap()));
        assert!(vault.ends_with("vault.json"));
    }
}
