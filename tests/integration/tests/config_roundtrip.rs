//! Config save/load roundtrip integration tests.

use securedefaults::{ConfiguredDefaults, Defaults, StoreError};
use securedefaults_core::config::{Config, VaultBackend};
use securedefaults_core::Accessibility;
use securedefaults_integration_tests::file_config;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("securedefaults.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.keychain.accessibility, Accessibility::AfterFirstUnlock);
    assert_eq!(loaded.vault.backend, VaultBackend::File);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("securedefaults.json5");

    let mut config = file_config(dir.path(), Some("team"));
    config.keychain.access_group = Some("group.example".to_string());
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.suite.as_deref(), Some("team"));
    assert_eq!(loaded.keychain.access_group.as_deref(), Some("group.example"));
    assert_eq!(loaded.storage_path().unwrap(), dir.path().join("team.json"));
}

#[test]
fn test_hand_written_json5() {
    let config = Config::parse(
        r#"{
            // comments and unquoted keys are fine
            suite: 'work',
            keychain: { accessibility: 'when_unlocked_this_device_only' },
            vault: { backend: 'memory' },
        }"#,
    )
    .unwrap();

    assert_eq!(config.suite.as_deref(), Some("work"));
    assert_eq!(
        config.keychain.accessibility,
        Accessibility::WhenUnlockedThisDeviceOnly
    );
    assert_eq!(config.vault.backend, VaultBackend::Memory);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/securedefaults.json5"));
    assert!(result.is_err());
    let fallback = Config::load_or_default(Path::new("/nonexistent/securedefaults.json5"));
    assert_eq!(fallback.unwrap(), Config::default());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}

#[test]
fn test_invalid_config_does_not_open_a_store() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(dir.path(), Some("a/b"));
    config.keychain.accessibility = Accessibility::LEGACY;

    match ConfiguredDefaults::from_config(&config) {
        Err(StoreError::Config(e)) => {
            let message = e.to_string();
            assert!(message.contains("path separators"), "{message}");
            assert!(message.contains("deprecated"), "{message}");
        }
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_memory_backend_forgets_key_material() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(dir.path(), None);
    config.vault.backend = VaultBackend::Memory;

    let store = ConfiguredDefaults::from_config(&config)
        .unwrap()
        .with_password("p1");
    store.set_string("k", "v");
    store.persist().unwrap();

    let reopened = ConfiguredDefaults::from_config(&config).unwrap();
    assert!(!reopened.is_key_materialized());
    assert!(reopened.raw_get("k").is_some());
    assert!(!dir.path().join("vault.json").exists());
}
