//! End-to-end store scenarios over file-backed collaborators.
//!
//! Each `open` call re-reads the plain store and vault from disk, so a new
//! handle behaves like a later run of the program.

use securedefaults::vault::VaultQuery;
use securedefaults::{Defaults, FileVault, SecretVault, StoreError, Value};
use securedefaults_core::Accessibility;
use securedefaults_integration_tests::open;
use tempfile::TempDir;

#[test]
fn test_set_persist_get() {
    let dir = TempDir::new().unwrap();

    let store = open(dir.path(), None).with_password("p1");
    store.set_string("k", "hello");
    store.persist().unwrap();
    assert_eq!(store.string("k").as_deref(), Some("hello"));

    let later = open(dir.path(), None);
    assert_eq!(later.string("k").as_deref(), Some("hello"));
}

#[test]
fn test_integer_is_not_a_float() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");

    store.set_integer("k", 10);
    assert_eq!(store.integer("k"), 10);
    assert!(store.float("k").is_nan());
    assert!(store.double("k").is_nan());
}

#[test]
fn test_ciphertext_on_disk_hides_the_value() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");
    store.set_string("secret", "plaintext-marker");
    store.persist().unwrap();

    let on_disk = std::fs::read_to_string(dir.path().join("standard.json")).unwrap();
    assert!(on_disk.contains("\"secret\""));
    assert!(!on_disk.contains("plaintext-marker"));

    let raw = store.raw_get("secret").unwrap();
    assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());
}

#[test]
fn test_moved_records_do_not_open_with_another_password() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");
    store.set_string("k", "hello");
    store.persist().unwrap();

    // Same records on a machine with an empty vault.
    std::fs::remove_file(dir.path().join("vault.json")).unwrap();
    let elsewhere = open(dir.path(), None).with_password("p2");
    assert_ne!(elsewhere.string("k").as_deref(), Some("hello"));
}

#[test]
fn test_password_rotation_across_runs() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");
    store.set_string("k", "hello");
    store.persist().unwrap();

    let mut rotated = open(dir.path(), None);
    rotated.set_password("p2").unwrap();
    assert!(!rotated.is_key_materialized());
    rotated.set_string("fresh", "new");
    rotated.persist().unwrap();

    let later = open(dir.path(), None);
    assert!(later.string("k").is_none());
    assert_eq!(later.string("fresh").as_deref(), Some("new"));
}

#[test]
fn test_missing_password_surfaces_in_strict_mode() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), Some("team"));

    match store.try_set("k", Some(&Value::from("v"))) {
        Err(StoreError::MissingPassword { suite }) => assert_eq!(suite, "team"),
        other => panic!("expected missing password, got {other:?}"),
    }
    store.set_string("k", "v");
    assert!(store.raw_get("k").is_none());
}

#[test]
fn test_suites_keep_separate_keys() {
    let dir = TempDir::new().unwrap();
    let a = open(dir.path(), Some("a")).with_password("p1");
    a.set_string("k", "from a");
    let b = open(dir.path(), Some("b")).with_password("p1");
    b.set_string("k", "from b");

    // Same password, different salts and IVs.
    assert_ne!(*a.key().unwrap(), *b.key().unwrap());
    assert_ne!(a.raw_get("k"), b.raw_get("k"));
    assert_eq!(a.string("k").as_deref(), Some("from a"));
    assert_eq!(b.string("k").as_deref(), Some("from b"));
}

#[test]
fn test_null_and_raw_semantics() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");

    store.set_string("k", "v");
    store.set("k", None);
    assert!(store.object("k").is_none());

    let payload = [0u8, 159, 146, 150, 255];
    store.raw_set("raw", Some(&payload[..]));
    store.persist().unwrap();
    assert_eq!(open(dir.path(), None).raw_get("raw"), Some(payload.to_vec()));
}

#[test]
fn test_legacy_vault_entries_migrate_on_first_read() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), None).with_password("p1");
    store.set_string("k", "hello");
    store.persist().unwrap();
    let key = store.key().unwrap();
    let iv = store.iv().unwrap();
    drop(store);

    // Rewrite the vault as an older release would have left it.
    let vault_path = dir.path().join("vault.json");
    std::fs::remove_file(&vault_path).unwrap();
    {
        let vault = FileVault::open(&vault_path).unwrap();
        vault
            .insert(&VaultQuery::new("SecureDefaults.AESKey", Accessibility::LEGACY), key.as_slice())
            .unwrap();
        vault
            .insert(&VaultQuery::new("SecureDefaults.AESIV", Accessibility::LEGACY), &iv)
            .unwrap();
    }

    let upgraded = open(dir.path(), None);
    assert_eq!(upgraded.string("k").as_deref(), Some("hello"));

    let vault = FileVault::open(&vault_path).unwrap();
    for name in ["SecureDefaults.AESKey", "SecureDefaults.AESIV"] {
        let legacy = VaultQuery::new(name, Accessibility::LEGACY);
        let current = VaultQuery::new(name, Accessibility::AfterFirstUnlock);
        assert!(vault.fetch(&legacy).unwrap().is_none(), "{name} still legacy");
        assert!(vault.fetch(&current).unwrap().is_some(), "{name} not migrated");
    }
}

#[test]
fn test_assigned_key_material_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut store = open(dir.path(), None);
    store.assign_key_material(&[3u8; 32], &[4u8; 16]).unwrap();
    store.set_bool("flag", true);
    store.persist().unwrap();

    let later = open(dir.path(), None);
    assert!(later.is_key_materialized());
    assert_eq!(*later.key().unwrap(), [3u8; 32]);
    assert!(later.bool("flag"));
}
