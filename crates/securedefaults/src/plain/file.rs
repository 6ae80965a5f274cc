//! JSON-file plain store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use tracing::debug;

use super::PlainStore;
use crate::error::PlainStoreError;
use crate::fsutil;

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, Vec<u8>>,
    dirty: bool,
}

/// Plain store kept in memory and flushed to a JSON file on `persist`.
///
/// The file maps each key to its bytes in base64.
#[derive(Debug)]
pub struct FilePlainStore {
    path: PathBuf,
    state: Mutex<State>,
}

impl FilePlainStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PlainStoreError> {
        let path = path.into();
        let mut records = BTreeMap::new();
        if path.exists() {
            let encoded: BTreeMap<String, String> = serde_json::from_slice(&fs::read(&path)?)?;
            for (key, value) in encoded {
                let bytes = STANDARD
                    .decode(value.as_bytes())
                    .map_err(|e| PlainStoreError::Corrupt {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                records.insert(key, bytes);
            }
        }
        debug!(path = %path.display(), records = records.len(), "opened plain store");
        Ok(Self {
            path,
            state: Mutex::new(State {
                records,
                dirty: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().records.keys().cloned().collect()
    }
}

impl PlainStore for FilePlainStore {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().records.get(key).cloned()
    }

    fn write(&self, key: &str, value: Option<&[u8]>) {
        let mut state = self.state.lock();
        match value {
            Some(bytes) => {
                state.records.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                state.records.remove(key);
            }
        }
        state.dirty = true;
    }

    fn persist(&self) -> Result<(), PlainStoreError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.dirty && self.path.exists() {
            return Ok(());
        }

        let encoded: BTreeMap<&str, String> = state
            .records
            .iter()
            .map(|(k, v)| (k.as_str(), STANDARD.encode(v)))
            .collect();
        fsutil::write_private(&self.path, &serde_json::to_vec_pretty(&encoded)?)?;
        debug!(path = %self.path.display(), records = encoded.len(), "persisted plain store");
        state.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persist_and_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("defaults").join("standard.json");

        let store = FilePlainStore::open(&path).unwrap();
        store.write("a", Some(&[0u8, 1, 2, 255][..]));
        store.write("b", Some(&b"text"[..]));
        store.write("b", None);
        store.persist().unwrap();

        let reopened = FilePlainStore::open(&path).unwrap();
        assert_eq!(reopened.read("a"), Some(vec![0, 1, 2, 255]));
        assert!(reopened.read("b").is_none());
        assert_eq!(reopened.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_unpersisted_writes_are_lost() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        let store = FilePlainStore::open(&path).unwrap();
        store.write("k", Some(&b"v"[..]));
        assert_eq!(store.read("k"), Some(b"v".to_vec()));
        drop(store);

        assert!(FilePlainStore::open(&path).unwrap().read("k").is_none());
    }

    #[test]
    fn test_clean_persist_skips_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        let store = FilePlainStore::open(&path).unwrap();
        store.write("k", Some(&b"v"[..]));
        store.persist().unwrap();

        fs::write(&path, "{}").unwrap();
        store.persist().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        store.write("k2", Some(&b"w"[..]));
        store.persist().unwrap();
        let reopened = FilePlainStore::open(&path).unwrap();
        assert_eq!(reopened.keys(), vec!["k".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        fs::write(&path, r#"{"k": "***not base64***"}"#).unwrap();

        match FilePlainStore::open(&path) {
            Err(PlainStoreError::Corrupt { key, .. }) => assert_eq!(key, "k"),
            other => panic!("expected corrupt record, got {other:?}"),
        }
    }
}
