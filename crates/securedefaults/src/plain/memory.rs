//! Process-local plain store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::PlainStore;
use crate::error::PlainStoreError;

/// Plain store held in memory; `persist` is a no-op.
#[derive(Debug, Default)]
pub struct MemoryPlainStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryPlainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl PlainStore for MemoryPlainStore {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.records.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: Option<&[u8]>) {
        let mut records = self.records.write();
        match value {
            Some(bytes) => {
                records.insert(key.to_string(), bytes.to_vec());
            }
            None => {
                records.remove(key);
            }
        }
    }

    fn persist(&self) -> Result<(), PlainStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_clear() {
        let store = MemoryPlainStore::new();
        assert!(store.read("k").is_none());

        store.write("k", Some(&b"bytes"[..]));
        assert_eq!(store.read("k").as_deref(), Some(&b"bytes"[..]));
        assert_eq!(store.keys(), vec!["k".to_string()]);

        store.write("k", None);
        assert!(store.read("k").is_none());
        assert!(store.persist().is_ok());
    }
}
