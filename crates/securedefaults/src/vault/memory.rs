//! Process-local vault.

use parking_lot::Mutex;
use zeroize::Zeroizing;

use super::entries::VaultEntries;
use super::{SecretVault, VaultQuery};
use crate::error::VaultError;

/// Vault held in process memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<VaultEntries>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries across all policies and groups.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretVault for MemoryVault {
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        self.entries.lock().insert(query, data)
    }

    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        Ok(self.entries.lock().fetch(query))
    }

    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError> {
        Ok(self.entries.lock().delete(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use securedefaults_core::Accessibility;

    #[test]
    fn test_insert_fetch_delete() {
        let vault = MemoryVault::new();
        let query = VaultQuery::new("SecureDefaults.AESKey", Accessibility::AfterFirstUnlock);

        assert!(vault.fetch(&query).unwrap().is_none());
        vault.insert(&query, &[1, 2, 3]).unwrap();
        assert_eq!(vault.fetch(&query).unwrap().unwrap().as_slice(), &[1, 2, 3]);
        assert_eq!(vault.len(), 1);

        assert!(vault.delete(&query).unwrap());
        assert!(!vault.delete(&query).unwrap());
        assert!(vault.is_empty());
    }
}
