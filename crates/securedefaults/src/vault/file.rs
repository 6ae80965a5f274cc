//! JSON-file vault for hosts without a usable OS keychain.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

use super::entries::VaultEntries;
use super::{SecretVault, VaultQuery};
use crate::error::VaultError;
use crate::fsutil;

/// Vault persisted as a JSON file with owner-only permissions.
///
/// Every mutation is written through before it becomes visible; a failed
/// write leaves both the file and the in-memory view unchanged.
#[derive(Debug)]
pub struct FileVault {
    path: PathBuf,
    entries: Mutex<VaultEntries>,
}

impl FileVault {
    /// Open the vault at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let path = path.into();
        let entries = if path.exists() {
            let data = Zeroizing::new(fs::read(&path)?);
            serde_json::from_slice(&data)?
        } else {
            VaultEntries::default()
        };
        debug!(path = %path.display(), "opened file vault");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut VaultEntries) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        let out = mutate(&mut next)?;
        let json = Zeroizing::new(serde_json::to_vec_pretty(&next)?);
        fsutil::write_private(&self.path, &json)?;
        *entries = next;
        Ok(out)
    }
}

impl SecretVault for FileVault {
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        debug!(name = %query.name, accessibility = %query.accessibility, "vault insert");
        self.commit(|entries| entries.insert(query, data))
    }

    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        Ok(self.entries.lock().fetch(query))
    }

    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError> {
        if self.entries.lock().fetch(query).is_none() {
            return Ok(false);
        }
        debug!(name = %query.name, accessibility = %query.accessibility, "vault delete");
        self.commit(|entries| Ok(entries.delete(query)))
    }
}
