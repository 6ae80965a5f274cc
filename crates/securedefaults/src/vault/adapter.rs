//! Policy-bound access to a vault, with legacy-policy migration.

use securedefaults_core::Accessibility;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{SecretVault, VaultQuery};
use crate::error::VaultError;

/// Reads and writes vault entries under one current accessibility policy and
/// sharing group.
///
/// Entries still held under [`Accessibility::LEGACY`] are moved over lazily:
/// a write that collides with a legacy entry removes it and retries, and a
/// read that only finds a legacy entry rewrites it under the current policy
/// before returning it.
#[derive(Debug)]
pub struct VaultAdapter<V> {
    vault: V,
    accessibility: Accessibility,
    group: Option<String>,
}

impl<V: SecretVault> VaultAdapter<V> {
    /// Adapter using the default policy and no sharing group.
    pub fn new(vault: V) -> Self {
        Self {
            vault,
            accessibility: Accessibility::default(),
            group: None,
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_access_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn access_group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The wrapped vault.
    pub fn vault(&self) -> &V {
        &self.vault
    }

    fn query(&self, name: &str, accessibility: Accessibility) -> VaultQuery {
        VaultQuery::new(name, accessibility).with_group(self.group.clone())
    }

    fn migrates(&self) -> bool {
        self.accessibility != Accessibility::LEGACY
    }

    /// Store `data` under `name`, or delete the entry when `data` is `None`.
    ///
    /// Writing replaces any entry with the same name, policy and group.
    pub fn set(&self, name: &str, data: Option<&[u8]>) -> Result<(), VaultError> {
        let current = self.query(name, self.accessibility);
        let err = match self.write_exact(&current, data) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let legacy = self.query(name, Accessibility::LEGACY);
        if !self.migrates() || self.vault.fetch(&legacy)?.is_none() {
            return Err(VaultError::Write {
                name: name.to_string(),
                reason: err.to_string(),
            });
        }

        debug!(name, "removing legacy vault entry before rewriting");
        // Deletes ignore the group, so a shared legacy copy goes too.
        self.vault
            .delete(&VaultQuery::new(name, Accessibility::LEGACY))?;
        match data {
            Some(_) => self
                .write_exact(&current, data)
                .map_err(|err| VaultError::Write {
                    name: name.to_string(),
                    reason: err.to_string(),
                }),
            None => Ok(()),
        }
    }

    fn write_exact(&self, query: &VaultQuery, data: Option<&[u8]>) -> Result<(), VaultError> {
        match data {
            Some(data) => {
                self.vault.delete(query)?;
                self.vault.insert(query, data)
            }
            None => {
                if self.vault.delete(query)? {
                    Ok(())
                } else {
                    Err(VaultError::NotFound {
                        name: query.name.clone(),
                    })
                }
            }
        }
    }

    /// Read the entry for `name`, migrating it from the legacy policy if
    /// that is the only place it exists.
    pub fn get(&self, name: &str) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        let read_err = |err: VaultError| VaultError::Read {
            name: name.to_string(),
            reason: err.to_string(),
        };

        let current = self.query(name, self.accessibility);
        if let Some(data) = self.vault.fetch(&current).map_err(read_err)? {
            return Ok(Some(data));
        }
        if !self.migrates() {
            return Ok(None);
        }

        let legacy = self.query(name, Accessibility::LEGACY);
        let Some(data) = self.vault.fetch(&legacy).map_err(read_err)? else {
            return Ok(None);
        };

        debug!(name, to = %self.accessibility, "migrating legacy vault entry");
        self.vault
            .delete(&VaultQuery::new(name, Accessibility::LEGACY))
            .map_err(read_err)?;
        if let Err(err) = self.write_exact(&current, Some(data.as_slice())) {
            warn!(name, error = %err, "failed to rewrite migrated vault entry");
        }
        Ok(Some(data))
    }

    /// Delete the entry for `name` under the current policy, in any group.
    pub fn remove(&self, name: &str) -> Result<bool, VaultError> {
        self.vault
            .delete(&VaultQuery::new(name, self.accessibility))
    }

    /// Delete the entry for `name` under both the current and the legacy
    /// policy, so a later read cannot migrate a stale copy back.
    pub fn purge(&self, name: &str) -> Result<bool, VaultError> {
        let removed = self.remove(name)?;
        let legacy = self.migrates()
            && self
                .vault
                .delete(&VaultQuery::new(name, Accessibility::LEGACY))?;
        Ok(removed || legacy)
    }

    /// Whether an entry exists for `name`, looking through the legacy policy.
    pub fn contains(&self, name: &str) -> Result<bool, VaultError> {
        Ok(self.get(name)?.is_some())
    }
}
