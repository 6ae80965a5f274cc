//! Secret vault collaborators.
//!
//! A [`SecretVault`] holds named binary secrets the way the OS keychain
//! does: an entry is identified by its name and sharing group, and carries an
//! [`Accessibility`] attribute that every lookup must match. Inserting a
//! second entry with the same identity fails even when the accessibility
//! differs, which is what makes a policy change need a migration.
//!
//! [`VaultAdapter`] sits in front of a vault, binds the current policy and
//! group, and moves legacy entries to the current policy.

mod adapter;
mod entries;
mod file;
#[cfg(target_os = "macos")]
mod keychain;
mod memory;

use std::sync::Arc;

use securedefaults_core::Accessibility;
use zeroize::Zeroizing;

use crate::error::VaultError;

pub use adapter::VaultAdapter;
pub use file::FileVault;
#[cfg(target_os = "macos")]
pub use keychain::KeychainVault;
pub use memory::MemoryVault;

/// Selects vault entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultQuery {
    /// Entry name.
    pub name: String,

    /// Accessibility the entry must carry.
    pub accessibility: Accessibility,

    /// Sharing group. `None` matches entries in any group on lookup and
    /// delete, and writes to the default group on insert.
    pub group: Option<String>,
}

impl VaultQuery {
    pub fn new(name: impl Into<String>, accessibility: Accessibility) -> Self {
        Self {
            name: name.into(),
            accessibility,
            group: None,
        }
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }
}

/// Storage for named binary secrets.
pub trait SecretVault: Send + Sync {
    /// Add a new entry. Fails with [`VaultError::Duplicate`] when an entry
    /// with the same name and group exists under any accessibility.
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError>;

    /// Return the data of the first entry matching `query`.
    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError>;

    /// Delete every entry matching `query`. Returns whether anything was
    /// deleted.
    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError>;
}

impl<T: SecretVault + ?Sized> SecretVault for Arc<T> {
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        (**self).insert(query, data)
    }

    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        (**self).fetch(query)
    }

    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError> {
        (**self).delete(query)
    }
}

impl<T: SecretVault + ?Sized> SecretVault for Box<T> {
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        (**self).insert(query, data)
    }

    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        (**self).fetch(query)
    }

    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError> {
        (**self).delete(query)
    }
}
