//! In-memory entry table with keychain matching rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use securedefaults_core::Accessibility;

use super::VaultQuery;
use crate::codec::base64_bytes;
use crate::error::VaultError;

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredEntry {
    name: String,
    #[zeroize(skip)]
    accessibility: Accessibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(with = "base64_bytes")]
    data: Vec<u8>,
}

impl StoredEntry {
    fn matches(&self, query: &VaultQuery) -> bool {
        self.name == query.name
            && self.accessibility == query.accessibility
            && query.group.as_ref().map_or(true, |g| self.group.as_ref() == Some(g))
    }

    fn same_identity(&self, query: &VaultQuery) -> bool {
        self.name == query.name && self.group == query.group
    }
}

impl fmt::Debug for StoredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredEntry")
            .field("name", &self.name)
            .field("accessibility", &self.accessibility)
            .field("group", &self.group)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Entry table shared by the memory and file vaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct VaultEntries {
    entries: Vec<StoredEntry>,
}

impl VaultEntries {
    pub(crate) fn insert(&mut self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        if self.entries.iter().any(|e| e.same_identity(query)) {
            return Err(VaultError::Duplicate {
                name: query.name.clone(),
            });
        }
        self.entries.push(StoredEntry {
            name: query.name.clone(),
            accessibility: query.accessibility,
            group: query.group.clone(),
            data: data.to_vec(),
        });
        Ok(())
    }

    pub(crate) fn fetch(&self, query: &VaultQuery) -> Option<Zeroizing<Vec<u8>>> {
        self.entries
            .iter()
            .find(|e| e.matches(query))
            .map(|e| Zeroizing::new(e.data.clone()))
    }

    pub(crate) fn delete(&mut self, query: &VaultQuery) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.matches(query));
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: &str, accessibility: Accessibility, group: Option<&str>) -> VaultQuery {
        VaultQuery::new(name, accessibility).with_group(group.map(str::to_string))
    }

    #[test]
    fn test_lookup_requires_matching_accessibility() {
        let mut entries = VaultEntries::default();
        entries
            .insert(&query("key", Accessibility::Always, None), b"secret")
            .unwrap();

        assert!(entries
            .fetch(&query("key", Accessibility::AfterFirstUnlock, None))
            .is_none());
        assert_eq!(
            entries
                .fetch(&query("key", Accessibility::Always, None))
                .unwrap()
                .as_slice(),
            b"secret"
        );
    }

    #[test]
    fn test_identity_ignores_accessibility() {
        let mut entries = VaultEntries::default();
        entries
            .insert(&query("key", Accessibility::Always, None), b"old")
            .unwrap();

        let err = entries
            .insert(&query("key", Accessibility::AfterFirstUnlock, None), b"new")
            .unwrap_err();
        assert!(matches!(err, VaultError::Duplicate { .. }));

        // A different group is a different identity.
        entries
            .insert(&query("key", Accessibility::AfterFirstUnlock, Some("team")), b"new")
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_groupless_query_matches_any_group() {
        let mut entries = VaultEntries::default();
        let a = Accessibility::AfterFirstUnlock;
        entries.insert(&query("key", a, Some("team")), b"v").unwrap();

        assert!(entries.fetch(&query("key", a, None)).is_some());
        assert!(entries.fetch(&query("key", a, Some("other"))).is_none());
        assert!(entries.delete(&query("key", a, None)));
        assert_eq!(entries.len(), 0);
    }

    #[test]
    fn test_debug_redacts_data() {
        let mut entries = VaultEntries::default();
        entries
            .insert(&query("key", Accessibility::WhenUnlocked, None), b"hunter2")
            .unwrap();
        let debug = format!("{:?}", entries);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("104, 117"));
    }
}
