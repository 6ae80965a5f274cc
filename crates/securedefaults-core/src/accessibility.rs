//! Vault accessibility policies.
//!
//! Each vault entry carries the policy it was written with, and lookups must
//! name the policy they expect. The short codes returned by
//! [`Accessibility::code`] are the values the Security framework stores in the
//! `pdmn` attribute of a keychain item.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a vault-held secret may be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Readable only while the device is unlocked.
    WhenUnlocked,

    /// Readable after the first unlock following a restart.
    #[default]
    AfterFirstUnlock,

    /// Readable while unlocked, only on a device with a passcode set.
    WhenPasscodeSetThisDeviceOnly,

    /// Like `WhenUnlocked`, never migrated to another device.
    WhenUnlockedThisDeviceOnly,

    /// Like `AfterFirstUnlock`, never migrated to another device.
    AfterFirstUnlockThisDeviceOnly,

    /// Always readable. Deprecated by the platform.
    Always,

    /// Always readable, never migrated. Deprecated by the platform.
    AlwaysThisDeviceOnly,
}

impl Accessibility {
    /// The policy legacy secrets were written with. Secrets found under it are
    /// moved to the current policy on first access.
    pub const LEGACY: Accessibility = Accessibility::Always;

    /// All known policies.
    pub const ALL: [Accessibility; 7] = [
        Accessibility::WhenUnlocked,
        Accessibility::AfterFirstUnlock,
        Accessibility::WhenPasscodeSetThisDeviceOnly,
        Accessibility::WhenUnlockedThisDeviceOnly,
        Accessibility::AfterFirstUnlockThisDeviceOnly,
        Accessibility::Always,
        Accessibility::AlwaysThisDeviceOnly,
    ];

    /// Attribute code stored with the entry.
    pub fn code(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "ak",
            Self::AfterFirstUnlock => "ck",
            Self::WhenPasscodeSetThisDeviceOnly => "akpu",
            Self::WhenUnlockedThisDeviceOnly => "aku",
            Self::AfterFirstUnlockThisDeviceOnly => "cku",
            Self::Always => "dk",
            Self::AlwaysThisDeviceOnly => "dku",
        }
    }

    /// Configuration name (snake_case).
    pub fn name(self) -> &'static str {
        match self {
            Self::WhenUnlocked => "when_unlocked",
            Self::AfterFirstUnlock => "after_first_unlock",
            Self::WhenPasscodeSetThisDeviceOnly => "when_passcode_set_this_device_only",
            Self::WhenUnlockedThisDeviceOnly => "when_unlocked_this_device_only",
            Self::AfterFirstUnlockThisDeviceOnly => "after_first_unlock_this_device_only",
            Self::Always => "always",
            Self::AlwaysThisDeviceOnly => "always_this_device_only",
        }
    }

    /// Whether the platform has deprecated this policy.
    pub fn is_deprecated(self) -> bool {
        matches!(self, Self::Always | Self::AlwaysThisDeviceOnly)
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Accessibility {
    type Err = ConfigError;

    /// Accepts either the configuration name or the attribute code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s || a.code() == s)
            .ok_or_else(|| ConfigError::UnknownAccessibility(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_after_first_unlock() {
        assert_eq!(Accessibility::default(), Accessibility::AfterFirstUnlock);
        assert!(!Accessibility::default().is_deprecated());
    }

    #[test]
    fn test_legacy_is_always() {
        assert_eq!(Accessibility::LEGACY.code(), "dk");
        assert!(Accessibility::LEGACY.is_deprecated());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = Accessibility::ALL.iter().map(|a| a.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Accessibility::ALL.len());
    }

    #[test]
    fn test_parse_name_and_code() {
        assert_eq!(
            "when_unlocked".parse::<Accessibility>().unwrap(),
            Accessibility::WhenUnlocked
        );
        assert_eq!("cku".parse::<Accessibility>().unwrap(), Accessibility::AfterFirstUnlockThisDeviceOnly);
        assert!(matches!(
            "sometimes".parse::<Accessibility>(),
            Err(ConfigError::UnknownAccessibility(_))
        ));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Accessibility::WhenUnlockedThisDeviceOnly).unwrap();
        assert_eq!(json, "\"when_unlocked_this_device_only\"");
        let parsed: Accessibility = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(parsed, Accessibility::Always);
    }

    #[test]
    fn test_display_matches_name() {
        for a in Accessibility::ALL {
            assert_eq!(a.to_string(), a.name());
        }
    }
}
