//! macOS keychain vault over generic-password items.
//!
//! Queries are built from the raw attribute keys the Security framework uses
//! (`acct`, `pdmn`, `agrp`, ...), so the accessibility code of an item is
//! exactly [`Accessibility::code`].

use core_foundation::base::{CFType, CFTypeRef, OSStatus, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::data::{CFData, CFDataRef};
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use security_framework_sys::keychain_item::{SecItemAdd, SecItemCopyMatching, SecItemDelete};
use tracing::debug;
use zeroize::Zeroizing;

use super::{SecretVault, VaultQuery};
use crate::error::VaultError;

const ERR_SEC_SUCCESS: OSStatus = 0;
const ERR_SEC_DUPLICATE_ITEM: OSStatus = -25299;
const ERR_SEC_ITEM_NOT_FOUND: OSStatus = -25300;

/// Vault backed by the login keychain (or the app's data-protection
/// keychain when running sandboxed).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainVault;

impl KeychainVault {
    pub fn new() -> Self {
        Self
    }

    fn attributes(query: &VaultQuery) -> Vec<(CFString, CFType)> {
        let mut pairs = vec![
            (
                CFString::from_static_string("class"),
                CFString::from_static_string("genp").as_CFType(),
            ),
            (
                CFString::from_static_string("acct"),
                CFString::new(&query.name).as_CFType(),
            ),
            (
                CFString::from_static_string("pdmn"),
                CFString::from_static_string(query.accessibility.code()).as_CFType(),
            ),
        ];
        if let Some(group) = &query.group {
            pairs.push((
                CFString::from_static_string("agrp"),
                CFString::new(group).as_CFType(),
            ));
        }
        pairs
    }
}

impl SecretVault for KeychainVault {
    fn insert(&self, query: &VaultQuery, data: &[u8]) -> Result<(), VaultError> {
        let mut pairs = Self::attributes(query);
        pairs.push((
            CFString::from_static_string("v_Data"),
            CFData::from_buffer(data).as_CFType(),
        ));
        let dict = CFDictionary::from_CFType_pairs(&pairs);

        // SAFETY: `dict` is a valid CFDictionary for the duration of the call
        // and a null result pointer is permitted.
        let status = unsafe { SecItemAdd(dict.as_concrete_TypeRef(), std::ptr::null_mut()) };
        debug!(name = %query.name, status, "keychain add");
        match status {
            ERR_SEC_SUCCESS => Ok(()),
            ERR_SEC_DUPLICATE_ITEM => Err(VaultError::Duplicate {
                name: query.name.clone(),
            }),
            other => Err(VaultError::Backend(format!("SecItemAdd status {other}"))),
        }
    }

    fn fetch(&self, query: &VaultQuery) -> Result<Option<Zeroizing<Vec<u8>>>, VaultError> {
        let mut pairs = Self::attributes(query);
        pairs.push((
            CFString::from_static_string("r_Data"),
            CFBoolean::true_value().as_CFType(),
        ));
        pairs.push((
            CFString::from_static_string("m_Limit"),
            CFString::from_static_string("m_LimitOne").as_CFType(),
        ));
        let dict = CFDictionary::from_CFType_pairs(&pairs);

        let mut result: CFTypeRef = std::ptr::null();
        // SAFETY: `result` receives a +1 retained CFData on success, which is
        // released by `wrap_under_create_rule` below.
        let status = unsafe { SecItemCopyMatching(dict.as_concrete_TypeRef(), &mut result) };
        match status {
            ERR_SEC_SUCCESS if !result.is_null() => {
                // SAFETY: with `r_Data` and `m_LimitOne` a successful match
                // returns a single owned CFData, so taking it under the create
                // rule balances the retain.
                let data = unsafe { CFData::wrap_under_create_rule(result as CFDataRef) };
                Ok(Some(Zeroizing::new(data.bytes().to_vec())))
            }
            ERR_SEC_SUCCESS | ERR_SEC_ITEM_NOT_FOUND => Ok(None),
            other => Err(VaultError::Backend(format!(
                "SecItemCopyMatching status {other}"
            ))),
        }
    }

    fn delete(&self, query: &VaultQuery) -> Result<bool, VaultError> {
        let dict = CFDictionary::from_CFType_pairs(&Self::attributes(query));
        // SAFETY: `dict` outlives the call.
        let status = unsafe { SecItemDelete(dict.as_concrete_TypeRef()) };
        debug!(name = %query.name, status, "keychain delete");
        match status {
            ERR_SEC_SUCCESS => Ok(true),
            ERR_SEC_ITEM_NOT_FOUND => Ok(false),
            other => Err(VaultError::Backend(format!("SecItemDelete status {other}"))),
        }
    }
}
