//! The encrypted preferences store.
//!
//! [`SecureDefaults`] wraps a [`PlainStore`] and encrypts every value written
//! through it with AES-256-CBC. The key is derived from a password the first
//! time it is needed and kept, together with a random IV, in a
//! [`SecretVault`] so later runs do not need the password again.

use std::fmt;

use once_cell::unsync::OnceCell;
use securedefaults_core::config::VaultBackend;
use securedefaults_core::{Config, SecretString};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::cipher::{self, Aes256Cbc, Key, IV_SIZE};
use crate::codec::{Codec, JsonCodec, Value};
use crate::defaults::Defaults;
use crate::error::{PlainStoreError, Result, StoreError, VaultError};
use crate::plain::{FilePlainStore, PlainStore};
use crate::vault::{FileVault, MemoryVault, SecretVault, VaultAdapter};

/// Base vault entry name for the derived key.
pub const KEY_ENTRY: &str = "SecureDefaults.AESKey";

/// Base vault entry name for the IV.
pub const IV_ENTRY: &str = "SecureDefaults.AESIV";

/// Store assembled from a [`Config`].
pub type ConfiguredDefaults = SecureDefaults<FilePlainStore, Box<dyn SecretVault>>;

/// Encrypted [`Defaults`] over a plain store, keyed through a vault.
///
/// Key material moves through two states. It is unset until first needed,
/// then loaded from the vault or derived from the password, persisted, and
/// cached for the life of the instance. [`SecureDefaults::set_password`]
/// returns it to unset. A failed derivation leaves it unset.
///
/// Every value is encrypted with the same IV, so equal values produce equal
/// ciphertexts. Records written by earlier runs depend on this.
///
/// An instance is meant for one owner; it is not `Sync`.
pub struct SecureDefaults<P, V, C = JsonCodec> {
    plain: P,
    vault: VaultAdapter<V>,
    codec: C,
    suite: Option<String>,
    password: Option<SecretString>,
    material: OnceCell<Aes256Cbc>,
}

impl<P: PlainStore, V: SecretVault> SecureDefaults<P, V> {
    pub fn new(plain: P, vault: VaultAdapter<V>) -> Self {
        Self {
            plain,
            vault,
            codec: JsonCodec,
            suite: None,
            password: None,
            material: OnceCell::new(),
        }
    }
}

impl<P: PlainStore, V: SecretVault, C: Codec> SecureDefaults<P, V, C> {
    /// Scope vault entries to `suite`.
    pub fn with_suite(mut self, suite: Option<String>) -> Self {
        self.suite = suite;
        self.material = OnceCell::new();
        self
    }

    /// Password used if key material has to be derived.
    ///
    /// Unlike [`SecureDefaults::set_password`] this leaves existing key
    /// material alone.
    pub fn with_password(mut self, password: impl Into<SecretString>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_codec<C2: Codec>(self, codec: C2) -> SecureDefaults<P, V, C2> {
        SecureDefaults {
            plain: self.plain,
            vault: self.vault,
            codec,
            suite: self.suite,
            password: self.password,
            material: self.material,
        }
    }

    pub fn suite(&self) -> Option<&str> {
        self.suite.as_deref()
    }

    pub fn vault(&self) -> &VaultAdapter<V> {
        &self.vault
    }

    pub fn plain_store(&self) -> &P {
        &self.plain
    }

    /// Vault entry name holding the key for this suite.
    pub fn key_entry_name(&self) -> String {
        self.entry_name(KEY_ENTRY)
    }

    /// Vault entry name holding the IV for this suite.
    pub fn iv_entry_name(&self) -> String {
        self.entry_name(IV_ENTRY)
    }

    fn entry_name(&self, base: &str) -> String {
        match &self.suite {
            Some(suite) => format!("{base}-{suite}"),
            None => base.to_string(),
        }
    }

    /// Replace the password and drop the current key material from the
    /// vault and the cache. Nothing is derived until the next access.
    ///
    /// The key goes first. If the vault refuses to remove it, nothing has
    /// changed and the password is left as it was. A lone IV left behind by a
    /// failed second step is ignored and replaced on the next derivation.
    pub fn set_password(&mut self, password: impl Into<SecretString>) -> Result<()> {
        self.material = OnceCell::new();
        self.vault.purge(&self.key_entry_name())?;
        self.vault.purge(&self.iv_entry_name())?;
        self.password = Some(password.into());
        debug!(suite = ?self.suite, "password changed, key material cleared");
        Ok(())
    }

    /// Load the key and IV from the vault, or derive and persist a new pair.
    pub fn ensure_key_material(&self) -> Result<()> {
        self.material().map(|_| ())
    }

    fn material(&self) -> Result<&Aes256Cbc> {
        self.material.get_or_try_init(|| self.load_or_derive())
    }

    fn load_or_derive(&self) -> Result<Aes256Cbc> {
        let key_name = self.key_entry_name();
        let iv_name = self.iv_entry_name();

        let stored_key = self.vault.get(&key_name)?;
        let stored_iv = self.vault.get(&iv_name)?;
        match (stored_key, stored_iv) {
            (Some(key), Some(iv)) => {
                debug!(suite = ?self.suite, "loaded key material from vault");
                return Ok(Aes256Cbc::new(&key, &iv)?);
            }
            (None, None) => {}
            _ => warn!(suite = ?self.suite, "incomplete key material in vault, deriving a new pair"),
        }

        let password = self.password.as_ref().ok_or_else(|| StoreError::MissingPassword {
            suite: self.suite.clone().unwrap_or_default(),
        })?;
        let key = cipher::derive_key(password.expose_bytes(), &cipher::random_salt())?;
        let engine = Aes256Cbc::new(key.as_slice(), &cipher::random_iv())?;
        self.persist_pair(&engine)?;
        debug!(suite = ?self.suite, "derived new key material");
        Ok(engine)
    }

    /// Write key and IV to the vault. If the IV cannot be written the key is
    /// removed again so neither is left without the other.
    fn persist_pair(&self, engine: &Aes256Cbc) -> std::result::Result<(), VaultError> {
        let key_name = self.key_entry_name();
        self.vault.set(&key_name, Some(engine.key().as_slice()))?;
        if let Err(err) = self.vault.set(&self.iv_entry_name(), Some(engine.iv().as_slice())) {
            if let Err(rollback) = self.vault.remove(&key_name) {
                warn!(error = %rollback, "failed to roll back key after IV write failure");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Use a caller-made key and IV instead of deriving them from the
    /// password. Both are persisted to the vault and cached.
    pub fn assign_key_material(&mut self, key: &[u8], iv: &[u8]) -> Result<()> {
        let engine = Aes256Cbc::new(key, iv)?;
        self.material = OnceCell::new();
        self.persist_pair(&engine)?;
        self.material = OnceCell::from(engine);
        debug!(suite = ?self.suite, "assigned key material");
        Ok(())
    }

    /// The AES key, loading or deriving it first if needed.
    pub fn key(&self) -> Result<Key> {
        Ok(Key::new(*self.material()?.key()))
    }

    /// The IV, loading or generating it first if needed.
    pub fn iv(&self) -> Result<[u8; IV_SIZE]> {
        Ok(*self.material()?.iv())
    }

    /// Short SHA-256 fingerprint of the key, safe to display.
    pub fn key_fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.material()?.key());
        Ok(hex::encode(&digest[..8]))
    }

    /// Whether a complete key and IV pair exists for this suite, without
    /// deriving one. A key stored without its IV does not count.
    pub fn is_key_materialized(&self) -> bool {
        if self.material.get().is_some() {
            return true;
        }
        let stored = match self.vault.contains(&self.key_entry_name()) {
            Ok(true) => self.vault.contains(&self.iv_entry_name()),
            other => other,
        };
        match stored {
            Ok(found) => found,
            Err(err) => {
                warn!(error = %err, "failed to look up key material");
                false
            }
        }
    }

    /// Encode, encrypt and store `value`; `None` clears the entry without
    /// touching key material.
    pub fn try_set(&self, name: &str, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            self.plain.write(name, None);
            return Ok(());
        };
        let encoded = Zeroizing::new(self.codec.encode(value)?);
        let ciphertext = self.material()?.encrypt(&encoded)?;
        self.plain.write(name, Some(ciphertext.as_slice()));
        Ok(())
    }

    /// Read, decrypt and decode the value under `name`.
    pub fn try_object(&self, name: &str) -> Result<Option<Value>> {
        let Some(ciphertext) = self.plain.read(name) else {
            return Ok(None);
        };
        let plaintext = self.material()?.decrypt(&ciphertext)?;
        Ok(Some(self.codec.decode(&plaintext)?))
    }

    /// Stored bytes under `name`, not decrypted.
    pub fn raw_get(&self, name: &str) -> Option<Vec<u8>> {
        self.plain.read(name)
    }

    /// Store bytes under `name` as they are, bypassing encryption.
    pub fn raw_set(&self, name: &str, value: Option<&[u8]>) {
        self.plain.write(name, value);
    }
}

impl ConfiguredDefaults {
    /// Open the store described by `config`: a file plain store and the
    /// configured vault backend, policy, group and suite.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let plain = FilePlainStore::open(config.storage_path()?)?;
        let vault: Box<dyn SecretVault> = match config.vault.backend {
            VaultBackend::File => Box::new(FileVault::open(config.vault_path()?)?),
            VaultBackend::Memory => Box::new(MemoryVault::new()),
            #[cfg(target_os = "macos")]
            VaultBackend::Keychain => Box::new(crate::vault::KeychainVault::new()),
            #[cfg(not(target_os = "macos"))]
            VaultBackend::Keychain => {
                return Err(VaultError::Backend("keychain vault requires macOS".to_string()).into())
            }
        };
        let vault = VaultAdapter::new(vault)
            .with_accessibility(config.keychain.accessibility)
            .with_access_group(config.keychain.access_group.clone());

        Ok(Self::new(plain, vault).with_suite(config.suite.clone()))
    }
}

impl<P: PlainStore, V: SecretVault, C: Codec> Defaults for SecureDefaults<P, V, C> {
    fn object(&self, name: &str) -> Option<Value> {
        match self.try_object(name) {
            Ok(value) => value,
            Err(err) => {
                warn!(name, error = %err, "unreadable encrypted value");
                None
            }
        }
    }

    fn set(&self, name: &str, value: Option<Value>) {
        if let Err(err) = self.try_set(name, value.as_ref()) {
            warn!(name, error = %err, "dropping encrypted write");
        }
    }

    fn persist(&self) -> std::result::Result<(), PlainStoreError> {
        self.plain.persist()
    }
}

impl<P, V, C> fmt::Debug for SecureDefaults<P, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureDefaults")
            .field("suite", &self.suite)
            .field("password", &self.password)
            .field("material", &self.material.get())
            .finish_non_exhaustive()
    }
}
