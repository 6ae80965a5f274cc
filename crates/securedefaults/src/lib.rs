//! Encrypted key-value preferences.
//!
//! [`SecureDefaults`] stores each value AES-256-CBC encrypted in a plain
//! key-value store. The key is derived from a password with
//! PBKDF2-HMAC-SHA1 and kept, with the IV, in a secret vault that migrates
//! entries left under the deprecated accessibility policy.
//!
//! ```no_run
//! use securedefaults::{Defaults, MemoryPlainStore, MemoryVault, SecureDefaults, VaultAdapter};
//!
//! let defaults = SecureDefaults::new(MemoryPlainStore::new(), VaultAdapter::new(MemoryVault::new()))
//!     .with_password("correct horse");
//! defaults.set_string("token", "hello");
//! assert_eq!(defaults.string("token").as_deref(), Some("hello"));
//! ```

pub mod cipher;
pub mod codec;
pub mod defaults;
pub mod error;
mod fsutil;
pub mod plain;
pub mod store;
pub mod vault;

pub use codec::{Codec, JsonCodec, Value};
pub use defaults::{Defaults, PlainDefaults};
pub use error::{CipherError, CodecError, PlainStoreError, Result, StoreError, VaultError};
pub use plain::{FilePlainStore, MemoryPlainStore, PlainStore};
pub use store::{ConfiguredDefaults, SecureDefaults};
pub use vault::{FileVault, MemoryVault, SecretVault, VaultAdapter, VaultQuery};

#[cfg(target_os = "macos")]
pub use vault::KeychainVault;
