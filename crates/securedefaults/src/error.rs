//! Error types for the encrypted store and its collaborators.

use securedefaults_core::ConfigError;
use std::fmt;
use thiserror::Error;

/// Cipher direction, reported with crypt failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => f.write_str("encrypt"),
            Self::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Status reported by a failed cipher primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptStatus {
    /// Parameters rejected by the primitive.
    ParamError,
    /// Input length is not a multiple of the block size.
    AlignmentError,
    /// Padding did not verify after decryption.
    DecodeError,
}

impl CryptStatus {
    /// Numeric code, stable for diagnostics.
    pub fn code(self) -> i32 {
        match self {
            Self::ParamError => -4300,
            Self::AlignmentError => -4303,
            Self::DecodeError => -4304,
        }
    }
}

impl fmt::Display for CryptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ParamError => "parameter error",
            Self::AlignmentError => "alignment error",
            Self::DecodeError => "decode error",
        };
        write!(f, "{name} ({})", self.code())
    }
}

/// Errors from the cipher engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Invalid IV length: expected 16 bytes, got {0}")]
    InvalidIvLength(usize),

    #[error("Key derivation failed: {status}")]
    KeyDerivation { status: CryptStatus },

    #[error("Cipher {operation} failed: {status}")]
    Crypt {
        operation: Operation,
        status: CryptStatus,
    },
}

/// Errors from a secret vault or the migrating adapter in front of it.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault write failed for '{name}': {reason}")]
    Write { name: String, reason: String },

    #[error("Vault read failed for '{name}': {reason}")]
    Read { name: String, reason: String },

    #[error("Vault entry already exists: {name}")]
    Duplicate { name: String },

    #[error("Vault entry not found: {name}")]
    NotFound { name: String },

    #[error("Vault backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from a plain (unencrypted) store.
#[derive(Debug, Error)]
pub enum PlainStoreError {
    #[error("Corrupt record '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the value codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    #[error("Malformed encoding: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors surfaced by the strict store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No password set for suite '{suite}'; cannot derive a key")]
    MissingPassword { suite: String },

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    PlainStore(#[from] PlainStoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
