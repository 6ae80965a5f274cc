//! AES-256-CBC cipher engine with PBKDF2-HMAC-SHA1 key derivation.
//!
//! The engine is bound to one key and one IV for its whole life. Encrypting
//! the same plaintext twice yields the same ciphertext: the IV is fixed per
//! store, not drawn per message. This keeps previously persisted records
//! readable, at the cost of revealing when two records hold equal values.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{CipherError, CryptStatus, Operation};

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// CBC initialization vector size in bytes.
pub const IV_SIZE: usize = BLOCK_SIZE;

/// Salt size for key derivation in bytes.
pub const SALT_SIZE: usize = 8;

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 10_000;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// A 32-byte key, zeroed on drop.
pub type Key = Zeroizing<[u8; KEY_SIZE]>;

/// Stateless AES-256-CBC/PKCS#7 engine bound to a key and IV, both zeroed
/// on drop.
#[derive(Clone)]
pub struct Aes256Cbc {
    key: Key,
    iv: Zeroizing<[u8; IV_SIZE]>,
}

impl Aes256Cbc {
    /// Build an engine, rejecting a key that is not 32 bytes or an IV that
    /// is not 16 bytes.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
        let iv: [u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| CipherError::InvalidIvLength(iv.len()))?;
        Ok(Self {
            key: Zeroizing::new(key),
            iv: Zeroizing::new(iv),
        })
    }

    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    /// Encrypt `plaintext`, padding it to a whole number of blocks.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let encryptor = Aes256CbcEnc::new_from_slices(self.key.as_slice(), self.iv.as_slice())
            .map_err(|_| CipherError::Crypt {
                operation: Operation::Encrypt,
                status: CryptStatus::ParamError,
            })?;
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    /// Decrypt data produced by [`Aes256Cbc::encrypt`] with the same key and IV.
    ///
    /// Fails with an alignment status when the input is not whole blocks and
    /// with a decode status when the padding does not verify, which is what a
    /// wrong key usually produces.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::Crypt {
                operation: Operation::Decrypt,
                status: CryptStatus::AlignmentError,
            });
        }

        let decryptor = Aes256CbcDec::new_from_slices(self.key.as_slice(), self.iv.as_slice())
            .map_err(|_| CipherError::Crypt {
                operation: Operation::Decrypt,
                status: CryptStatus::ParamError,
            })?;
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CipherError::Crypt {
                operation: Operation::Decrypt,
                status: CryptStatus::DecodeError,
            })
    }
}

impl fmt::Debug for Aes256Cbc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes256Cbc")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from `password` and `salt` with PBKDF2-HMAC-SHA1.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Key, CipherError> {
    derive_key_with_rounds(password, salt, PBKDF2_ROUNDS)
}

fn derive_key_with_rounds(password: &[u8], salt: &[u8], rounds: u32) -> Result<Key, CipherError> {
    if rounds == 0 {
        return Err(CipherError::KeyDerivation {
            status: CryptStatus::ParamError,
        });
    }

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    pbkdf2::pbkdf2::<Hmac<Sha1>>(password, salt, rounds, key.as_mut_slice()).map_err(|_| {
        CipherError::KeyDerivation {
            status: CryptStatus::ParamError,
        }
    })?;
    Ok(key)
}

/// Fresh random IV from the OS generator.
///
/// Panics if the OS generator is unavailable; there is no meaningful
/// recovery from that.
pub fn random_iv() -> [u8; IV_SIZE] {
    random_bytes()
}

/// Fresh random salt from the OS generator. Panics like [`random_iv`].
pub fn random_salt() -> [u8; SALT_SIZE] {
    random_bytes()
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}
