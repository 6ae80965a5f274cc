//! Plain (unencrypted) key-value stores the encrypted store writes through.
//!
//! Reads treat a missing key and an explicitly cleared key alike. Writes are
//! visible immediately; [`PlainStore::persist`] makes them durable.

mod file;
mod memory;

use std::sync::Arc;

use crate::error::PlainStoreError;

pub use file::FilePlainStore;
pub use memory::MemoryPlainStore;

/// Byte-level preferences storage.
pub trait PlainStore: Send + Sync {
    /// Bytes stored under `key`.
    fn read(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`; `None` clears the key.
    fn write(&self, key: &str, value: Option<&[u8]>);

    /// Flush pending writes to the durable medium.
    fn persist(&self) -> Result<(), PlainStoreError>;
}

impl<T: PlainStore + ?Sized> PlainStore for Arc<T> {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: Option<&[u8]>) {
        (**self).write(key, value)
    }

    fn persist(&self) -> Result<(), PlainStoreError> {
        (**self).persist()
    }
}

impl<T: PlainStore + ?Sized> PlainStore for Box<T> {
    fn read(&self, key: &str) -> Option<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: Option<&[u8]>) {
        (**self).write(key, value)
    }

    fn persist(&self) -> Result<(), PlainStoreError> {
        (**self).persist()
    }
}
