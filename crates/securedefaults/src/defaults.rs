//! Typed preferences surface shared by the plain and encrypted stores.
//!
//! Readers never fail: an absent value, a value of another type and an
//! undecodable record all come back as the reader's default. Writers never
//! fail either; problems are logged and the write is dropped.

use std::collections::BTreeMap;

use tracing::warn;
use url::Url;

use crate::codec::{Codec, JsonCodec, Value};
use crate::error::PlainStoreError;
use crate::plain::PlainStore;

/// Preferences-style get/set surface.
pub trait Defaults {
    /// Stored value for `name`, if any can be read.
    fn object(&self, name: &str) -> Option<Value>;

    /// Store `value` under `name`; `None` clears it.
    fn set(&self, name: &str, value: Option<Value>);

    /// Flush pending writes.
    fn persist(&self) -> Result<(), PlainStoreError>;

    fn remove(&self, name: &str) {
        self.set(name, None);
    }

    fn string(&self, name: &str) -> Option<String> {
        match self.object(name)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn data(&self, name: &str) -> Option<Vec<u8>> {
        match self.object(name)? {
            Value::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn url(&self, name: &str) -> Option<Url> {
        match self.object(name)? {
            Value::Url(url) => Some(url),
            _ => None,
        }
    }

    fn array(&self, name: &str) -> Option<Vec<Value>> {
        match self.object(name)? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    fn dictionary(&self, name: &str) -> Option<BTreeMap<String, Value>> {
        match self.object(name)? {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Array of strings; `None` if any element is not a string.
    fn string_array(&self, name: &str) -> Option<Vec<String>> {
        self.array(name)?
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// `0` when absent or not an integer.
    fn integer(&self, name: &str) -> i64 {
        match self.object(name) {
            Some(Value::Integer(i)) => i,
            _ => 0,
        }
    }

    /// `NaN` when absent or not a float.
    fn float(&self, name: &str) -> f32 {
        match self.object(name) {
            Some(Value::Float(f)) => f,
            _ => f32::NAN,
        }
    }

    /// `NaN` when absent or not a double.
    fn double(&self, name: &str) -> f64 {
        match self.object(name) {
            Some(Value::Double(d)) => d,
            _ => f64::NAN,
        }
    }

    /// `false` when absent or not a bool.
    fn bool(&self, name: &str) -> bool {
        matches!(self.object(name), Some(Value::Bool(true)))
    }

    fn set_string(&self, name: &str, value: &str) {
        self.set(name, Some(Value::from(value)));
    }

    fn set_integer(&self, name: &str, value: i64) {
        self.set(name, Some(Value::Integer(value)));
    }

    fn set_float(&self, name: &str, value: f32) {
        self.set(name, Some(Value::Float(value)));
    }

    fn set_double(&self, name: &str, value: f64) {
        self.set(name, Some(Value::Double(value)));
    }

    fn set_bool(&self, name: &str, value: bool) {
        self.set(name, Some(Value::Bool(value)));
    }

    /// `None` clears the entry.
    fn set_url(&self, name: &str, value: Option<&Url>) {
        self.set(name, value.cloned().map(Value::Url));
    }

    /// `None` clears the entry.
    fn set_data(&self, name: &str, value: Option<&[u8]>) {
        self.set(name, value.map(|bytes| Value::Data(bytes.to_vec())));
    }
}

/// Unencrypted [`Defaults`] over a plain store.
#[derive(Debug)]
pub struct PlainDefaults<P, C = JsonCodec> {
    store: P,
    codec: C,
}

impl<P: PlainStore> PlainDefaults<P> {
    pub fn new(store: P) -> Self {
        Self {
            store,
            codec: JsonCodec,
        }
    }
}

impl<P: PlainStore, C: Codec> PlainDefaults<P, C> {
    pub fn with_codec(store: P, codec: C) -> Self {
        Self { store, codec }
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}

impl<P: PlainStore, C: Codec> Defaults for PlainDefaults<P, C> {
    fn object(&self, name: &str) -> Option<Value> {
        let bytes = self.store.read(name)?;
        match self.codec.decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(name, error = %e, "undecodable plain record");
                None
            }
        }
    }

    fn set(&self, name: &str, value: Option<Value>) {
        let Some(value) = value else {
            self.store.write(name, None);
            return;
        };
        match self.codec.encode(&value) {
            Ok(bytes) => self.store.write(name, Some(bytes.as_slice())),
            Err(e) => warn!(name, kind = value.kind(), error = %e, "dropping unencodable value"),
        }
    }

    fn persist(&self) -> Result<(), PlainStoreError> {
        self.store.persist()
    }
}
