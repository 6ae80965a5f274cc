//! Preference values and the codec that turns them into bytes.
//!
//! A value is encoded before encryption and decoded after decryption; the
//! cipher engine never sees anything but bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::error::CodecError;

/// A preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Data(#[serde(with = "base64_bytes")] Vec<u8>),
    Url(Url),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    /// Short type name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::Data(_) => "data",
            Self::Url(_) => "url",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
        }
    }

    /// First non-finite float found anywhere in the value.
    fn find_non_finite(&self) -> Option<String> {
        match self {
            Self::Float(f) if !f.is_finite() => Some(f.to_string()),
            Self::Double(d) if !d.is_finite() => Some(d.to_string()),
            Self::Array(items) => items.iter().find_map(Value::find_non_finite),
            Self::Dictionary(map) => map.values().find_map(Value::find_non_finite),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Data(bytes)
    }
}

impl From<Url> for Value {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Dictionary(map)
    }
}

/// Turns values into bytes and back.
pub trait Codec: Send + Sync {
    /// Encode a value. Fails when the value cannot be represented.
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes produced by [`Codec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// Tagged JSON codec; `Data` travels as base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        // JSON has no NaN or infinity; serde_json would quietly write null.
        if let Some(bad) = value.find_non_finite() {
            return Err(CodecError::Unsupported(format!(
                "non-finite number {bad} cannot be encoded"
            )));
        }
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Serde helpers writing byte buffers as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_survives_the_codec() {
        let mut dict = BTreeMap::new();
        dict.insert("nested".to_string(), Value::from(vec![Value::from(1), Value::from("two")]));

        let values = vec![
            Value::from("Just a test message"),
            Value::from(10),
            Value::from(10.0f32),
            Value::from(0.1f64),
            Value::from(true),
            Value::from(vec![0u8, 255, 7]),
            Value::from(Url::parse("https://example.com/path?q=1").unwrap()),
            Value::from(dict),
        ];

        for value in values {
            let bytes = JsonCodec.encode(&value).unwrap();
            assert_eq!(JsonCodec.decode(&bytes).unwrap(), value, "{}", value.kind());
        }
    }

    #[test]
    fn test_data_is_base64_on_the_wire() {
        let bytes = JsonCodec.encode(&Value::Data(b"hi".to_vec())).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"type":"data","value":"aGk="}"#
        );
    }

    #[test]
    fn test_non_finite_numbers_are_unsupported() {
        assert!(matches!(
            JsonCodec.encode(&Value::Double(f64::NAN)),
            Err(CodecError::Unsupported(_))
        ));
        let nested = Value::Array(vec![Value::from(1), Value::Float(f32::INFINITY)]);
        assert!(matches!(
            JsonCodec.encode(&nested),
            Err(CodecError::Unsupported(_))
        ));
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        assert!(matches!(
            JsonCodec.decode(b"\x00\x01not json"),
            Err(CodecError::Malformed(_))
        ));
        assert!(JsonCodec.decode(br#"{"type":"mystery","value":1}"#).is_err());
    }

    #[test]
    fn test_integer_and_float_stay_distinct() {
        let bytes = JsonCodec.encode(&Value::Integer(10)).unwrap();
        assert_eq!(JsonCodec.decode(&bytes).unwrap(), Value::Integer(10));
        let bytes = JsonCodec.encode(&Value::Float(10.0)).unwrap();
        assert_eq!(JsonCodec.decode(&bytes).unwrap(), Value::Float(10.0));
    }
}
