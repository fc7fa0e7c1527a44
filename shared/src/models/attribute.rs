//! Attribute values attached to spans and span events.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// A single attribute value.
///
/// OTLP attributes are a tagged union over scalars, byte strings, and
/// recursively nested arrays and key-value lists; this sum type is the
/// native representation of that union. `Null` marks a wire value with
/// no field set, which is a legitimate "no value" and not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Explicit absence of a value.
    Null,
    /// A UTF-8 string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer value.
    Int(i64),
    /// A double-precision floating point value.
    Double(f64),
    /// An opaque byte string, serialized as base64.
    Bytes(#[serde(serialize_with = "serialize_base64")] Vec<u8>),
    /// An ordered sequence of values.
    Array(Vec<AttributeValue>),
    /// A nested string-keyed map of values.
    KvList(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns true if this is the explicit "no value" marker.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

fn serialize_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}
