//! Trace and span identifier value objects.
//!
//! OTLP carries trace IDs as 16 raw bytes and span IDs as 8 raw bytes;
//! internally both are held as lowercase hex strings, the form in which
//! they are correlated and displayed downstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing an identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    /// The trace ID string is not 32 hex characters.
    #[error("trace ID must be a 32-character hex string, got {0:?}")]
    InvalidTraceId(String),

    /// The span ID string is not 16 hex characters.
    #[error("span ID must be a 16-character hex string, got {0:?}")]
    InvalidSpanId(String),

    /// The raw trace ID is not exactly 16 bytes.
    #[error("trace ID must be exactly 16 bytes, got {0}")]
    InvalidTraceIdLength(usize),

    /// The raw span ID is not exactly 8 bytes.
    #[error("span ID must be exactly 8 bytes, got {0}")]
    InvalidSpanIdLength(usize),
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Value object representing a trace identifier.
///
/// Invariant: the value is exactly 32 hex characters, fixed at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId {
    value: String,
}

impl TraceId {
    /// Creates a trace ID from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly 32 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if !is_hex(&value, 32) {
            return Err(IdError::InvalidTraceId(value));
        }
        Ok(Self { value })
    }

    /// Creates a trace ID from the 16 raw bytes of the wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        if bytes.len() != 16 {
            return Err(IdError::InvalidTraceIdLength(bytes.len()));
        }
        Ok(Self {
            value: hex::encode(bytes),
        })
    }

    /// Returns the hex string value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Value object representing a span identifier.
///
/// Also used for `parent_span_id`. Invariant: exactly 16 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId {
    value: String,
}

impl SpanId {
    /// Creates a span ID from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly 16 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if !is_hex(&value, 16) {
            return Err(IdError::InvalidSpanId(value));
        }
        Ok(Self { value })
    }

    /// Creates a span ID from the 8 raw bytes of the wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 8 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        if bytes.len() != 8 {
            return Err(IdError::InvalidSpanIdLength(bytes.len()));
        }
        Ok(Self {
            value: hex::encode(bytes),
        })
    }

    /// Returns the hex string value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
