//! Domain model for a single trace span.

use crate::models::attribute::AttributeValue;
use crate::models::ids::{SpanId, TraceId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use validator::Validate;

/// Errors raised when constructing or validating a [`TraceSpan`].
#[derive(Error, Debug)]
pub enum SpanValidationError {
    /// The span name was empty.
    #[error("span name must not be empty")]
    EmptyName,
    /// The end timestamp preceded the start timestamp.
    #[error("span end time {end} precedes start time {start}")]
    InvalidTimeRange {
        /// Start timestamp in nanoseconds since the Unix epoch.
        start: u64,
        /// End timestamp in nanoseconds since the Unix epoch.
        end: u64,
    },
    /// Field-level validation failed.
    #[error("validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Status code of a finished span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    /// The span completed without an explicit status.
    #[default]
    Unset,
    /// The span completed successfully.
    Ok,
    /// The span completed with an error.
    Error,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The status of a span, combining a code with an optional message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SpanStatus {
    /// The status code.
    pub code: StatusCode,
    /// Human-readable detail, typically only present for errors.
    pub message: Option<String>,
}

impl SpanStatus {
    /// Creates a status with the given code and no message.
    #[must_use]
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Creates an error status with a message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::Error,
            message: Some(message.into()),
        }
    }
}

/// The role a span plays in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// An internal operation within an application.
    #[default]
    Internal,
    /// Handling of a synchronous inbound request.
    Server,
    /// A synchronous outbound request.
    Client,
    /// Creation of a message for asynchronous processing.
    Producer,
    /// Processing of a message produced elsewhere.
    Consumer,
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// A timestamped event recorded during a span's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanEvent {
    /// Name of the event.
    pub name: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Attributes attached to the event.
    pub attributes: HashMap<String, AttributeValue>,
}

impl SpanEvent {
    /// Creates an event with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            timestamp,
            attributes: HashMap::new(),
        }
    }
}

/// A single completed span within a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct TraceSpan {
    /// Identifier of the trace this span belongs to.
    pub trace_id: TraceId,
    /// Identifier of this span, unique within the trace.
    pub span_id: SpanId,
    /// Identifier of the parent span, absent for root spans.
    pub parent_span_id: Option<SpanId>,
    /// Operation name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Role of this span in the trace.
    pub kind: SpanKind,
    /// Start time in nanoseconds since the Unix epoch.
    pub start_time_unix_nano: u64,
    /// End time in nanoseconds since the Unix epoch.
    pub end_time_unix_nano: u64,
    /// Attributes attached to the span.
    pub attributes: HashMap<String, AttributeValue>,
    /// Events recorded during the span.
    pub events: Vec<SpanEvent>,
    /// Final status of the span.
    pub status: SpanStatus,
}

impl TraceSpan {
    /// Creates a span with the required fields.
    ///
    /// Fails when the name is empty or the end time precedes the
    /// start time.
    ///
    /// # Errors
    ///
    /// Returns [`SpanValidationError`] when a field is invalid.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        name: impl Into<String>,
        start_time_unix_nano: u64,
        end_time_unix_nano: u64,
    ) -> Result<Self, SpanValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SpanValidationError::EmptyName);
        }
        if end_time_unix_nano < start_time_unix_nano {
            return Err(SpanValidationError::InvalidTimeRange {
                start: start_time_unix_nano,
                end: end_time_unix_nano,
            });
        }
        Ok(Self {
            trace_id,
            span_id,
            parent_span_id: None,
            name,
            kind: SpanKind::default(),
            start_time_unix_nano,
            end_time_unix_nano,
            attributes: HashMap::new(),
            events: Vec::new(),
            status: SpanStatus::default(),
        })
    }

    /// Sets the parent span identifier.
    #[must_use]
    pub fn with_parent(mut self, parent_span_id: SpanId) -> Self {
        self.parent_span_id = Some(parent_span_id);
        self
    }

    /// Sets the span kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the span status.
    #[must_use]
    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status = status;
        self
    }

    /// Replaces the span attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: HashMap<String, AttributeValue>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds a single attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Replaces the span events.
    #[must_use]
    pub fn with_events(mut self, events: Vec<SpanEvent>) -> Self {
        self.events = events;
        self
    }

    /// Returns true for spans with no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Duration of the span in nanoseconds.
    #[must_use]
    pub fn duration_nanos(&self) -> u64 {
        self.end_time_unix_nano - self.start_time_unix_nano
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (TraceId, SpanId) {
        (
            TraceId::new("0123456789abcdef0123456789abcdef").unwrap(),
            SpanId::new("0123456789abcdef").unwrap(),
        )
    }

    #[test]
    fn test_new_span() {
        let (trace_id, span_id) = ids();
        let span = TraceSpan::new(trace_id, span_id, "handle-request", 100, 200).unwrap();
        assert_eq!(span.name, "handle-request");
        assert_eq!(span.kind, SpanKind::Internal);
        assert_eq!(span.status.code, StatusCode::Unset);
        assert!(span.is_root());
        assert_eq!(span.duration_nanos(), 100);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (trace_id, span_id) = ids();
        let result = TraceSpan::new(trace_id, span_id, "", 100, 200);
        assert!(matches!(result, Err(SpanValidationError::EmptyName)));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let (trace_id, span_id) = ids();
        let result = TraceSpan::new(trace_id, span_id, "op", 200, 100);
        assert!(matches!(
            result,
            Err(SpanValidationError::InvalidTimeRange {
                start: 200,
                end: 100
            })
        ));
    }

    #[test]
    fn test_zero_duration_allowed() {
        let (trace_id, span_id) = ids();
        let span = TraceSpan::new(trace_id, span_id, "op", 100, 100).unwrap();
        assert_eq!(span.duration_nanos(), 0);
    }

    #[test]
    fn test_builders() {
        let (trace_id, span_id) = ids();
        let parent = SpanId::new("fedcba9876543210").unwrap();
        let span = TraceSpan::new(trace_id, span_id, "op", 100, 200)
            .unwrap()
            .with_parent(parent.clone())
            .with_kind(SpanKind::Server)
            .with_status(SpanStatus::error("boom"))
            .with_attribute("http.method", AttributeValue::from("GET"));
        assert_eq!(span.parent_span_id, Some(parent));
        assert!(!span.is_root());
        assert_eq!(span.kind, SpanKind::Server);
        assert_eq!(span.status.code, StatusCode::Error);
        assert_eq!(span.status.message.as_deref(), Some("boom"));
        assert_eq!(
            span.attributes.get("http.method").and_then(|v| v.as_str()),
            Some("GET")
        );
    }

    #[test]
    fn test_validate_derive() {
        let (trace_id, span_id) = ids();
        let mut span = TraceSpan::new(trace_id, span_id, "op", 100, 200).unwrap();
        assert!(span.validate().is_ok());
        span.name = String::new();
        assert!(span.validate().is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(SpanKind::Producer.to_string(), "producer");
        assert_eq!(StatusCode::Error.to_string(), "error");
    }
}
