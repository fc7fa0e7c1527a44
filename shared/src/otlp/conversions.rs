//! Conversions from OTLP wire types into the domain model.

use crate::models::{
    AttributeValue, IdError, SpanEvent, SpanId, SpanKind, SpanStatus, SpanValidationError,
    StatusCode, TraceId, TraceSpan,
};
use crate::otlp::proto::common::v1::{any_value, AnyValue, KeyValue};
use crate::otlp::proto::trace::v1::{span, status, Span, Status};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, UNIX_EPOCH};
use thiserror::Error;

/// Errors raised while converting a wire span into a [`TraceSpan`].
#[derive(Error, Debug)]
pub enum SpanConversionError {
    /// A trace or span identifier had the wrong length or encoding.
    #[error(transparent)]
    InvalidId(#[from] IdError),
    /// The span fields failed domain validation.
    #[error(transparent)]
    InvalidSpan(#[from] SpanValidationError),
}

/// Converts nanoseconds since the Unix epoch into a UTC timestamp.
#[must_use]
pub fn timestamp_to_datetime(nanos: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from(UNIX_EPOCH + Duration::from_nanos(nanos))
}

/// Converts an OTLP `AnyValue` into an [`AttributeValue`].
///
/// A value with no variant set maps to [`AttributeValue::Null`], as do
/// missing entries inside arrays and key-value lists.
#[must_use]
pub fn extract_value(value: &AnyValue) -> AttributeValue {
    match &value.value {
        Some(any_value::Value::StringValue(s)) => AttributeValue::String(s.clone()),
        Some(any_value::Value::BoolValue(b)) => AttributeValue::Bool(*b),
        Some(any_value::Value::IntValue(i)) => AttributeValue::Int(*i),
        Some(any_value::Value::DoubleValue(d)) => AttributeValue::Double(*d),
        Some(any_value::Value::BytesValue(bytes)) => AttributeValue::Bytes(bytes.clone()),
        Some(any_value::Value::ArrayValue(array)) => {
            AttributeValue::Array(array.values.iter().map(extract_value).collect())
        }
        Some(any_value::Value::KvlistValue(kvlist)) => {
            AttributeValue::KvList(key_values_to_map(&kvlist.values))
        }
        None => AttributeValue::Null,
    }
}

/// Converts a list of OTLP key-value pairs into an attribute map.
///
/// Later entries win on duplicate keys. A pair with no value set maps
/// to [`AttributeValue::Null`].
#[must_use]
pub fn key_values_to_map(key_values: &[KeyValue]) -> HashMap<String, AttributeValue> {
    key_values
        .iter()
        .map(|kv| {
            let value = kv
                .value
                .as_ref()
                .map_or(AttributeValue::Null, extract_value);
            (kv.key.clone(), value)
        })
        .collect()
}

/// Maps an OTLP span kind code onto the domain [`SpanKind`].
///
/// Unspecified and unknown codes fall back to [`SpanKind::Internal`].
#[must_use]
pub fn otlp_span_kind_to_kind(kind: i32) -> SpanKind {
    match span::SpanKind::try_from(kind) {
        Ok(span::SpanKind::Server) => SpanKind::Server,
        Ok(span::SpanKind::Client) => SpanKind::Client,
        Ok(span::SpanKind::Producer) => SpanKind::Producer,
        Ok(span::SpanKind::Consumer) => SpanKind::Consumer,
        _ => SpanKind::Internal,
    }
}

/// Maps an OTLP status onto the domain [`SpanStatus`].
///
/// A missing status or an unknown code maps to
/// [`StatusCode::Unset`]; an empty message is treated as absent.
#[must_use]
pub fn otlp_status_to_status(otlp_status: Option<&Status>) -> SpanStatus {
    let Some(otlp_status) = otlp_status else {
        return SpanStatus::default();
    };
    let code = match status::StatusCode::try_from(otlp_status.code) {
        Ok(status::StatusCode::Ok) => StatusCode::Ok,
        Ok(status::StatusCode::Error) => StatusCode::Error,
        _ => StatusCode::Unset,
    };
    let message = if otlp_status.message.is_empty() {
        None
    } else {
        Some(otlp_status.message.clone())
    };
    SpanStatus { code, message }
}

fn otlp_events_to_events(events: &[span::Event]) -> Vec<SpanEvent> {
    events
        .iter()
        .filter(|event| !event.name.is_empty())
        .map(|event| SpanEvent {
            name: event.name.clone(),
            timestamp: timestamp_to_datetime(event.time_unix_nano),
            attributes: key_values_to_map(&event.attributes),
        })
        .collect()
}

/// Converts a full OTLP wire span into a domain [`TraceSpan`].
///
/// # Errors
///
/// Returns [`SpanConversionError`] when the identifiers have the wrong
/// length or the span fields fail domain validation.
pub fn otlp_span_to_trace_span(otlp_span: &Span) -> Result<TraceSpan, SpanConversionError> {
    let trace_id = TraceId::from_bytes(&otlp_span.trace_id)?;
    let span_id = SpanId::from_bytes(&otlp_span.span_id)?;

    let mut trace_span = TraceSpan::new(
        trace_id,
        span_id,
        otlp_span.name.clone(),
        otlp_span.start_time_unix_nano,
        otlp_span.end_time_unix_nano,
    )?
    .with_kind(otlp_span_kind_to_kind(otlp_span.kind))
    .with_status(otlp_status_to_status(otlp_span.status.as_ref()))
    .with_attributes(key_values_to_map(&otlp_span.attributes))
    .with_events(otlp_events_to_events(&otlp_span.events));

    if !otlp_span.parent_span_id.is_empty() {
        trace_span = trace_span.with_parent(SpanId::from_bytes(&otlp_span.parent_span_id)?);
    }

    Ok(trace_span)
}

#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
