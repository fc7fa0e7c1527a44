//! Data models for the Tracewell trace collector.
//!
//! This module contains the value objects and entities the ingestion
//! pipeline produces from OTLP wire data.

pub mod attribute;
pub mod ids;
pub mod span;

pub use attribute::AttributeValue;
pub use ids::{IdError, SpanId, TraceId};
pub use span::{
    SpanEvent, SpanKind, SpanStatus, SpanValidationError, StatusCode, TraceSpan,
};
