//! OTLP wire types and conversions into the domain model.

pub mod conversions;
pub mod validation;

/// Generated OTLP protobuf/tonic types.
pub use opentelemetry_proto::tonic as proto;
