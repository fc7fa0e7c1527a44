//! Tracewell Shared Library
//!
//! This crate contains the domain model, buffering, and OTLP conversion
//! logic shared across the Tracewell trace collector.
//!
//! # Modules
//!
//! - [`models`] - Trace identifiers, spans, and attribute values
//! - [`buffer`] - Bounded, thread-safe span buffer with overflow policies
//! - [`otlp`] - Conversion and validation of OTLP wire data
//! - [`storage`] - Storage port for serialized trace payloads
//!
//! # Example
//!
//! ```
//! use shared::models::{SpanId, TraceId, TraceSpan};
//!
//! let trace_id = TraceId::new("0af7651916cd43dd8448eb211c80319c").unwrap();
//! let span_id = SpanId::new("b7ad6b7169203331").unwrap();
//! let span = TraceSpan::new(trace_id, span_id, "GET /api/users", 100, 200).unwrap();
//!
//! assert!(span.is_root());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod buffer;
pub mod models;
pub mod otlp;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
