//! Structural validation of incoming OTLP payloads.
//!
//! These checks run before conversion and decide whether a span is
//! accepted or counted as rejected. They are deliberately permissive:
//! anything the domain model can represent passes, and only malformed
//! identifiers, empty names, and impossible time ranges are refused.

use crate::otlp::proto::trace::v1::{ResourceSpans, ScopeSpans, Span};

/// Length of a trace identifier on the wire, in bytes.
pub const TRACE_ID_BYTES: usize = 16;

/// Length of a span identifier on the wire, in bytes.
pub const SPAN_ID_BYTES: usize = 8;

/// Checks that a string is a valid hex-encoded trace identifier.
#[must_use]
pub fn validate_trace_id_format(value: &str) -> bool {
    value.len() == TRACE_ID_BYTES * 2 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks that a string is a valid hex-encoded span identifier.
#[must_use]
pub fn validate_span_id_format(value: &str) -> bool {
    value.len() == SPAN_ID_BYTES * 2 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks the structural requirements of a single wire span.
///
/// A span is valid when its trace and span identifiers have the right
/// byte length, its name is non-empty, its start timestamp is set, and
/// its end timestamp does not precede its start.
#[must_use]
pub fn validate_span_structure(span: &Span) -> bool {
    span.trace_id.len() == TRACE_ID_BYTES
        && span.span_id.len() == SPAN_ID_BYTES
        && !span.name.is_empty()
        && span.start_time_unix_nano != 0
        && span.end_time_unix_nano >= span.start_time_unix_nano
}

/// Checks that every span in a scope group is structurally valid.
///
/// A group with no spans is valid; it simply contributes nothing.
#[must_use]
pub fn validate_scope_spans_structure(scope_spans: &ScopeSpans) -> bool {
    scope_spans.spans.iter().all(validate_span_structure)
}

/// Checks that a resource group carries at least one scope group and
/// that all of its spans are structurally valid.
#[must_use]
pub fn validate_resource_spans_structure(resource_spans: &ResourceSpans) -> bool {
    !resource_spans.scope_spans.is_empty()
        && resource_spans
            .scope_spans
            .iter()
            .all(validate_scope_spans_structure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_span() -> Span {
        Span {
            trace_id: vec![1; 16],
            span_id: vec![2; 8],
            name: "op".to_string(),
            start_time_unix_nano: 100,
            end_time_unix_nano: 200,
            ..Default::default()
        }
    }

    #[test]
    fn test_id_format_checks() {
        assert!(validate_trace_id_format("0123456789abcdef0123456789ABCDEF"));
        assert!(!validate_trace_id_format("0123456789abcdef"));
        assert!(!validate_trace_id_format(
            "0123456789abcdef0123456789abcdeg"
        ));
        assert!(validate_span_id_format("0123456789abcdef"));
        assert!(!validate_span_id_format(""));
    }

    #[test]
    fn test_valid_span_passes() {
        assert!(validate_span_structure(&valid_span()));
    }

    #[test]
    fn test_span_with_zero_duration_passes() {
        let mut span = valid_span();
        span.end_time_unix_nano = span.start_time_unix_nano;
        assert!(validate_span_structure(&span));
    }

    #[test]
    fn test_span_rejections() {
        let mut span = valid_span();
        span.trace_id = vec![1; 8];
        assert!(!validate_span_structure(&span));

        let mut span = valid_span();
        span.span_id = Vec::new();
        assert!(!validate_span_structure(&span));

        let mut span = valid_span();
        span.name = String::new();
        assert!(!validate_span_structure(&span));

        let mut span = valid_span();
        span.start_time_unix_nano = 0;
        assert!(!validate_span_structure(&span));

        let mut span = valid_span();
        span.end_time_unix_nano = 50;
        assert!(!validate_span_structure(&span));
    }

    #[test]
    fn test_scope_spans_checks() {
        let empty = ScopeSpans::default();
        assert!(validate_scope_spans_structure(&empty));

        let good = ScopeSpans {
            spans: vec![valid_span(), valid_span()],
            ..Default::default()
        };
        assert!(validate_scope_spans_structure(&good));

        let mut bad_span = valid_span();
        bad_span.name = String::new();
        let bad = ScopeSpans {
            spans: vec![valid_span(), bad_span],
            ..Default::default()
        };
        assert!(!validate_scope_spans_structure(&bad));
    }

    #[test]
    fn test_resource_spans_checks() {
        let empty = ResourceSpans::default();
        assert!(!validate_resource_spans_structure(&empty));

        let good = ResourceSpans {
            scope_spans: vec![ScopeSpans {
                spans: vec![valid_span()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate_resource_spans_structure(&good));
    }
}
