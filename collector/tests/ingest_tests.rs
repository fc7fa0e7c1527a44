//! Integration tests for the OTLP trace ingestion pipeline.
//!
//! These tests exercise the complete flow from an export request through
//! validation, conversion, buffering, and payload storage.

use collector::{AppState, TraceIngestor, TracesServiceImpl};
use shared::buffer::TraceBuffer;
use shared::otlp::proto;
use shared::otlp::proto::collector::trace::v1::trace_service_server::TraceService;
use shared::otlp::proto::collector::trace::v1::ExportTraceServiceRequest;
use shared::storage::{InMemoryTraceStorage, TraceStorage};
use std::sync::Arc;
use tonic::Request;

fn test_state(capacity: usize) -> (AppState, Arc<InMemoryTraceStorage>) {
    let buffer = Arc::new(TraceBuffer::reject_new(capacity).unwrap());
    let storage = InMemoryTraceStorage::new_shared();
    let state = AppState::new(Arc::new(TraceIngestor::new(
        buffer,
        Arc::clone(&storage) as Arc<dyn TraceStorage>,
    )));
    (state, storage)
}

fn wire_span(name: &str, span_id_byte: u8) -> proto::trace::v1::Span {
    proto::trace::v1::Span {
        trace_id: vec![0xab; 16],
        span_id: vec![span_id_byte; 8],
        name: name.to_string(),
        kind: proto::trace::v1::span::SpanKind::Client as i32,
        start_time_unix_nano: 1_700_000_000_000_000_000,
        end_time_unix_nano: 1_700_000_000_000_500_000,
        status: Some(proto::trace::v1::Status {
            code: proto::trace::v1::status::StatusCode::Ok as i32,
            message: String::new(),
        }),
        ..Default::default()
    }
}

fn export_request(spans: Vec<proto::trace::v1::Span>) -> ExportTraceServiceRequest {
    ExportTraceServiceRequest {
        resource_spans: vec![proto::trace::v1::ResourceSpans {
            resource: Some(proto::resource::v1::Resource::default()),
            scope_spans: vec![proto::trace::v1::ScopeSpans {
                spans,
                ..Default::default()
            }],
            schema_url: String::new(),
        }],
    }
}

#[tokio::test]
async fn test_spans_accumulate_across_requests_in_order() {
    let (state, storage) = test_state(100);
    let service = TracesServiceImpl::new(state.clone());

    for (i, name) in ["first", "second", "third"].iter().enumerate() {
        let request = export_request(vec![wire_span(name, u8::try_from(i).unwrap() + 1)]);
        let response = service.export(Request::new(request)).await.unwrap();
        assert!(response.into_inner().partial_success.is_none());
    }

    let buffered = state.ingestor.buffer().get(10);
    let names: Vec<&str> = buffered.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);

    // One stored payload per request.
    assert_eq!(storage.payload_count().unwrap(), 3);
}

#[tokio::test]
async fn test_mixed_request_accounts_per_span() {
    let (state, _storage) = test_state(100);
    let service = TracesServiceImpl::new(state.clone());

    let mut short_trace_id = wire_span("bad-trace-id", 1);
    short_trace_id.trace_id = vec![1; 3];
    let mut no_start = wire_span("no-start", 2);
    no_start.start_time_unix_nano = 0;
    let mut inverted = wire_span("inverted", 3);
    inverted.end_time_unix_nano = 1;

    let request = export_request(vec![
        wire_span("good-1", 4),
        short_trace_id,
        no_start,
        wire_span("good-2", 5),
        inverted,
    ]);

    let response = service.export(Request::new(request)).await.unwrap();
    let partial = response.into_inner().partial_success.unwrap();
    assert_eq!(partial.rejected_spans, 3);

    let status = state.ingestor.buffer_status();
    assert_eq!(status.current_size, 2);
}

#[tokio::test]
async fn test_multiple_resource_groups_in_one_request() {
    let (state, storage) = test_state(100);
    let service = TracesServiceImpl::new(state.clone());

    let request = ExportTraceServiceRequest {
        resource_spans: vec![
            proto::trace::v1::ResourceSpans {
                scope_spans: vec![proto::trace::v1::ScopeSpans {
                    spans: vec![wire_span("from-service-a", 1)],
                    ..Default::default()
                }],
                ..Default::default()
            },
            // Groups with no scope spans contribute nothing.
            proto::trace::v1::ResourceSpans::default(),
            proto::trace::v1::ResourceSpans {
                scope_spans: vec![
                    proto::trace::v1::ScopeSpans {
                        spans: vec![wire_span("from-service-b", 2)],
                        ..Default::default()
                    },
                    proto::trace::v1::ScopeSpans::default(),
                ],
                ..Default::default()
            },
        ],
    };

    let response = service.export(Request::new(request)).await.unwrap();
    assert!(response.into_inner().partial_success.is_none());
    assert_eq!(state.ingestor.buffer_status().current_size, 2);
    assert_eq!(storage.payload_count().unwrap(), 1);
}

#[tokio::test]
async fn test_overflow_recovery_keeps_latest_spans() {
    let (state, _storage) = test_state(2);
    let service = TracesServiceImpl::new(state.clone());

    let request = export_request(vec![
        wire_span("a", 1),
        wire_span("b", 2),
        wire_span("c", 3),
    ]);
    let response = service.export(Request::new(request)).await.unwrap();
    assert!(response.into_inner().partial_success.is_none());

    // Filling the buffer forced one drain; only spans added after the
    // drain remain.
    let buffered = state.ingestor.buffer().get(10);
    assert_eq!(buffered.len(), 1);
    assert_eq!(buffered[0].name, "c");
}

#[test]
fn test_overflow_accounting_under_contention() {
    let buffer = Arc::new(TraceBuffer::reject_new(1).unwrap());
    let storage = InMemoryTraceStorage::new_shared();
    let ingestor = Arc::new(TraceIngestor::new(
        Arc::clone(&buffer),
        storage as Arc<dyn TraceStorage>,
    ));

    let handles: Vec<_> = (0..8u8)
        .map(|worker| {
            let ingestor = Arc::clone(&ingestor);
            std::thread::spawn(move || {
                let mut accepted = 0usize;
                let mut drained = 0usize;
                for i in 0..500u16 {
                    let request = export_request(vec![wire_span(
                        &format!("worker-{worker}-span-{i}"),
                        worker | 1,
                    )]);
                    let summary = ingestor.process_export(&request);
                    assert_eq!(summary.rejected, 0);
                    accepted += summary.accepted;
                    drained += summary.drained;
                }
                (accepted, drained)
            })
        })
        .collect();

    let mut accepted_total = 0usize;
    let mut drained_total = 0usize;
    for handle in handles {
        let (accepted, drained) = handle.join().unwrap();
        accepted_total += accepted;
        drained_total += drained;
    }

    // Every accepted span is either still buffered or was drained;
    // none may vanish when concurrent requests race for the last slot.
    assert_eq!(accepted_total, 8 * 500);
    assert_eq!(accepted_total, drained_total + buffer.size());
}

#[tokio::test]
async fn test_concurrent_exports() {
    let (state, storage) = test_state(1_000);

    let mut handles = Vec::new();
    for worker in 0..8u8 {
        let service = TracesServiceImpl::new(state.clone());
        handles.push(tokio::spawn(async move {
            for i in 0..10u8 {
                let request = export_request(vec![wire_span(
                    &format!("worker-{worker}-span-{i}"),
                    worker.wrapping_mul(16).wrapping_add(i) | 1,
                )]);
                let response = service.export(Request::new(request)).await.unwrap();
                assert!(response.into_inner().partial_success.is_none());
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(state.ingestor.buffer_status().current_size, 80);
    assert_eq!(storage.payload_count().unwrap(), 80);
}

#[tokio::test]
async fn test_converted_span_carries_full_detail() {
    let (state, _storage) = test_state(10);
    let service = TracesServiceImpl::new(state.clone());

    let mut span = wire_span("checkout", 7);
    span.parent_span_id = vec![9; 8];
    span.attributes = vec![proto::common::v1::KeyValue {
        key: "http.status_code".to_string(),
        value: Some(proto::common::v1::AnyValue {
            value: Some(proto::common::v1::any_value::Value::IntValue(200)),
        }),
    }];
    span.events = vec![proto::trace::v1::span::Event {
        name: "payment-authorized".to_string(),
        time_unix_nano: 1_700_000_000_000_100_000,
        ..Default::default()
    }];

    service
        .export(Request::new(export_request(vec![span])))
        .await
        .unwrap();

    let buffered = state.ingestor.buffer().get(1);
    let span = &buffered[0];
    assert_eq!(span.name, "checkout");
    assert_eq!(span.kind, shared::models::SpanKind::Client);
    assert_eq!(span.status.code, shared::models::StatusCode::Ok);
    assert!(!span.is_root());
    assert_eq!(
        span.attributes
            .get("http.status_code")
            .and_then(shared::models::AttributeValue::as_int),
        Some(200)
    );
    assert_eq!(span.events.len(), 1);
    assert_eq!(span.events[0].name, "payment-authorized");
    assert_eq!(span.duration_nanos(), 500_000);
}
