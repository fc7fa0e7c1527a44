//! Ingestion pipeline turning export requests into buffered spans.

use prost::Message;
use shared::buffer::{BufferStatus, TraceBuffer};
use shared::otlp::conversions::otlp_span_to_trace_span;
use shared::otlp::proto::collector::trace::v1::ExportTraceServiceRequest;
use shared::otlp::validation::validate_span_structure;
use shared::storage::TraceStorage;
use std::sync::Arc;

/// Outcome of processing one export request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Spans validated, converted, and buffered.
    pub accepted: usize,
    /// Spans refused by validation or conversion.
    pub rejected: usize,
    /// Spans flushed out of the buffer to make room, across all
    /// overflow recoveries in this request.
    pub drained: usize,
    /// Whether the storage write for this request failed.
    pub storage_failed: bool,
}

/// Processes export requests: validates, converts, buffers, and hands
/// the raw payload to storage.
pub struct TraceIngestor {
    buffer: Arc<TraceBuffer>,
    storage: Arc<dyn TraceStorage>,
}

impl TraceIngestor {
    /// Creates an ingestor over a shared buffer and storage sink.
    #[must_use]
    pub fn new(buffer: Arc<TraceBuffer>, storage: Arc<dyn TraceStorage>) -> Self {
        Self { buffer, storage }
    }

    /// Processes a single export request.
    ///
    /// Walks every resource group and scope group, validating and
    /// converting each span. Valid spans are buffered; when the buffer
    /// refuses a span its contents are drained and the span inserted in
    /// their place as one atomic step, so an accepted span is never lost.
    /// After the walk, the serialized request is written to storage
    /// exactly once, provided the request carried any spans at all.
    /// Failures are reported in the summary, never propagated.
    pub fn process_export(&self, request: &ExportTraceServiceRequest) -> IngestSummary {
        let mut summary = IngestSummary::default();

        for resource_spans in &request.resource_spans {
            if resource_spans.scope_spans.is_empty() {
                tracing::debug!("skipping resource spans group with no scope spans");
                continue;
            }
            for scope_spans in &resource_spans.scope_spans {
                for otlp_span in &scope_spans.spans {
                    if !validate_span_structure(otlp_span) {
                        summary.rejected += 1;
                        continue;
                    }
                    match otlp_span_to_trace_span(otlp_span) {
                        Ok(trace_span) => {
                            if !self.buffer.add(trace_span.clone()) {
                                // Atomic, so a concurrent request cannot
                                // refill the buffer between the drain and
                                // the reinsertion and drop this span.
                                let drained = self.buffer.drain_and_add(trace_span);
                                tracing::warn!(
                                    drained = drained.len(),
                                    "span buffer full, drained to make room"
                                );
                                summary.drained += drained.len();
                            }
                            summary.accepted += 1;
                        }
                        Err(error) => {
                            tracing::debug!(%error, "rejecting unconvertible span");
                            summary.rejected += 1;
                        }
                    }
                }
            }
        }

        if summary.accepted + summary.rejected > 0 {
            if let Err(error) = self.storage.store(request.encode_to_vec()) {
                tracing::error!(%error, "failed to store export payload");
                summary.storage_failed = true;
            }
        }

        summary
    }

    /// Snapshot of the buffer occupancy.
    #[must_use]
    pub fn buffer_status(&self) -> BufferStatus {
        self.buffer.status()
    }

    /// The buffer this ingestor writes into.
    #[must_use]
    pub fn buffer(&self) -> &Arc<TraceBuffer> {
        &self.buffer
    }
}
