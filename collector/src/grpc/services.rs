//! gRPC service implementation for the OTLP trace collector.

use crate::state::AppState;
use shared::otlp::proto;
use tonic::{Request, Response, Status};

/// Implementation of the OTLP `TraceService` gRPC service.
#[derive(Clone)]
pub struct TracesServiceImpl {
    state: AppState,
}

impl TracesServiceImpl {
    /// Creates a new `TracesServiceImpl` with the given application state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl proto::collector::trace::v1::trace_service_server::TraceService for TracesServiceImpl {
    async fn export(
        &self,
        request: Request<proto::collector::trace::v1::ExportTraceServiceRequest>,
    ) -> Result<Response<proto::collector::trace::v1::ExportTraceServiceResponse>, Status> {
        let req = request.into_inner();

        let summary = self.state.ingestor.process_export(&req);

        tracing::debug!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            drained = summary.drained,
            storage_failed = summary.storage_failed,
            "Processed OTLP gRPC traces"
        );

        // Ingestion problems are reported through partial_success; the
        // RPC itself always succeeds so well-behaved exporters do not
        // retry and duplicate the accepted spans.
        let response = proto::collector::trace::v1::ExportTraceServiceResponse {
            partial_success: if summary.rejected > 0 {
                Some(proto::collector::trace::v1::ExportTracePartialSuccess {
                    rejected_spans: i64::try_from(summary.rejected).unwrap_or(i64::MAX),
                    error_message: format!("{} spans were rejected", summary.rejected),
                })
            } else {
                None
            },
        };

        Ok(Response::new(response))
    }
}
