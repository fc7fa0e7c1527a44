//! Tracewell Collector
//!
//! This crate provides the OTLP gRPC ingestion endpoint for the Tracewell
//! tracing platform. It accepts OpenTelemetry trace exports, validates and
//! converts the spans into the domain model, buffers them for downstream
//! consumers, and hands the raw payloads to a storage sink.
//!
//! # Example
//!
//! ```no_run
//! use collector::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod grpc;
mod ingest;
mod state;

pub use config::Config;
pub use grpc::TracesServiceImpl;
pub use ingest::{IngestSummary, TraceIngestor};
pub use state::AppState;

use anyhow::Result;
use shared::otlp::proto::collector::trace::v1::trace_service_server::TraceServiceServer;
use tonic::transport::Server;

/// Runs the Tracewell collector.
///
/// Loads configuration from environment variables, then starts the gRPC
/// server and listens until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Tracewell collector with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration
/// programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        buffer_max_size = config.buffer_max_size,
        max_message_length = config.max_message_length,
        "Tracewell collector starting"
    );

    if config.enable_reflection {
        // No descriptor set is bundled with the generated OTLP types, so
        // the flag is accepted but cannot be honored.
        tracing::warn!("gRPC reflection requested but not available, continuing without it");
    }

    let state = AppState::with_in_memory_storage(config.buffer_max_size)?;
    let service = TracesServiceImpl::new(state);

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<TraceServiceServer<TracesServiceImpl>>()
        .await;

    tracing::info!(%addr, "Listening for OTLP gRPC connections");

    Server::builder()
        .add_service(health_service)
        .add_service(
            TraceServiceServer::new(service)
                .max_decoding_message_size(config.max_message_length),
        )
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    tracing::info!("Collector shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
