//! Shared application state handed to the gRPC services.

use crate::ingest::TraceIngestor;
use anyhow::Context;
use shared::buffer::TraceBuffer;
use shared::storage::{InMemoryTraceStorage, TraceStorage};
use std::sync::Arc;

/// State shared across gRPC service handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion pipeline shared by all requests.
    pub ingestor: Arc<TraceIngestor>,
}

impl AppState {
    /// Creates state around an existing ingestor.
    #[must_use]
    pub fn new(ingestor: Arc<TraceIngestor>) -> Self {
        Self { ingestor }
    }

    /// Creates state with in-memory storage and a reject-on-overflow
    /// buffer of the given capacity.
    ///
    /// # Errors
    ///
    /// Fails when `buffer_max_size` is zero.
    pub fn with_in_memory_storage(buffer_max_size: usize) -> anyhow::Result<Self> {
        let buffer = Arc::new(
            TraceBuffer::reject_new(buffer_max_size).context("failed to create span buffer")?,
        );
        let storage: Arc<dyn TraceStorage> = InMemoryTraceStorage::new_shared();
        Ok(Self::new(Arc::new(TraceIngestor::new(buffer, storage))))
    }
}
