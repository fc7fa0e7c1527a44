//! Storage port for exported trace payloads.

use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum TraceStorageError {
    /// Failed to acquire a lock on the storage.
    #[error("failed to acquire lock on storage")]
    LockError,
    /// The backend rejected or failed the write.
    #[error("storage error: {0}")]
    StorageError(String),
}

/// Sink for serialized export payloads.
///
/// Implementations receive the encoded request bytes exactly as they
/// arrived on the wire and decide how to persist them.
pub trait TraceStorage: Send + Sync {
    /// Stores a single serialized payload.
    ///
    /// # Errors
    ///
    /// Returns [`TraceStorageError`] when the write fails.
    fn store(&self, payload: Vec<u8>) -> Result<(), TraceStorageError>;

    /// Stores a batch of serialized payloads.
    ///
    /// # Errors
    ///
    /// Returns [`TraceStorageError`] when any write fails.
    fn store_batch(&self, batch: Vec<Vec<u8>>) -> Result<(), TraceStorageError> {
        for payload in batch {
            self.store(payload)?;
        }
        Ok(())
    }
}

/// In-memory storage keeping payloads in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTraceStorage {
    payloads: RwLock<Vec<Vec<u8>>>,
}

impl InMemoryTraceStorage {
    /// Creates an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty in-memory storage behind an [`Arc`].
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of payloads stored so far.
    ///
    /// # Errors
    ///
    /// Returns [`TraceStorageError::LockError`] if the lock is poisoned.
    pub fn payload_count(&self) -> Result<usize, TraceStorageError> {
        let payloads = self
            .payloads
            .read()
            .map_err(|_| TraceStorageError::LockError)?;
        Ok(payloads.len())
    }

    /// Returns a copy of all stored payloads, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TraceStorageError::LockError`] if the lock is poisoned.
    pub fn payloads(&self) -> Result<Vec<Vec<u8>>, TraceStorageError> {
        let payloads = self
            .payloads
            .read()
            .map_err(|_| TraceStorageError::LockError)?;
        Ok(payloads.clone())
    }

    /// Removes all stored payloads.
    ///
    /// # Errors
    ///
    /// Returns [`TraceStorageError::LockError`] if the lock is poisoned.
    pub fn clear(&self) -> Result<(), TraceStorageError> {
        let mut payloads = self
            .payloads
            .write()
            .map_err(|_| TraceStorageError::LockError)?;
        payloads.clear();
        Ok(())
    }
}

impl TraceStorage for InMemoryTraceStorage {
    fn store(&self, payload: Vec<u8>) -> Result<(), TraceStorageError> {
        let mut payloads = self
            .payloads
            .write()
            .map_err(|_| TraceStorageError::LockError)?;
        payloads.push(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_single_payload() {
        let storage = InMemoryTraceStorage::new();
        storage.store(vec![1, 2, 3]).unwrap();
        assert_eq!(storage.payload_count().unwrap(), 1);
        assert_eq!(storage.payloads().unwrap()[0], vec![1, 2, 3]);
    }

    #[test]
    fn test_store_batch_preserves_order() {
        let storage = InMemoryTraceStorage::new();
        storage
            .store_batch(vec![vec![1], vec![2], vec![3]])
            .unwrap();
        let payloads = storage.payloads().unwrap();
        assert_eq!(payloads, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_clear() {
        let storage = InMemoryTraceStorage::new();
        storage.store(vec![1]).unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.payload_count().unwrap(), 0);
    }

    #[test]
    fn test_trait_object_usage() {
        let storage: Arc<dyn TraceStorage> = InMemoryTraceStorage::new_shared();
        storage.store(vec![9]).unwrap();
    }
}
