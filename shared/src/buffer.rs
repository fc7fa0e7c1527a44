//! Bounded in-memory span buffer with configurable overflow policies.

use crate::models::TraceSpan;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised when constructing a [`TraceBuffer`].
#[derive(Error, Debug)]
pub enum BufferError {
    /// The requested capacity was zero.
    #[error("buffer capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
}

/// How a full buffer reacts to new spans and to reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferPolicy {
    /// When full, drop the oldest span to make room for the new one.
    EvictOldest,
    /// When full, refuse the new span and leave the buffer unchanged.
    RejectNew,
    /// Like [`BufferPolicy::EvictOldest`], but reads also remove the
    /// spans they return.
    ConsumeOnRead,
}

/// A point-in-time snapshot of buffer occupancy.
#[derive(Debug, Clone, Serialize)]
pub struct BufferStatus {
    /// Number of spans currently held.
    pub current_size: usize,
    /// Maximum number of spans the buffer can hold.
    pub max_size: usize,
    /// Whether the buffer is at capacity.
    pub is_full: bool,
    /// Whether the buffer is empty.
    pub is_empty: bool,
}

/// A bounded FIFO buffer of spans shared between ingestion and readers.
///
/// All operations take the internal lock for the duration of the call,
/// so every method is a single atomic step with respect to concurrent
/// callers. A poisoned lock is recovered rather than propagated; the
/// guarded state is valid after any partial mutation.
#[derive(Debug)]
pub struct TraceBuffer {
    spans: Mutex<VecDeque<TraceSpan>>,
    max_size: usize,
    policy: BufferPolicy,
}

impl TraceBuffer {
    /// Creates a buffer with the given policy and capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `max_size` is zero.
    pub fn new(policy: BufferPolicy, max_size: usize) -> Result<Self, BufferError> {
        if max_size == 0 {
            return Err(BufferError::InvalidCapacity(max_size));
        }
        Ok(Self {
            spans: Mutex::new(VecDeque::with_capacity(max_size)),
            max_size,
            policy,
        })
    }

    /// Creates a buffer that evicts the oldest span on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `max_size` is zero.
    pub fn evict_oldest(max_size: usize) -> Result<Self, BufferError> {
        Self::new(BufferPolicy::EvictOldest, max_size)
    }

    /// Creates a buffer that rejects new spans on overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `max_size` is zero.
    pub fn reject_new(max_size: usize) -> Result<Self, BufferError> {
        Self::new(BufferPolicy::RejectNew, max_size)
    }

    /// Creates a buffer whose reads consume the spans they return.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidCapacity`] when `max_size` is zero.
    pub fn consume_on_read(max_size: usize) -> Result<Self, BufferError> {
        Self::new(BufferPolicy::ConsumeOnRead, max_size)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TraceSpan>> {
        self.spans
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Adds a span, applying the overflow policy when full.
    ///
    /// Returns `false` only under [`BufferPolicy::RejectNew`] when the
    /// buffer is at capacity; the buffer is left unchanged in that case.
    pub fn add(&self, span: TraceSpan) -> bool {
        let mut spans = self.lock();
        if spans.len() >= self.max_size {
            if self.policy == BufferPolicy::RejectNew {
                return false;
            }
            tracing::trace!(max_size = self.max_size, "buffer full, evicting oldest span");
            spans.pop_front();
        }
        spans.push_back(span);
        true
    }

    /// Returns up to `count` spans, oldest first.
    ///
    /// Under [`BufferPolicy::ConsumeOnRead`] the returned spans are
    /// removed from the buffer; other policies leave it unchanged.
    #[must_use]
    pub fn get(&self, count: usize) -> Vec<TraceSpan> {
        let mut spans = self.lock();
        let n = count.min(spans.len());
        if self.policy == BufferPolicy::ConsumeOnRead {
            spans.drain(..n).collect()
        } else {
            spans.iter().take(n).cloned().collect()
        }
    }

    /// Removes and returns all buffered spans, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<TraceSpan> {
        self.lock().drain(..).collect()
    }

    /// Removes all buffered spans and adds the given span, as one
    /// atomic step.
    ///
    /// Callers recovering from a rejected `add` use this so that no
    /// concurrent writer can refill the buffer between the drain and
    /// the reinsertion; the span is always held afterwards.
    #[must_use]
    pub fn drain_and_add(&self, span: TraceSpan) -> Vec<TraceSpan> {
        let mut spans = self.lock();
        let drained = spans.drain(..).collect();
        spans.push_back(span);
        drained
    }

    /// Removes all buffered spans.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of spans currently held.
    #[must_use]
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    /// Maximum number of spans the buffer can hold.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether the buffer is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.lock().len() >= self.max_size
    }

    /// Whether the buffer holds no spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the buffer occupancy.
    ///
    /// All four fields come from a single observation under the lock,
    /// so they are mutually consistent.
    #[must_use]
    pub fn status(&self) -> BufferStatus {
        let spans = self.lock();
        BufferStatus {
            current_size: spans.len(),
            max_size: self.max_size,
            is_full: spans.len() >= self.max_size,
            is_empty: spans.is_empty(),
        }
    }
}
