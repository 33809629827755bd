//! Lock-free statistics tracking for index dispatch
//!
//! This module provides atomic counters without locks so the caller's
//! `send` path and the workers can update them concurrently.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free dispatch statistics
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Commands accepted into the queue
    pub enqueued: AtomicUsize,
    /// Commands the search server acknowledged
    pub sent: AtomicUsize,
    /// Commands that failed delivery and were dropped
    pub failed: AtomicUsize,
    /// Commands lost to back-pressure or a closed queue
    pub dropped: AtomicUsize,
    /// Sends ignored because dispatch was disabled
    pub skipped_disabled: AtomicUsize,
    /// Commands superseded by a later command for the same identity
    pub deduplicated: AtomicUsize,
    /// Commands queued or in flight
    pub pending: AtomicUsize,
}

impl DispatchStats {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get snapshot of current statistics
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            skipped_disabled: self.skipped_disabled.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of dispatch statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStatsSnapshot {
    pub enqueued: usize,
    pub sent: usize,
    pub failed: usize,
    pub dropped: usize,
    pub skipped_disabled: usize,
    pub deduplicated: usize,
    pub pending: usize,
}
