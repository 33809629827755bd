//! Caller-facing handle for dispatching index commands
//!
//! `send` hands a command to the worker pool and returns at once. Nothing
//! that happens to the command afterwards can reach the caller.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::queue::{CommandQueue, PushOutcome};
use super::stats::{DispatchStats, DispatchStatsSnapshot};
use super::switch::SyncSwitch;
use crate::search::command::IndexCommand;

/// What happened to a command handed to [`DispatchChannel::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Queued for a worker
    Queued,
    /// Queued; the oldest queued command was evicted to make room
    QueuedEvictingOldest,
    /// Dispatch is disabled; nothing was queued
    Disabled,
    /// Queue full; this command was discarded
    DroppedFull,
    /// Workers have shut down
    Closed,
}

impl SendStatus {
    /// Whether the command is now waiting for delivery
    #[must_use]
    pub fn is_queued(self) -> bool {
        matches!(self, SendStatus::Queued | SendStatus::QueuedEvictingOldest)
    }
}

/// Handle for sending index commands to the background workers
#[derive(Clone)]
pub struct DispatchChannel {
    pub(super) queue: Arc<CommandQueue>,
    pub(super) switch: SyncSwitch,
    pub(super) stats: Arc<DispatchStats>,
}

impl fmt::Debug for DispatchChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchChannel")
            .field("enabled", &self.switch.is_enabled())
            .field("queued", &self.queue.len())
            .field("pending", &self.stats.pending.load(Ordering::Relaxed))
            .finish()
    }
}

impl DispatchChannel {
    /// Enqueue a command for asynchronous delivery
    ///
    /// Never blocks and never fails from the caller's point of view; the
    /// returned status is informational.
    pub fn send(&self, command: IndexCommand) -> SendStatus {
        if !self.switch.is_enabled() {
            self.stats.skipped_disabled.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                entity_id = %command.id(),
                kind = %command.kind(),
                "Search dispatch disabled, command skipped"
            );
            return SendStatus::Disabled;
        }

        let entity_id = command.id().clone();
        let kind = command.kind();

        match self.queue.push(command) {
            PushOutcome::Queued => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                self.stats.pending.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(entity_id = %entity_id, kind = %kind, "Index command queued");
                SendStatus::Queued
            }
            PushOutcome::Evicted(evicted) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    entity_id = %entity_id,
                    evicted_id = %evicted.id(),
                    evicted_kind = %evicted.kind(),
                    "Dispatch queue full, evicted oldest index command"
                );
                SendStatus::QueuedEvictingOldest
            }
            PushOutcome::Rejected(rejected) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    entity_id = %rejected.id(),
                    kind = %rejected.kind(),
                    "Dispatch queue full, index command dropped"
                );
                SendStatus::DroppedFull
            }
            PushOutcome::Closed(rejected) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    entity_id = %rejected.id(),
                    kind = %rejected.kind(),
                    "Dispatch workers stopped, index command dropped"
                );
                SendStatus::Closed
            }
        }
    }

    /// The toggle gating this channel
    #[must_use]
    pub fn switch(&self) -> &SyncSwitch {
        &self.switch
    }

    /// Resolve once nothing is queued or in flight
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Channel with no workers attached; commands stay queued
    #[cfg(test)]
    pub(crate) fn detached(capacity: usize, switch: SyncSwitch) -> Self {
        Self {
            queue: Arc::new(CommandQueue::new(
                capacity,
                crate::config::BackpressureMode::DropNewest,
            )),
            switch,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> Vec<IndexCommand> {
        self.queue.queued()
    }
}
