//! Bounded command queue shared by the channel handle and the workers
//!
//! Pushing never waits: when the queue is full the configured
//! `BackpressureMode` decides which command is lost. Workers wait on a
//! `Notify` for new work; `wait_idle` waits on a second one for the queue to
//! drain completely.

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tokio::sync::Notify;

use crate::config::BackpressureMode;
use crate::search::command::IndexCommand;

/// Inline capacity of a worker batch before it spills to the heap
pub(crate) const BATCH_INLINE: usize = 32;

pub(crate) type CommandBatch = SmallVec<[IndexCommand; BATCH_INLINE]>;

/// Result of a push attempt
#[derive(Debug)]
pub(crate) enum PushOutcome {
    Queued,
    /// Queued after evicting the returned oldest command
    Evicted(IndexCommand),
    /// Queue full, incoming command discarded
    Rejected(IndexCommand),
    Closed(IndexCommand),
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<IndexCommand>,
    in_flight: usize,
    closed: bool,
}

#[derive(Debug)]
pub(crate) struct CommandQueue {
    state: Mutex<QueueState>,
    ready: Notify,
    idle: Notify,
    capacity: usize,
    mode: BackpressureMode,
}

impl CommandQueue {
    pub(crate) fn new(capacity: usize, mode: BackpressureMode) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(1024)),
                ..QueueState::default()
            }),
            ready: Notify::new(),
            idle: Notify::new(),
            capacity: capacity.max(1),
            mode,
        }
    }

    pub(crate) fn push(&self, command: IndexCommand) -> PushOutcome {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return PushOutcome::Closed(command);
            }
            if state.items.len() >= self.capacity {
                match self.mode {
                    BackpressureMode::DropNewest => return PushOutcome::Rejected(command),
                    BackpressureMode::DropOldest => {
                        let evicted = state.items.pop_front();
                        state.items.push_back(command);
                        evicted.map_or(PushOutcome::Queued, PushOutcome::Evicted)
                    }
                }
            } else {
                state.items.push_back(command);
                PushOutcome::Queued
            }
        };
        self.ready.notify_one();
        outcome
    }

    /// Take up to `max` commands, waiting while the queue is empty
    ///
    /// Returns `None` once the queue is closed and fully drained.
    pub(crate) async fn pop_batch(&self, max: usize) -> Option<CommandBatch> {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if !state.items.is_empty() {
                    let take = max.max(1).min(state.items.len());
                    let batch: CommandBatch = state.items.drain(..take).collect();
                    state.in_flight += batch.len();
                    let more = !state.items.is_empty();
                    drop(state);
                    if more {
                        self.ready.notify_one();
                    }
                    return Some(batch);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark `count` previously popped commands as finished
    pub(crate) fn complete(&self, count: usize) {
        let idle = {
            let mut state = self.state.lock();
            state.in_flight = state.in_flight.saturating_sub(count);
            state.items.is_empty() && state.in_flight == 0
        };
        if idle {
            self.idle.notify_waiters();
        }
    }

    /// Refuse further pushes; workers drain what is left and stop
    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.ready.notify_waiters();
        if self.is_idle() {
            self.idle.notify_waiters();
        }
    }

    /// Forget queued and in-flight commands after the workers were aborted
    ///
    /// Returns how many commands were lost.
    pub(crate) fn abandon(&self) -> usize {
        let lost = {
            let mut state = self.state.lock();
            let lost = state.items.len() + state.in_flight;
            state.items.clear();
            state.in_flight = 0;
            state.closed = true;
            lost
        };
        self.idle.notify_waiters();
        lost
    }

    pub(crate) fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.items.is_empty() && state.in_flight == 0
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }

            notified.await;
        }
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> Vec<IndexCommand> {
        self.state.lock().items.iter().cloned().collect()
    }
}
