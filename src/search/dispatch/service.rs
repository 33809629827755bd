//! Background worker pool delivering index commands
//!
//! A fixed number of tokio tasks drain the shared queue in batches,
//! collapse each batch to the latest command per identity, and deliver the
//! survivors one by one. Delivery failures are logged and counted, never
//! returned.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::{AbortHandle, JoinHandle};

use super::channel::DispatchChannel;
use super::queue::{CommandBatch, CommandQueue};
use super::stats::DispatchStats;
use super::switch::SyncSwitch;
use super::transport::IndexTransport;
use crate::config::SearchConfig;
use crate::search::command::IndexCommand;
use crate::search::errors::{RetryConfig, SearchResult};
use crate::search::entity::EntityId;
use crate::search::runtime_helpers::{retry_task, with_timeout};

/// Delivery settings each worker reads
#[derive(Debug, Clone)]
struct WorkerSettings {
    batch_size: usize,
    request_timeout: Duration,
    retry: RetryConfig,
}

/// Fixed pool of dispatch workers
pub struct DispatchWorkers {
    queue: Arc<CommandQueue>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    aborts: Vec<AbortHandle>,
    running: Arc<AtomicUsize>,
    stopped: AtomicBool,
    stats: Arc<DispatchStats>,
}

impl std::fmt::Debug for DispatchWorkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchWorkers")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl DispatchWorkers {
    /// Spawn the worker pool and return it with the caller-side channel
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &SearchConfig,
        transport: Arc<dyn IndexTransport>,
        switch: SyncSwitch,
    ) -> (DispatchWorkers, DispatchChannel) {
        let queue = Arc::new(CommandQueue::new(
            config.queue_capacity(),
            config.backpressure(),
        ));
        let stats = Arc::new(DispatchStats::new());
        let running = Arc::new(AtomicUsize::new(0));
        let settings = WorkerSettings {
            batch_size: config.batch_size(),
            request_timeout: config.request_timeout(),
            retry: config.retry_config(),
        };

        let mut handles = Vec::with_capacity(config.worker_count());
        for worker_id in 0..config.worker_count() {
            let worker_queue = queue.clone();
            let worker_transport = transport.clone();
            let worker_stats = stats.clone();
            let worker_running = running.clone();
            let worker_settings = settings.clone();

            worker_running.fetch_add(1, Ordering::Relaxed);
            handles.push(tokio::spawn(async move {
                Self::worker_loop(
                    worker_id,
                    worker_queue,
                    worker_transport,
                    worker_stats,
                    worker_settings,
                )
                .await;
                worker_running.fetch_sub(1, Ordering::Relaxed);
            }));
        }

        tracing::info!(
            workers = config.worker_count(),
            capacity = config.queue_capacity(),
            backpressure = ?config.backpressure(),
            endpoint = %config.base_url(),
            "Search dispatch workers started"
        );

        let aborts = handles.iter().map(JoinHandle::abort_handle).collect();
        let workers = DispatchWorkers {
            queue: queue.clone(),
            handles: Mutex::new(handles),
            aborts,
            running,
            stopped: AtomicBool::new(false),
            stats: stats.clone(),
        };
        let channel = DispatchChannel {
            queue,
            switch,
            stats,
        };

        (workers, channel)
    }

    async fn worker_loop(
        worker_id: usize,
        queue: Arc<CommandQueue>,
        transport: Arc<dyn IndexTransport>,
        stats: Arc<DispatchStats>,
        settings: WorkerSettings,
    ) {
        while let Some(batch) = queue.pop_batch(settings.batch_size).await {
            let taken = batch.len();
            let (commands, superseded) = dedup_latest(batch);
            if superseded > 0 {
                stats.deduplicated.fetch_add(superseded, Ordering::Relaxed);
                tracing::debug!(worker_id, superseded, "Collapsed superseded index commands");
            }

            for command in commands {
                let delivered =
                    Self::deliver(transport.as_ref(), &command, &settings).await;
                match delivered {
                    Ok(()) => {
                        stats.sent.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(
                            worker_id,
                            entity_id = %command.id(),
                            kind = %command.kind(),
                            error = %e,
                            "Index command delivery failed, index may lag until the next resync"
                        );
                    }
                }
            }

            // Saturating: an aborted drain may already have zeroed it
            let _ = stats
                .pending
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |pending| {
                    Some(pending.saturating_sub(taken))
                });
            queue.complete(taken);
        }

        tracing::debug!(worker_id, "Search dispatch worker stopped");
    }

    async fn deliver(
        transport: &dyn IndexTransport,
        command: &IndexCommand,
        settings: &WorkerSettings,
    ) -> SearchResult<()> {
        let body = command.to_xml();
        let start = Instant::now();

        let result = retry_task(&settings.retry, || {
            with_timeout(settings.request_timeout, transport.post_update(body.clone()))
        })
        .await;

        if result.is_ok() {
            tracing::debug!(
                entity_id = %command.id(),
                kind = %command.kind(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Index command delivered"
            );
        }
        result
    }

    /// Number of worker tasks still running
    #[must_use]
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running() > 0
    }

    /// Stop accepting commands and let the workers drain the queue
    ///
    /// Workers still busy after `drain_timeout` are aborted; their commands
    /// are lost, which the reconciliation job tolerates.
    pub async fn shutdown(&self, drain_timeout: Duration) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.queue.close();

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
        let drained =
            tokio::time::timeout(drain_timeout, futures::future::join_all(handles)).await;

        match drained {
            Ok(_) => tracing::info!("Search dispatch workers drained and stopped"),
            Err(_) => {
                for abort in &self.aborts {
                    abort.abort();
                }
                let lost = self.queue.abandon();
                self.stats.pending.store(0, Ordering::Relaxed);
                self.stats.dropped.fetch_add(lost, Ordering::Relaxed);
                tracing::warn!(
                    lost,
                    timeout_ms = drain_timeout.as_millis() as u64,
                    "Search dispatch drain timed out, aborting workers"
                );
            }
        }
    }
}

impl Drop for DispatchWorkers {
    fn drop(&mut self) {
        if !self.stopped.load(Ordering::Acquire) {
            self.queue.close();
        }
    }
}

/// Keep only the last command per identity, preserving relative order
///
/// Identities are global across entity kinds, matching the index's unique
/// key, so the kind plays no part here. Returns the surviving commands and
/// the number superseded.
pub(crate) fn dedup_latest(mut batch: CommandBatch) -> (CommandBatch, usize) {
    let mut last_index: ahash::AHashMap<EntityId, usize> =
        ahash::AHashMap::with_capacity(batch.len());

    for (idx, command) in batch.iter().enumerate() {
        last_index.insert(command.id().clone(), idx);
    }

    let before = batch.len();
    let survivors: CommandBatch = batch
        .drain(..)
        .enumerate()
        .filter_map(|(idx, command)| {
            if last_index.get(command.id()) == Some(&idx) {
                Some(command)
            } else {
                None
            }
        })
        .collect();
    let superseded = before - survivors.len();

    (survivors, superseded)
}
