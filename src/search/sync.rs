//! Wiring of the write and read paths from one configuration

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::command::IndexCommand;
use super::dispatch::{
    DispatchChannel, DispatchStatsSnapshot, DispatchWorkers, IndexTransport, SolrHttpTransport,
    SyncSwitch,
};
use super::entity::Indexable;
use super::errors::{SearchError, SearchResult};
use super::lifecycle::LifecycleCoordinator;
use super::query::{EntityStore, QueryFacade, SearchResultSet};
use crate::config::SearchConfig;
use crate::utils::DEFAULT_DRAIN_TIMEOUT_SECS;

/// Everything a host application needs to keep its index in sync
///
/// Owns the dispatch workers; the coordinator and channel are shared
/// handles that can be cloned into model callbacks.
#[derive(Debug)]
pub struct SearchSync<E> {
    config: Arc<SearchConfig>,
    switch: SyncSwitch,
    workers: DispatchWorkers,
    coordinator: Arc<LifecycleCoordinator>,
    purge_task: JoinHandle<()>,
    facade: QueryFacade<E>,
}

impl<E: Indexable + 'static> SearchSync<E> {
    /// Wire everything against the configured HTTP search server
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn start(config: SearchConfig) -> SearchResult<Self> {
        let transport = Arc::new(SolrHttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Wire everything against a caller-supplied transport
    pub fn with_transport(config: SearchConfig, transport: Arc<dyn IndexTransport>) -> Self {
        let config = Arc::new(config);
        let switch = SyncSwitch::new(config.enabled());
        let (workers, channel) = DispatchWorkers::start(&config, transport.clone(), switch.clone());
        let facade = QueryFacade::new(transport, &config);
        let coordinator = Arc::new(LifecycleCoordinator::new(channel));
        let purge_task = coordinator
            .clone()
            .start_purge_task(config.tombstone_ttl(), config.purge_interval());

        tracing::info!(
            base_url = %config.base_url(),
            workers = config.worker_count(),
            enabled = config.enabled(),
            tombstone_ttl_secs = config.tombstone_ttl().as_secs(),
            "Search index sync started"
        );

        Self {
            config,
            switch,
            workers,
            coordinator,
            purge_task,
            facade,
        }
    }

    /// Verify at wiring time that an entity kind projects something
    ///
    /// # Errors
    ///
    /// `UnimplementedProjection` when `sample` projects no fields.
    pub fn check_indexable<I: Indexable + ?Sized>(sample: &I) -> SearchResult<()> {
        IndexCommand::upsert_for(sample).map(|_| ())
    }

    /// Register the store that rehydrates hits of `entry_type`
    ///
    /// # Errors
    ///
    /// `Registration` for an empty or duplicate discriminator.
    pub fn register_store(
        &mut self,
        entry_type: impl Into<String>,
        store: Arc<dyn EntityStore<E>>,
    ) -> SearchResult<()> {
        self.facade.register(entry_type, store)
    }

    /// Check `sample`'s projection and register its store under its
    /// discriminator
    ///
    /// # Errors
    ///
    /// `UnimplementedProjection` or `Registration`.
    pub fn register_entity<I: Indexable + ?Sized>(
        &mut self,
        sample: &I,
        store: Arc<dyn EntityStore<E>>,
    ) -> SearchResult<()> {
        Self::check_indexable(sample)?;
        let entry_type = sample.entry_type();
        if entry_type.trim().is_empty() {
            return Err(SearchError::Registration(
                "entity reports an empty entry type".to_string(),
            ));
        }
        self.register_store(entry_type, store)
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn switch(&self) -> &SyncSwitch {
        &self.switch
    }

    #[must_use]
    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    #[must_use]
    pub fn channel(&self) -> &DispatchChannel {
        self.coordinator.channel()
    }

    #[must_use]
    pub fn facade(&self) -> &QueryFacade<E> {
        &self.facade
    }

    /// See [`QueryFacade::query`]
    ///
    /// # Errors
    ///
    /// Read-path failures are returned as-is.
    pub async fn query(&self, text: &str) -> SearchResult<SearchResultSet<E>> {
        self.facade.query(text).await
    }

    #[must_use]
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.channel().stats()
    }

    /// Stop accepting commands and drain the queue
    ///
    /// Commands still queued after the drain timeout are lost.
    pub async fn shutdown(self) -> DispatchStatsSnapshot {
        self.shutdown_within(Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS))
            .await
    }

    pub async fn shutdown_within(self, drain_timeout: Duration) -> DispatchStatsSnapshot {
        self.purge_task.abort();
        self.workers.shutdown(drain_timeout).await;
        let stats = self.stats();
        tracing::info!(
            sent = stats.sent,
            failed = stats.failed,
            dropped = stats.dropped,
            "Search index sync stopped"
        );
        stats
    }
}

impl<E> Drop for SearchSync<E> {
    fn drop(&mut self) {
        self.purge_task.abort();
    }
}
