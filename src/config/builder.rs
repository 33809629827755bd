//! Type-safe builder for `SearchConfig` using the typestate pattern
//!
//! The search host is the only required setting; `build()` is only
//! available once it has been provided.

use crate::utils::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_PATH_PREFIX, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_PURGE_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_PORT,
    DEFAULT_TOMBSTONE_TTL_SECS, DEFAULT_WORKER_COUNT,
};
use anyhow::{Result, bail};
use std::marker::PhantomData;

use super::types::{BackpressureMode, SearchConfig, UnknownEntryPolicy};

// Type states for the builder
pub struct WithHost;

pub struct SearchConfigBuilder<State = ()> {
    pub(crate) host: Option<String>,
    pub(crate) port: u16,
    pub(crate) scheme: String,
    pub(crate) user: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) path_prefix: String,
    pub(crate) request_timeout_secs: u64,
    pub(crate) queue_capacity: usize,
    pub(crate) backpressure: BackpressureMode,
    pub(crate) worker_count: usize,
    pub(crate) batch_size: usize,
    pub(crate) max_retries: u32,
    pub(crate) unknown_entry_policy: UnknownEntryPolicy,
    pub(crate) rows: Option<u32>,
    pub(crate) enabled: bool,
    pub(crate) tombstone_ttl_secs: u64,
    pub(crate) purge_interval_ms: u64,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for SearchConfigBuilder<()> {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SEARCH_PORT,
            scheme: "http".to_string(),
            user: None,
            password: None,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backpressure: BackpressureMode::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            unknown_entry_policy: UnknownEntryPolicy::default(),
            rows: None,
            enabled: true,
            tombstone_ttl_secs: DEFAULT_TOMBSTONE_TTL_SECS,
            purge_interval_ms: DEFAULT_PURGE_INTERVAL_MS,
            _phantom: PhantomData,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> SearchConfigBuilder<()> {
        SearchConfigBuilder::default()
    }
}

impl SearchConfigBuilder<()> {
    pub fn host(self, host: impl Into<String>) -> SearchConfigBuilder<WithHost> {
        SearchConfigBuilder {
            host: Some(host.into()),
            port: self.port,
            scheme: self.scheme,
            user: self.user,
            password: self.password,
            path_prefix: self.path_prefix,
            request_timeout_secs: self.request_timeout_secs,
            queue_capacity: self.queue_capacity,
            backpressure: self.backpressure,
            worker_count: self.worker_count,
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            unknown_entry_policy: self.unknown_entry_policy,
            rows: self.rows,
            enabled: self.enabled,
            tombstone_ttl_secs: self.tombstone_ttl_secs,
            purge_interval_ms: self.purge_interval_ms,
            _phantom: PhantomData,
        }
    }
}

impl SearchConfigBuilder<WithHost> {
    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error for an empty host, a zero port, capacity, worker
    /// count, batch size, timeout or purge interval, or a path prefix not starting with `/`.
    pub fn build(self) -> Result<SearchConfig> {
        let host = self.host.unwrap_or_default().trim().to_string();
        if host.is_empty() {
            bail!("Search host must not be empty");
        }
        if self.port == 0 {
            bail!("Search port must be non-zero");
        }
        if self.scheme != "http" && self.scheme != "https" {
            bail!("Unsupported search scheme '{}'", self.scheme);
        }
        if self.request_timeout_secs == 0 {
            bail!("Request timeout must be at least one second");
        }
        if self.queue_capacity == 0 {
            bail!("Dispatch queue capacity must be non-zero");
        }
        if self.worker_count == 0 {
            bail!("Dispatch worker count must be non-zero");
        }
        if self.batch_size == 0 {
            bail!("Dispatch batch size must be non-zero");
        }
        if self.purge_interval_ms == 0 {
            bail!("Tombstone purge interval must be non-zero");
        }

        let path_prefix = self.path_prefix.trim_end_matches('/').to_string();
        if !path_prefix.is_empty() && !path_prefix.starts_with('/') {
            bail!("Path prefix '{}' must start with '/'", self.path_prefix);
        }

        if self.password.is_some() && self.user.is_none() {
            tracing::warn!("Search password configured without a user; credentials will not be sent");
        }

        Ok(SearchConfig {
            host,
            port: self.port,
            scheme: self.scheme,
            user: self.user,
            password: self.password,
            path_prefix,
            request_timeout_secs: self.request_timeout_secs,
            queue_capacity: self.queue_capacity,
            backpressure: self.backpressure,
            worker_count: self.worker_count,
            batch_size: self.batch_size,
            max_retries: self.max_retries,
            unknown_entry_policy: self.unknown_entry_policy,
            rows: self.rows,
            enabled: self.enabled,
            tombstone_ttl_secs: self.tombstone_ttl_secs,
            purge_interval_ms: self.purge_interval_ms,
        })
    }
}
