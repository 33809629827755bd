//! Core configuration types for search index synchronization
//!
//! This module contains the main `SearchConfig` struct and the policy enums
//! that tune dispatch and query behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy for a full dispatch queue
///
/// Callers are never blocked, so the choice is only which command is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressureMode {
    /// Evict the oldest queued command to make room (default)
    #[default]
    DropOldest,

    /// Discard the incoming command
    DropNewest,
}

/// What a query does with a hit whose discriminator has no registered store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEntryPolicy {
    /// Log and leave the group out of the result set (default)
    #[default]
    Skip,

    /// Fail the query with `UnknownEntryType`
    Fail,
}

/// Search server connection and dispatch settings
///
/// Loaded once at process start and shared as `Arc<SearchConfig>`; there is
/// no runtime reconfiguration path. Serializing omits the password.
#[derive(Clone, Serialize)]
pub struct SearchConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) scheme: String,

    /// Basic-auth user; credentials are only sent when this is set
    pub(crate) user: Option<String>,
    #[serde(skip_serializing)]
    pub(crate) password: Option<String>,

    /// Path of the search core, e.g. `/solr`
    pub(crate) path_prefix: String,

    /// Time bound for each transport attempt
    pub(crate) request_timeout_secs: u64,

    /// Bounded queue size before back-pressure applies
    pub(crate) queue_capacity: usize,
    pub(crate) backpressure: BackpressureMode,

    /// Fixed size of the dispatch worker pool
    pub(crate) worker_count: usize,

    /// Maximum commands taken per worker pass
    pub(crate) batch_size: usize,

    /// Automatic retries after a transient failure (0 = none)
    pub(crate) max_retries: u32,

    pub(crate) unknown_entry_policy: UnknownEntryPolicy,

    /// Optional `rows` cap sent with select requests
    pub(crate) rows: Option<u32>,

    /// Initial value of the dispatch toggle
    pub(crate) enabled: bool,

    /// Age at which removal tombstones are purged
    pub(crate) tombstone_ttl_secs: u64,
    pub(crate) purge_interval_ms: u64,
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("path_prefix", &self.path_prefix)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("queue_capacity", &self.queue_capacity)
            .field("backpressure", &self.backpressure)
            .field("worker_count", &self.worker_count)
            .field("batch_size", &self.batch_size)
            .field("max_retries", &self.max_retries)
            .field("unknown_entry_policy", &self.unknown_entry_policy)
            .field("rows", &self.rows)
            .field("enabled", &self.enabled)
            .field("tombstone_ttl_secs", &self.tombstone_ttl_secs)
            .field("purge_interval_ms", &self.purge_interval_ms)
            .finish()
    }
}
