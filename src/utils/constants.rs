//! Shared configuration constants for search index synchronization
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default search server port
///
/// Jetty's default port, which is where a stock Solr install listens.
pub const DEFAULT_SEARCH_PORT: u16 = 8983;

/// Default path prefix of the search core
///
/// The update and select endpoints are resolved below this prefix:
/// `{prefix}/update?commit=true` and `{prefix}/select`.
pub const DEFAULT_PATH_PREFIX: &str = "/solr";

/// Per-attempt transport timeout: 10 seconds
///
/// Bounds every request to the search server. A timed-out command is
/// dropped (and counted) rather than retried indefinitely, so a down index
/// server cannot pile up work inside the process.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of queued index commands before back-pressure applies
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Number of dispatch workers draining the queue
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Maximum commands a worker takes from the queue in one pass
///
/// Commands in the same pass are deduplicated by identity before sending.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Automatic retries per command after a transient failure
///
/// Zero: failed commands are left to the external reconciliation job.
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// How long `shutdown` waits for queued commands to drain
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 5;

/// How long a removal tombstone outlives its delete: 10 minutes
///
/// While present, a tombstone suppresses late upserts for the same
/// identity. Removals whose delete never went out are evicted after the
/// same age.
pub const DEFAULT_TOMBSTONE_TTL_SECS: u64 = 600;

/// Interval between tombstone purge passes
pub const DEFAULT_PURGE_INTERVAL_MS: u64 = 60_000;

/// Content type sent with update commands
pub const UPDATE_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Field every projection carries for the document identity
pub const ID_FIELD: &str = "id";

/// Field every projection carries for the entity kind discriminator
pub const ENTRY_TYPE_FIELD: &str = "entry_type";
