//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use super::builder::SearchConfigBuilder;
use super::types::{BackpressureMode, UnknownEntryPolicy};

impl<State> SearchConfigBuilder<State> {
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `http` (default) or `https`
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Basic-auth credentials sent with every request
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Path of the search core; trailing slashes are trimmed at build time
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use]
    pub fn backpressure(mut self, mode: BackpressureMode) -> Self {
        self.backpressure = mode;
        self
    }

    #[must_use]
    pub fn worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Retries after a transient transport failure
    ///
    /// Defaults to zero. Anything above zero should stay small: a down
    /// search server turns every retry into another timed-out request.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn unknown_entry_policy(mut self, policy: UnknownEntryPolicy) -> Self {
        self.unknown_entry_policy = policy;
        self
    }

    #[must_use]
    pub fn rows(mut self, rows: Option<u32>) -> Self {
        self.rows = rows;
        self
    }

    /// Initial value of the dispatch toggle
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Age after which removal tombstones are purged
    #[must_use]
    pub fn tombstone_ttl_secs(mut self, secs: u64) -> Self {
        self.tombstone_ttl_secs = secs;
        self
    }

    #[must_use]
    pub fn purge_interval_ms(mut self, millis: u64) -> Self {
        self.purge_interval_ms = millis;
        self
    }
}
