//! Getter methods for `SearchConfig`
//!
//! This module provides the accessor methods for retrieving configuration
//! values from a `SearchConfig` instance.

use std::time::Duration;

use super::types::{BackpressureMode, SearchConfig, UnknownEntryPolicy};
use crate::search::errors::RetryConfig;

impl SearchConfig {
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// `scheme://host:port{prefix}` without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme, self.host, self.port, self.path_prefix
        )
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    #[must_use]
    pub fn backpressure(&self) -> BackpressureMode {
        self.backpressure
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Retry policy for transport attempts derived from `max_retries`
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries,
            ..RetryConfig::default()
        }
    }

    #[must_use]
    pub fn unknown_entry_policy(&self) -> UnknownEntryPolicy {
        self.unknown_entry_policy
    }

    #[must_use]
    pub fn rows(&self) -> Option<u32> {
        self.rows
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn tombstone_ttl(&self) -> Duration {
        Duration::from_secs(self.tombstone_ttl_secs)
    }

    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_millis(self.purge_interval_ms)
    }
}
