//! Process-start loading of `SearchConfig`
//!
//! Both sources feed the typestate builder so loaded values go through the
//! same validation as programmatic ones.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::builder::{SearchConfigBuilder, WithHost};
use super::types::{BackpressureMode, SearchConfig, UnknownEntryPolicy};

/// On-disk shape; everything except `host` falls back to builder defaults
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: String,
    port: Option<u16>,
    scheme: Option<String>,
    user: Option<String>,
    password: Option<String>,
    path_prefix: Option<String>,
    request_timeout_secs: Option<u64>,
    queue_capacity: Option<usize>,
    backpressure: Option<BackpressureMode>,
    worker_count: Option<usize>,
    batch_size: Option<usize>,
    max_retries: Option<u32>,
    unknown_entry_policy: Option<UnknownEntryPolicy>,
    rows: Option<u32>,
    enabled: Option<bool>,
    tombstone_ttl_secs: Option<u64>,
    purge_interval_ms: Option<u64>,
}

impl ConfigFile {
    fn into_builder(self) -> SearchConfigBuilder<WithHost> {
        let mut builder = SearchConfig::builder().host(self.host);
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(scheme) = self.scheme {
            builder = builder.scheme(scheme);
        }
        builder.user = self.user;
        builder.password = self.password;
        if let Some(prefix) = self.path_prefix {
            builder = builder.path_prefix(prefix);
        }
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.request_timeout_secs(secs);
        }
        if let Some(capacity) = self.queue_capacity {
            builder = builder.queue_capacity(capacity);
        }
        if let Some(mode) = self.backpressure {
            builder = builder.backpressure(mode);
        }
        if let Some(workers) = self.worker_count {
            builder = builder.worker_count(workers);
        }
        if let Some(size) = self.batch_size {
            builder = builder.batch_size(size);
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(policy) = self.unknown_entry_policy {
            builder = builder.unknown_entry_policy(policy);
        }
        if let Some(enabled) = self.enabled {
            builder = builder.enabled(enabled);
        }
        if let Some(secs) = self.tombstone_ttl_secs {
            builder = builder.tombstone_ttl_secs(secs);
        }
        if let Some(millis) = self.purge_interval_ms {
            builder = builder.purge_interval_ms(millis);
        }
        builder.rows(self.rows)
    }
}

impl SearchConfig {
    /// Load from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// the config shape, or fails builder validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search config {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Invalid search config {}", path.display()))
    }

    /// Parse from a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        file.into_builder().build()
    }

    /// Load from `SEARCH_*` environment variables
    ///
    /// `SEARCH_HOST` is required. `SEARCH_PORT`, `SEARCH_USER`,
    /// `SEARCH_PASSWORD`, `SEARCH_PATH_PREFIX`, `SEARCH_TIMEOUT_SECS`,
    /// `SEARCH_WORKERS` and `SEARCH_ENABLED` are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if `SEARCH_HOST` is missing, a numeric variable does
    /// not parse, or the result fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SearchConfig::from_env`] against an arbitrary lookup
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SEARCH_HOST").context("SEARCH_HOST is not set")?;
        let mut builder = SearchConfig::builder().host(host);

        if let Some(port) = lookup("SEARCH_PORT") {
            builder = builder.port(port.parse().context("SEARCH_PORT is not a port number")?);
        }
        builder.user = lookup("SEARCH_USER");
        builder.password = lookup("SEARCH_PASSWORD");
        if let Some(prefix) = lookup("SEARCH_PATH_PREFIX") {
            builder = builder.path_prefix(prefix);
        }
        if let Some(secs) = lookup("SEARCH_TIMEOUT_SECS") {
            builder = builder.request_timeout_secs(
                secs.parse()
                    .context("SEARCH_TIMEOUT_SECS is not a number of seconds")?,
            );
        }
        if let Some(workers) = lookup("SEARCH_WORKERS") {
            builder =
                builder.worker_count(workers.parse().context("SEARCH_WORKERS is not a number")?);
        }
        if let Some(enabled) = lookup("SEARCH_ENABLED") {
            builder = builder.enabled(parse_flag(&enabled));
        }

        builder.build()
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
