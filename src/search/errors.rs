//! Error types for search index synchronization
//!
//! Write-path errors (transport, timeout, HTTP status) are recovered inside
//! the dispatch workers and only ever logged. Read-path errors are returned
//! to the query caller.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Error types for search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Entity claims the indexable capability but projects no fields
    #[error("Entity type '{entry_type}' does not provide a search projection")]
    UnimplementedProjection { entry_type: String },

    /// Network failure talking to the search server
    #[error("Search server transport error: {0}")]
    Transport(String),

    /// Transport attempt exceeded its time bound
    #[error("Search server request timed out after {0:?}")]
    Timeout(Duration),

    /// Search server answered with a non-success status
    #[error("Search server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Query response was not the expected JSON shape
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    /// Hit discriminator does not map to a registered entity kind
    #[error("Unknown entry type in search results: '{0}'")]
    UnknownEntryType(String),

    /// Primary store lookup failed during rehydration
    #[error("Primary store lookup for '{entry_type}' failed: {message}")]
    Store { entry_type: String, message: String },

    /// Wiring-time configuration mistake
    #[error("Search registration failed: {0}")]
    Registration(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            SearchError::HttpStatus {
                status: status.as_u16(),
                body: error.to_string(),
            }
        } else {
            SearchError::Transport(error.to_string())
        }
    }
}

impl SearchError {
    /// Check if error is transient and should be retried
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::Transport(_) | SearchError::Timeout(_) => true,
            SearchError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

}

/// Retry configuration for transport attempts
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one
    pub max_attempts: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum retry delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// A policy that makes exactly one attempt
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Calculate delay for given attempt number (0-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (self.initial_delay.as_millis() as f64 * multiplier) as u64;
        let delay = Duration::from_millis(delay_ms);

        if delay > self.max_delay {
            self.max_delay
        } else {
            delay
        }
    }
}

/// Helper macro for logging search operations with performance metrics
#[macro_export]
macro_rules! log_search_operation {
    ($op:expr, $query:expr) => {{
        let start = std::time::Instant::now();
        let result = $op;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    query = %$query,
                    duration_ms = duration.as_millis(),
                    "Search operation completed successfully"
                );
            }
            Err(e) => {
                tracing::error!(
                    query = %$query,
                    duration_ms = duration.as_millis(),
                    error = %e,
                    "Search operation failed"
                );
            }
        }

        result
    }};
}
