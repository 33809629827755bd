//! Runtime helper functions for bounded transport attempts
//!
//! Every attempt is wrapped in a timeout; retries only happen for transient
//! errors and only as many times as the `RetryConfig` allows.

use std::future::Future;
use std::time::Duration;

use super::errors::{RetryConfig, SearchError, SearchResult};

/// Run one attempt bounded by `limit`
pub async fn with_timeout<Fut, T>(limit: Duration, attempt: Fut) -> SearchResult<T>
where
    Fut: Future<Output = SearchResult<T>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout(limit)),
    }
}

/// Retry an operation with configurable retry logic
///
/// With `max_attempts == 0` the operation runs exactly once. Non-transient
/// errors are returned immediately.
pub async fn retry_task<F, Fut, T>(config: &RetryConfig, mut operation: F) -> SearchResult<T>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = SearchResult<T>> + Send,
    T: Send,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if !e.is_transient() {
                    return Err(e);
                }

                if attempt >= config.max_attempts {
                    if config.max_attempts > 0 {
                        tracing::error!(
                            attempts = attempt + 1,
                            error = %e,
                            "Max retry attempts exceeded"
                        );
                    }
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                attempt += 1;

                tracing::warn!(
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient error, retrying after delay"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_no_retry_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: SearchResult<()> = retry_task(&RetryConfig::no_retry(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SearchError::Transport("connection refused".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(SearchError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let config = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(1),
        };
        let result = retry_task(&config, || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SearchError::Timeout(Duration::from_millis(5)))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: SearchResult<()> = retry_task(&RetryConfig::default(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SearchError::HttpStatus {
                    status: 400,
                    body: "bad request".into(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_timeout_maps_elapsed() {
        let limit = Duration::from_millis(10);
        let result: SearchResult<()> = with_timeout(limit, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(SearchError::Timeout(d)) if d == limit));
    }
}
