//! Retry utilities with exponential backoff for resilient API calls.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Default configuration with a different attempt budget
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Rate limit exceeded (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Request timeout
    Timeout,
}

impl TransientError {
    /// Classify a SourceError; `None` means permanent.
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(msg) => {
                if msg.contains("timed out") || msg.contains("timeout") {
                    Some(TransientError::Timeout)
                } else {
                    Some(TransientError::Network)
                }
            }
            SourceError::Api(msg) => {
                if msg.contains("429") {
                    Some(TransientError::RateLimit)
                } else if msg.contains("500")
                    || msg.contains("502")
                    || msg.contains("503")
                    || msg.contains("504")
                {
                    Some(TransientError::ServerError)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Execute an async operation, retrying transient failures with exponential
/// backoff.
///
/// Permanent errors return immediately; transient errors are retried until
/// the attempt budget is spent, then the last error is returned.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::from_source_error(&error) else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    tracing::warn!("Operation failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                let exp_delay = config.initial_delay.as_secs_f64()
                    * config.backoff_multiplier.powi(attempts as i32 - 1);
                let delay =
                    Duration::from_secs_f64(exp_delay.min(config.max_delay.as_secs_f64()));

                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );

                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = {
            let calls = Arc::clone(&calls);
            with_retry(fast_config(), move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("success")
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = {
            let calls = Arc::clone(&calls);
            with_retry(fast_config(), move || {
                let calls = Arc::clone(&calls);
                async move {
                    let count = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(SourceError::Network("connection reset".to_string()))
                    } else {
                        Ok("success")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_permanent_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<&str, SourceError> = {
            let calls = Arc::clone(&calls);
            with_retry(fast_config(), move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SourceError::Parse("invalid json".to_string()))
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SourceError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<&str, SourceError> = {
            let calls = Arc::clone(&calls);
            with_retry(fast_config(), move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(SourceError::Api("ESearch returned status: 503".to_string()))
                }
            })
        }
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_transient_classification() {
        assert_eq!(
            TransientError::from_source_error(&SourceError::Network("refused".into())),
            Some(TransientError::Network)
        );
        assert_eq!(
            TransientError::from_source_error(&SourceError::Api(
                "ESummary returned status: 429 Too Many Requests".into()
            )),
            Some(TransientError::RateLimit)
        );
        assert_eq!(
            TransientError::from_source_error(&SourceError::Api(
                "EFetch returned status: 503 Service Unavailable".into()
            )),
            Some(TransientError::ServerError)
        );
        assert_eq!(
            TransientError::from_source_error(&SourceError::Parse("bad xml".into())),
            None
        );
        assert_eq!(
            TransientError::from_source_error(&SourceError::Api(
                "ESearch returned status: 404 Not Found".into()
            )),
            None
        );
    }
}
