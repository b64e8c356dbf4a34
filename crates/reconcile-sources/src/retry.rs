use crate::http::send_json;
use crate::SourceError;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-count retry with a fixed delay between attempts. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// GET-style request with retry. `build_request` is called once per attempt
/// because a `RequestBuilder` cannot be reused after sending.
///
/// Once every attempt has failed the last error is wrapped in
/// [`SourceError::Exhausted`]; a non-retryable error is returned immediately.
pub async fn fetch_json_with_retry<T, F>(
    service: &str,
    url: &str,
    policy: &RetryPolicy,
    build_request: F,
) -> Result<T, SourceError>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match send_json::<T>(service, url, build_request()).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(service, url, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt < attempts => {
                warn!(
                    service,
                    url,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Attempt {} failed for {}. Retrying in {:?}...",
                    attempt,
                    url,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(SourceError::Exhausted {
                    service: service.to_string(),
                    attempts,
                    last: Box::new(e),
                });
            }
        }
    }
}
