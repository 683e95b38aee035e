//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Retry with exponential backoff for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    /// The server answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The retry budget is spent (or the last error was not retryable)
    #[error("Gave up on {url} after {attempts} attempt(s): {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | Timeout, connection, body read | yes |
    /// | HTTP 5xx, 408, 429 | yes |
    /// | Other HTTP 4xx | no |
    /// | Exhausted | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { source, .. } => !source.is_builder() && !source.is_redirect(),
            Self::Status { status, .. } => {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                status.is_server_error()
                    || status == StatusCode::TOO_MANY_REQUESTS
                    || status == StatusCode::REQUEST_TIMEOUT
            }
            Self::Exhausted { .. } => false,
        }
    }

    /// Number of attempts made before this error was returned
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// The URL that was requested
    pub url: String,

    /// HTTP status code (always 2xx)
    pub status_code: u16,

    /// Raw response body
    pub body: String,
}

/// Attempt budget and backoff schedule for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles for every further attempt
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Builds the policy from the `[crawler]` table
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Delay between attempt `attempt` (1-based) and the next one
    ///
    /// `backoff_base * 2^(attempt - 1)`
    ///
    /// ```
    /// use help_harvest::crawler::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy { max_attempts: 4, backoff_base: Duration::from_secs(1) };
    /// assert_eq!(policy.delay_after(1), Duration::from_secs(1));
    /// assert_eq!(policy.delay_after(3), Duration::from_secs(4));
    /// ```
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }
}

/// Runs `op` until it succeeds, fails permanently or spends the budget
///
/// Between attempts `sleep` is awaited with the delay from
/// [`RetryPolicy::delay_after`]. Non-transient errors still count as an
/// attempt and end the loop at once. The terminal error is always
/// [`FetchError::Exhausted`] wrapping the last failure.
///
/// # Arguments
///
/// * `policy` - Attempt budget and backoff base
/// * `url` - The URL being fetched (for logging and the error)
/// * `op` - Produces one attempt
/// * `sleep` - Suspends the caller for the given delay
pub async fn retry_with_backoff<T, Op, Fut, Sleep, SleepFut>(
    policy: &RetryPolicy,
    url: &str,
    mut op: Op,
    mut sleep: Sleep,
) -> Result<T, FetchError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_transient() || attempt >= max_attempts {
            tracing::error!(url, attempt, reason = %error, "Failed to fetch a page, giving up");
            return Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts: attempt,
                last: Box::new(error),
            });
        }

        let delay = policy.delay_after(attempt);
        tracing::warn!(
            url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason = %error,
            "Failed to fetch a page, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use help_harvest::config::UserAgentConfig;
/// use help_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "HelpHarvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a single GET request
///
/// Any non-2xx status is returned as [`FetchError::Status`] before the body
/// is read.
pub async fn fetch_once(client: &Client, url: &str) -> Result<Page, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })?;

    Ok(Page {
        url: url.to_string(),
        status_code: status.as_u16(),
        body,
    })
}

/// HTTP GET with bounded retry and exponential backoff
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from an existing client and retry policy
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Creates a fetcher from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, Duration::from_secs(crawler.timeout_secs))?;
        Ok(Self::new(client, RetryPolicy::from_config(crawler)))
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - A 2xx response and its body
    /// * `Err(FetchError::Exhausted)` - Every allowed attempt failed
    pub async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        retry_with_backoff(
            &self.policy,
            url,
            || fetch_once(&self.client, url),
            tokio::time::sleep,
        )
        .await
    }
}
