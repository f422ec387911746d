//! Outbound HTTP with fixed-count retry and linear backoff.
//!
//! Every feed and API request goes through [`HttpFetcher::get_text`] or
//! [`HttpFetcher::get_json`]. A failure is anything that stops us from getting
//! a complete 2xx body: a network error, a timeout, a non-success status or a
//! body that breaks off.
//!
//! # Retry Strategy
//!
//! - Up to `max_attempts` attempts (3 by default)
//! - Linear backoff: after attempt `n` fails, wait `n * base_delay` (1s, 2s, ...)
//! - The last failure is returned to the caller, which decides whether it is
//!   fatal or degrades to an empty result

use crate::config::HttpConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// `Accept` header sent with feed requests.
pub const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml; q=0.1";

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.base_delay
            .saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `label` only feeds the retry log lines.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, Box<dyn Error>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Box<dyn Error>>>,
{
    let total_t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts => {
                error!(
                    %label,
                    attempt,
                    max = policy.max_attempts,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %e,
                    "Exhausted retries"
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    %label,
                    attempt,
                    max = policy.max_attempts,
                    ?delay,
                    error = %e,
                    "Request failed; retrying"
                );
                sleep(delay).await;
            }
        }
    }
}

/// Shared HTTP client plus the retry policy applied to it.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            policy: RetryPolicy::from(config),
        })
    }

    /// Underlying client, shared with the LLM client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `url` with the given extra headers and read the body as text,
    /// retrying per the policy. A body that breaks off mid-stream counts as a
    /// failed attempt like any other.
    #[instrument(level = "debug", skip(self, headers))]
    pub async fn get_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, Box<dyn Error>> {
        let body =
            retry_with_backoff(self.policy, url, || self.read_text(url, headers, None)).await?;
        debug!(%url, bytes = body.len(), "Fetched body");
        Ok(body)
    }

    /// GET `url` and decode the body as JSON, retrying per the policy.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Box<dyn Error>> {
        retry_with_backoff(self.policy, url, || self.read_json(url)).await
    }

    /// Single best-effort GET with its own timeout and no retry.
    pub async fn get_text_once(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<String, Box<dyn Error>> {
        self.read_text(url, &[], Some(timeout)).await
    }

    async fn read_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<String, Box<dyn Error>> {
        let resp = self.send_once(url, headers, timeout).await?;
        Ok(resp.text().await?)
    }

    async fn read_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Box<dyn Error>> {
        let resp = self.send_once(url, &[], None).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_once(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<Response, Box<dyn Error>> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request.send().await?.error_for_status()?;
        Ok(resp)
    }
}
