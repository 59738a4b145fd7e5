//! Client for the Weather Fetching Service.
//!
//! Every call goes through `UpstreamClient::get_with_retry`, which retries
//! transient failures with exponential backoff:
//! - connection failures and timeouts
//! - responses with status 500, 502, 503 or 504
//!
//! Anything else (4xx, other 5xx, body errors) fails immediately. Callers only
//! ever see a single [`UpstreamError`]; retry exhaustion is not a distinct
//! outcome beyond its message.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use crate::WeatherReading;

/// Per-attempt timeout for `/analyze` lookups.
pub const ANALYZE_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-attempt timeout for `/health` probes.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// ---

/// Failure talking to, or decoding the answer of, the upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("max retries exceeded for {url}: upstream responded with {status}")]
    RetriesExhaustedStatus { url: String, status: StatusCode },

    #[error("max retries exceeded for {url}: {source}")]
    RetriesExhausted {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream responded with {status} for url: {url}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid weather payload: {0}")]
    Decode(String),
}

/// Explicit retry configuration for upstream calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff base; retry `n` (0-based) waits `backoff * 2^n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

// ---

/// Long-lived handle to the upstream service.
///
/// Built once at startup; cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    // ---
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> reqwest::Result<Self> {
        // ---
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions for `city` (`GET <base>?city=<city>`).
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, UpstreamError> {
        // ---
        tracing::debug!("Fetching weather for {:?} from {}", city, self.base_url);

        let response = self
            .get_with_retry(&[("city", city)], ANALYZE_TIMEOUT)
            .await?;

        let body = response.bytes().await.map_err(|source| UpstreamError::Transport {
            url: self.base_url.clone(),
            source,
        })?;

        serde_json::from_slice::<WeatherReading>(&body).map_err(|e| {
            tracing::debug!("Undecodable upstream body: {}", String::from_utf8_lossy(&body));
            UpstreamError::Decode(e.to_string())
        })
    }

    /// Liveness probe: bare `GET <base>`, any 2xx counts as reachable.
    pub async fn probe(&self) -> Result<(), UpstreamError> {
        // ---
        self.get_with_retry(&[], HEALTH_TIMEOUT).await.map(|_| ())
    }

    /// Issue a GET against the base URL, retrying transient failures.
    ///
    /// Returns the first 2xx response; any other final outcome is an error.
    async fn get_with_retry(
        &self,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Response, UpstreamError> {
        // ---
        let url = &self.base_url;
        let max_retries = self.retry.max_retries;

        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.retry.delay_for_retry(attempt - 1);
                tracing::info!("Retry {} of {}, waiting {:?}", attempt, max_retries, delay);
                tokio::time::sleep(delay).await;
            }

            let mut request = self.http.get(url).timeout(timeout);
            if !query.is_empty() {
                request = request.query(query);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        if attempt > 0 {
                            tracing::info!("Upstream succeeded after {} retries", attempt);
                        }
                        return Ok(response);
                    }

                    if !is_retryable_status(status) {
                        return Err(UpstreamError::Status {
                            url: url.clone(),
                            status,
                        });
                    }

                    if attempt == max_retries {
                        tracing::error!("Upstream still {} after {} retries", status, max_retries);
                        return Err(UpstreamError::RetriesExhaustedStatus {
                            url: url.clone(),
                            status,
                        });
                    }

                    tracing::warn!(
                        "Upstream returned retryable status {}, attempt {} of {}",
                        status,
                        attempt + 1,
                        max_retries + 1
                    );
                }
                Err(source) => {
                    if !is_retryable_error(&source) {
                        return Err(UpstreamError::Transport {
                            url: url.clone(),
                            source,
                        });
                    }

                    if attempt == max_retries {
                        tracing::error!("Upstream unreachable after {} retries: {}", max_retries, source);
                        return Err(UpstreamError::RetriesExhausted {
                            url: url.clone(),
                            source,
                        });
                    }

                    tracing::warn!(
                        "Retryable error on attempt {} of {}: {}",
                        attempt + 1,
                        max_retries + 1,
                        source
                    );
                }
            }

            attempt += 1;
        }
    }
}
