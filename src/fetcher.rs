//! Page retrieval with a browser-like HTTP client and fixed-delay retries.
//!
//! The site rejects bare programmatic clients, so every request carries a
//! desktop browser `User-Agent` together with realistic `Accept` and
//! `Accept-Language` headers.
//!
//! # Architecture
//!
//! - [`PageSource`]: Core trait for fetching a page body by URL
//! - [`HttpPageSource`]: `reqwest`-backed implementation sharing one client
//! - [`RetryFetch`]: Decorator that retries transient faults of any `PageSource`
//!
//! # Retry Strategy
//!
//! - At most `max_attempts` attempts in total (3 by default)
//! - Fixed pause between attempts (2 seconds by default)
//! - Only transport faults are retried; HTTP error statuses fail immediately

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Something that can turn a URL into an HTML document.
pub trait PageSource {
    /// Fetch the page at `url` and return its body as text.
    async fn get_page(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Build the HTTP client shared by every request of a run.
pub fn build_client(config: &ScraperConfig) -> Result<reqwest::Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {e}")))
}

fn header_value(value: &str) -> Result<HeaderValue, ScrapeError> {
    HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::Config(format!("invalid header value {value:?}: {e}")))
}

/// [`PageSource`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpPageSource {
    #[instrument(level = "debug", skip(self))]
    async fn get_page(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let transport = |source| ScrapeError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success HTTP status");
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(
            %url,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that retries transient faults of any [`PageSource`] with a fixed delay.
pub struct RetryFetch<T> {
    inner: T,
    /// Total attempts, including the first.
    max_attempts: usize,
    delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: PageSource,
{
    pub fn new(inner: T, max_attempts: usize, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// The undecorated source, for requests that must not be retried.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

impl<T> PageSource for RetryFetch<T>
where
    T: PageSource,
{
    #[instrument(level = "info", skip(self))]
    async fn get_page(&self, url: &str) -> Result<String, ScrapeError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            match self.inner.get_page(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    let total_ms = total_t0.elapsed().as_millis() as u64;
                    if attempt >= self.max_attempts {
                        error!(
                            attempt,
                            max = self.max_attempts,
                            elapsed_ms_total = total_ms,
                            error = %e,
                            "get_page() exhausted retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_total = total_ms,
                        delay = ?self.delay,
                        error = %e,
                        "get_page() attempt failed; retrying"
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}
