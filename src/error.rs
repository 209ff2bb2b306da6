//! Error and per-article outcome types.
//!
//! [`ScrapeError`] covers everything that can go wrong while talking to the
//! site or preparing a run. Single-article failures never escape the
//! pipeline as errors; they are reported as [`ArticleOutcome::Skipped`].

use crate::models::NewsItem;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Timeout, connection reset, DNS failure and other transport faults.
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid CSS selector `{0}`")]
    Selector(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Only transport-level faults are worth retrying; an HTTP error status
    /// means the server answered and will likely answer the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::Transport { .. })
    }
}

/// Why an article produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page could not be retrieved after all attempts.
    Fetch(String),
    /// The server answered with a non-2xx status.
    HttpStatus(u16),
    /// The page was fetched but could not be processed.
    Processing(String),
    /// Title or body could not be extracted.
    MissingFields,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch failed: {e}"),
            SkipReason::HttpStatus(status) => write!(f, "HTTP status {status}"),
            SkipReason::Processing(e) => write!(f, "processing failed: {e}"),
            SkipReason::MissingFields => f.write_str("title or content missing"),
        }
    }
}

impl From<&ScrapeError> for SkipReason {
    fn from(err: &ScrapeError) -> Self {
        match err {
            ScrapeError::HttpStatus { status, .. } => SkipReason::HttpStatus(*status),
            other => SkipReason::Fetch(other.to_string()),
        }
    }
}

/// The result of processing one article URL.
#[derive(Debug)]
pub enum ArticleOutcome {
    Emitted(NewsItem),
    Skipped { url: String, reason: SkipReason },
}
