//! Runtime configuration for the scraper.
//!
//! Defaults target the UDN money section. Any subset of fields can be
//! overridden from a YAML file passed with `--config`:
//!
//! ```yaml
//! index_url: https://money.udn.com/money/index
//! article_prefix: https://money.udn.com/money/story
//! max_articles: 5
//! pacing_delay_ms: 3000
//! selectors:
//!   title: ["h1.article-head__title", "h1.story-title"]
//! ```

use crate::error::ScrapeError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7";

/// Settings for one scraper run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listing page scanned for article links.
    pub index_url: String,
    /// Resolved links must start with this to count as articles.
    pub article_prefix: String,
    /// Origin that root-relative image paths resolve against.
    pub site_origin: String,
    pub max_articles: usize,
    pub request_timeout_secs: u64,
    /// Total attempts per article, including the first.
    pub max_attempts: usize,
    pub retry_delay_ms: u64,
    /// Fixed pause between consecutive article fetches.
    pub pacing_delay_ms: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub selectors: SelectorConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            index_url: "https://money.udn.com/money/index".to_string(),
            article_prefix: "https://money.udn.com/money/story".to_string(),
            site_origin: "https://money.udn.com".to_string(),
            max_articles: 10,
            request_timeout_secs: 15,
            max_attempts: 3,
            retry_delay_ms: 2000,
            pacing_delay_ms: 2000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Load a config file, filling unspecified fields with defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&raw)?;
        info!(index_url = %config.index_url, max_articles = config.max_articles, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ScrapeError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

/// Ordered CSS selector fallbacks for each extracted field.
///
/// The first selector matching any element wins; later entries cover older
/// page layouts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: Vec<String>,
    pub time: Vec<String>,
    pub reporter: Vec<String>,
    pub body: Vec<String>,
    /// Containers holding the article's header image.
    pub header_image: Vec<String>,
    /// Attributes checked, in order, for an image's source URL.
    pub image_source_attrs: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: strings(&["h1.article-head__title", "h1.story_art_title", "h1.article-title"]),
            time: strings(&["time.article-body__time", "div.shareBar__info--author span", "span.story-time"]),
            reporter: strings(&["div.article-body__info", "div.shareBar__info--author", "span.story-author"]),
            body: strings(&["section.article-body__editor", "div#article_body", "div.story-body"]),
            header_image: strings(&["figure.article-image", "div.article-head__image", "figure.photo_center"]),
            image_source_attrs: strings(&["src", "data-src", "data-original", "data-lazy-src"]),
        }
    }
}
