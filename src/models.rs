//! Data models for scraped news articles and their images.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsItem`]: One extracted article, the unit handed to downstream consumers
//! - [`ImageRef`]: An image attached to an article, main image first
//! - [`Harvest`]: All articles gathered by a single run
//! - [`ImageStats`]: Aggregate image coverage figures for a run
//!
//! Field names serialize as camelCase (`publishTime`, `isMain`) to match the
//! JSON shape consumed by the API layer.

use serde::{Deserialize, Serialize};

/// Placeholder used when no title selector matched.
pub const UNKNOWN_TITLE: &str = "unknown title";
/// Placeholder used when no publish-time selector matched.
pub const UNKNOWN_TIME: &str = "unknown time";
/// Placeholder used when no reporter selector matched.
pub const UNKNOWN_REPORTER: &str = "unknown reporter";
/// Placeholder used when no body container was found.
pub const UNKNOWN_CONTENT: &str = "unknown content";

/// An image discovered in an article.
///
/// At most one image per article carries `is_main = true`, and when it does
/// it sits at index 0 of [`NewsItem::images`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Absolute image URL.
    pub url: String,
    /// The `alt` attribute, empty when absent.
    #[serde(default)]
    pub alt: String,
    /// The `title` attribute, empty when absent.
    #[serde(default)]
    pub title: String,
    /// Whether this is the article's header image.
    #[serde(default)]
    pub is_main: bool,
}

/// A single scraped news article.
///
/// Every field is always present; extraction misses are represented by the
/// `UNKNOWN_*` sentinels rather than by absence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub publish_time: String,
    pub reporter: String,
    pub content: String,
    /// The article URL; unique across a run's results.
    pub url: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl NewsItem {
    /// Whether the minimum viable fields (title and body) were extracted.
    ///
    /// Items failing this check are never emitted by the pipeline.
    pub fn is_viable(&self) -> bool {
        self.title != UNKNOWN_TITLE
            && !self.title.is_empty()
            && self.content != UNKNOWN_CONTENT
            && !self.content.is_empty()
    }

    /// The header image, if one was found.
    pub fn main_image(&self) -> Option<&ImageRef> {
        self.images.first().filter(|img| img.is_main)
    }
}

/// The articles collected by one run of the scraper.
#[derive(Debug, Deserialize, Serialize)]
pub struct Harvest {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local wall-clock time of the run in `HH:MM:SS` format.
    pub local_time: String,
    /// The listing page the article URLs were discovered on.
    pub source: String,
    /// Image figures over `articles`, filled in by [`Harvest::new`].
    pub image_stats: ImageStats,
    pub articles: Vec<NewsItem>,
}

impl Harvest {
    /// Bundle a run's articles together with their image statistics.
    ///
    /// # Arguments
    ///
    /// * `local_date` - Run date, `YYYY-MM-DD`
    /// * `local_time` - Run time, `HH:MM:SS`
    /// * `source` - The listing page URL
    /// * `articles` - The emitted records, in output order
    pub fn new(local_date: String, local_time: String, source: String, articles: Vec<NewsItem>) -> Self {
        Self {
            local_date,
            local_time,
            source,
            image_stats: ImageStats::from_items(&articles),
            articles,
        }
    }
}

/// Aggregate image figures for a set of articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageStats {
    pub total_articles: usize,
    pub articles_with_images: usize,
    pub total_images: usize,
    pub main_images: usize,
}

impl ImageStats {
    pub fn from_items(items: &[NewsItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_articles += 1;
            if !item.images.is_empty() {
                acc.articles_with_images += 1;
            }
            acc.total_images += item.images.len();
            if item.main_image().is_some() {
                acc.main_images += 1;
            }
            acc
        })
    }

    /// Percentage of articles carrying at least one image.
    pub fn coverage(&self) -> f64 {
        if self.total_articles == 0 {
            return 0.0;
        }
        self.articles_with_images as f64 * 100.0 / self.total_articles as f64
    }

    pub fn average_per_article(&self) -> f64 {
        if self.total_articles == 0 {
            return 0.0;
        }
        self.total_images as f64 / self.total_articles as f64
    }
}
