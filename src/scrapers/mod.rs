//! News source scrapers.
//!
//! Each scraper follows the same two-phase pattern:
//!
//! 1. **Indexing**: Discover article URLs from the source's listing page
//! 2. **Fetching**: Download each article and extract a [`NewsItem`](crate::models::NewsItem)
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | UDN Money | [`udn`] | HTML scraping | Browser headers required; paced, sequential fetches |
//!
//! Failed article fetches are logged and skipped; a run never fails because
//! of a single article.

pub mod udn;
