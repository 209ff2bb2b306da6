//! # UDN News Scraper
//!
//! Scrapes the UDN money news section into structured records: title,
//! publish time, reporter, body text and the article's images.
//!
//! ## Usage
//!
//! ```sh
//! udn_news_scraper -j ./json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Indexing**: Discover article URLs on the listing page (one request, no retry)
//! 2. **Fetching**: Download each article, retrying transport faults, pacing between requests
//! 3. **Extraction**: Pull text fields and images out with selector fallback chains
//! 4. **Output**: Print the records as JSON or write a dated JSON file

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod fetcher;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::ScraperConfig;
use models::Harvest;
use outputs::json;
use scrapers::udn::Scraper;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("udn_news_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    let config = args.apply(config);

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let now = Local::now();
    let source = config.index_url.clone();
    let articles = Scraper::new(config)?.run().await;

    let harvest = Harvest::new(
        now.date_naive().to_string(),
        now.format("%H:%M:%S").to_string(),
        source,
        articles,
    );
    let stats = &harvest.image_stats;
    info!(
        articles = stats.total_articles,
        with_images = stats.articles_with_images,
        images = stats.total_images,
        main_images = stats.main_images,
        coverage_pct = stats.coverage(),
        avg_per_article = stats.average_per_article(),
        "Image statistics"
    );

    match &args.json_output_dir {
        Some(dir) => {
            json::write_harvest(&harvest, dir).await?;
        }
        None => println!("{}", json::harvest_to_json(&harvest)?),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
