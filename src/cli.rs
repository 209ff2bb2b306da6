//! Command-line interface definitions for the UDN news scraper.
//!
//! Every option overrides the matching field of the YAML config (or the
//! built-in default when no config file is given).

use crate::config::ScraperConfig;
use clap::Parser;

/// Command-line arguments for the UDN news scraper.
///
/// # Examples
///
/// ```sh
/// # Print the scraped articles as JSON on stdout
/// udn_news_scraper
///
/// # Write a dated JSON file and only scrape five articles
/// udn_news_scraper -j ./json -n 5
///
/// # Use a config file with custom selectors
/// udn_news_scraper -c config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSON file (prints to stdout when omitted)
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing page to discover articles from
    #[arg(long)]
    pub index_url: Option<String>,

    /// Only links starting with this prefix are treated as articles
    #[arg(long)]
    pub article_prefix: Option<String>,

    /// Maximum number of articles to scrape
    #[arg(short = 'n', long)]
    pub max_articles: Option<usize>,

    /// Pause between article requests, in milliseconds
    #[arg(long, env = "UDN_PACING_MS")]
    pub pacing_ms: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply(&self, mut config: ScraperConfig) -> ScraperConfig {
        if let Some(url) = &self.index_url {
            config.index_url = url.clone();
        }
        if let Some(prefix) = &self.article_prefix {
            config.article_prefix = prefix.clone();
        }
        if let Some(max) = self.max_articles {
            config.max_articles = max;
        }
        if let Some(ms) = self.pacing_ms {
            config.pacing_delay_ms = ms;
        }
        config
    }
}
