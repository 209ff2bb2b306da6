//! UDN money section scraper.
//!
//! The listing page at `https://money.udn.com/money/index` links to stories
//! under `https://money.udn.com/money/story/...`. Each story is fetched with a
//! retrying client, one at a time with a fixed pause in between to stay under
//! the site's rate limiting.
//!
//! # URL Pattern
//!
//! Links are resolved against the listing URL and kept when the absolute form
//! starts with the configured article prefix, e.g.
//! `https://money.udn.com/money/story/5599/8000001`.

use crate::config::ScraperConfig;
use crate::error::{ArticleOutcome, ScrapeError, SkipReason};
use crate::extract::fields::extract_fields;
use crate::extract::images::{ImageContext, extract_images};
use crate::extract::ArticleSelectors;
use crate::fetcher::{HttpPageSource, PageSource, RetryFetch, build_client};
use crate::models::NewsItem;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Extract article URLs from a listing page.
///
/// Links are resolved against `base_url`, kept when they start with
/// `prefix`, de-duplicated keeping the first occurrence, and capped at `max`.
///
/// # Arguments
///
/// * `html` - The listing page markup
/// * `base_url` - URL the listing page was fetched from
/// * `prefix` - Absolute URL prefix identifying article pages
/// * `max` - Upper bound on the number of URLs returned
///
/// # Returns
///
/// Up to `max` unique article URLs in page order; empty when nothing matches.
pub fn discover_article_urls(html: &str, base_url: &Url, prefix: &str, max: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base_url.join(href.trim()).ok())
        .map(String::from)
        .filter(|url| url.starts_with(prefix))
        .unique()
        .take(max)
        .collect()
}

/// One scraper run: owns the HTTP client for its lifetime.
///
/// [`Scraper::run`] consumes the scraper, so the client and its pooled
/// connections are released when the run finishes, whichever way it ends.
pub struct Scraper<S = HttpPageSource> {
    config: ScraperConfig,
    selectors: ArticleSelectors,
    site_origin: Url,
    source: RetryFetch<S>,
}

impl Scraper<HttpPageSource> {
    /// Build a scraper with a fresh browser-like HTTP client.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let client = build_client(&config)?;
        Self::with_source(config, HttpPageSource::new(client))
    }
}

impl<S> Scraper<S>
where
    S: PageSource,
{
    pub fn with_source(config: ScraperConfig, source: S) -> Result<Self, ScrapeError> {
        let selectors = ArticleSelectors::compile(&config.selectors)?;
        let site_origin = Url::parse(&config.site_origin)?;
        let source = RetryFetch::new(source, config.max_attempts, config.retry_delay());
        Ok(Self {
            config,
            selectors,
            site_origin,
            source,
        })
    }

    /// Discover and scrape articles, returning every viable record.
    ///
    /// Consumes the scraper, releasing the HTTP client when the run ends.
    ///
    /// # Returns
    ///
    /// The emitted [`NewsItem`]s in discovery order. Never fails: an
    /// unreachable listing page yields an empty list, and failing articles
    /// are logged and left out.
    #[instrument(level = "info", skip_all, fields(index_url = %self.config.index_url))]
    pub async fn run(self) -> Vec<NewsItem> {
        let urls = match self.index_articles().await {
            Ok(urls) => urls,
            Err(e) => {
                error!(error = %e, "Indexing failed; nothing to scrape");
                return Vec::new();
            }
        };
        if urls.is_empty() {
            warn!("No article links found on listing page");
            return Vec::new();
        }
        self.fetch_articles(urls).await
    }

    /// Fetch the listing page once, without retries, and collect article URLs.
    #[instrument(level = "info", skip_all)]
    pub async fn index_articles(&self) -> Result<Vec<String>, ScrapeError> {
        let base_url = Url::parse(&self.config.index_url)?;
        let html = self.source.inner().get_page(base_url.as_str()).await?;
        let urls = discover_article_urls(
            &html,
            &base_url,
            &self.config.article_prefix,
            self.config.max_articles,
        );

        info!(
            count = urls.len(),
            source = %self.config.index_url,
            "Indexed UDN article URLs"
        );
        debug!(urls = ?urls, "UDN URLs");
        Ok(urls)
    }

    /// Fetch articles sequentially, pausing between consecutive requests.
    ///
    /// Output order follows `urls`.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch_articles(&self, urls: Vec<String>) -> Vec<NewsItem> {
        let total = urls.len();
        let pacing = self.config.pacing_delay();

        let items: Vec<NewsItem> = stream::iter(urls.into_iter().enumerate())
            .then(|(i, url)| async move {
                let outcome = self.fetch_article(&url).await;
                if i + 1 < total && !pacing.is_zero() {
                    sleep(pacing).await;
                }
                outcome
            })
            .filter_map(|outcome| {
                std::future::ready(match outcome {
                    ArticleOutcome::Emitted(item) => {
                        info!(url = %item.url, title = %item.title, images = item.images.len(), "Scraped UDN article");
                        Some(item)
                    }
                    ArticleOutcome::Skipped { url, reason } => {
                        warn!(%url, %reason, "Skipping UDN article");
                        None
                    }
                })
            })
            .collect()
            .await;

        info!(requested = total, scraped = items.len(), "Fetched UDN article contents");
        items
    }

    /// Fetch and process a single article.
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, url: &str) -> ArticleOutcome {
        match self.source.get_page(url).await {
            Ok(html) => self.process_article(&html, url),
            Err(e) => {
                error!(error = %e, "UDN fetch failed");
                ArticleOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::from(&e),
                }
            }
        }
    }

    /// Turn a fetched article page into a record, or explain why not.
    pub fn process_article(&self, html: &str, url: &str) -> ArticleOutcome {
        let article_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return ArticleOutcome::Skipped {
                    url: url.to_string(),
                    reason: SkipReason::Processing(e.to_string()),
                };
            }
        };

        let document = Html::parse_document(html);
        let fields = extract_fields(&document, &self.selectors);
        let context = ImageContext {
            site_origin: &self.site_origin,
            article_url: &article_url,
            source_attrs: &self.selectors.image_source_attrs,
        };
        let images = extract_images(&document, &self.selectors, &context);

        let item = NewsItem {
            title: fields.title,
            publish_time: fields.publish_time,
            reporter: fields.reporter,
            content: fields.content,
            url: url.to_string(),
            images,
        };
        debug!(
            %url,
            content_preview = %truncate_for_log(&item.content, 120),
            "Parsed UDN article"
        );

        if item.is_viable() {
            ArticleOutcome::Emitted(item)
        } else {
            ArticleOutcome::Skipped {
                url: item.url,
                reason: SkipReason::MissingFields,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::{Reply, ScriptedSource};
    use std::collections::HashSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = "https://money.udn.com/money/index";

    fn story(n: u32) -> String {
        format!("https://money.udn.com/money/story/5599/{n}")
    }

    fn test_config() -> ScraperConfig {
        ScraperConfig {
            retry_delay_ms: 0,
            pacing_delay_ms: 0,
            ..ScraperConfig::default()
        }
    }

    fn article_html(title: &str) -> String {
        format!(
            r#"<html><body>
            <h1 class="article-head__title">{title}</h1>
            <figure class="article-image"><img src="/photo/main.jpg" alt="main"></figure>
            <time class="article-body__time">2026-10-18 10:00</time>
            <div class="article-body__info">記者 陳小華</div>
            <section class="article-body__editor">
                <p>{title} paragraph one.</p>
                <img src="//pgw.udn.com.tw/gw/photo.php?u=x.jpg" width="640" height="480">
                <p>{title} paragraph two.</p>
            </section>
            </body></html>"#
        )
    }

    fn listing_html(hrefs: &[&str]) -> String {
        let links: String = hrefs
            .iter()
            .map(|h| format!(r#"<a href="{h}">link</a>"#))
            .collect();
        format!("<html><body>{links}</body></html>")
    }

    #[test]
    fn test_discover_dedups_and_keeps_page_order() {
        let html = listing_html(&[
            "/money/story/5599/3",
            "https://money.udn.com/money/story/5599/1",
            "/money/story/5599/3",
            "/money/cate/5591",
            "https://udn.com/news/story/7/9",
            "/money/story/5599/2",
            "/money/story/5599/1",
        ]);
        let base = Url::parse(INDEX).unwrap();
        let urls = discover_article_urls(&html, &base, "https://money.udn.com/money/story", 10);

        assert_eq!(urls, vec![story(3), story(1), story(2)]);
    }

    #[test]
    fn test_discover_caps_at_max() {
        let hrefs: Vec<String> = (1..=15).map(|n| format!("/money/story/5599/{n}")).collect();
        let refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
        let base = Url::parse(INDEX).unwrap();
        let urls =
            discover_article_urls(&listing_html(&refs), &base, "https://money.udn.com/money/story", 10);

        assert_eq!(urls.len(), 10);
        assert_eq!(urls[0], story(1));
        assert_eq!(urls[9], story(10));
    }

    #[test]
    fn test_discover_nothing_matching() {
        let base = Url::parse(INDEX).unwrap();
        let urls = discover_article_urls(
            &listing_html(&["/money/cate/1", "#top"]),
            &base,
            "https://money.udn.com/money/story",
            10,
        );
        assert!(urls.is_empty());
    }

    #[test]
    fn test_process_article_emits_record() {
        let scraper = Scraper::with_source(test_config(), ScriptedSource::default()).unwrap();
        let outcome = scraper.process_article(&article_html("台積電"), &story(1));

        let item = match outcome {
            ArticleOutcome::Emitted(item) => item,
            other => panic!("expected a record, got {other:?}"),
        };
        assert_eq!(item.title, "台積電");
        assert_eq!(item.publish_time, "2026-10-18 10:00");
        assert_eq!(item.reporter, "記者 陳小華");
        assert_eq!(item.content, "台積電 paragraph one.\n台積電 paragraph two.");
        assert_eq!(item.url, story(1));
        assert_eq!(item.images.len(), 2);
        assert!(item.images[0].is_main);
        assert_eq!(item.images[0].url, "https://money.udn.com/photo/main.jpg");
        assert_eq!(
            item.images[1].url,
            "https://pgw.udn.com.tw/gw/photo.php?u=x.jpg"
        );
    }

    #[test]
    fn test_process_article_without_title_or_content_is_dropped() {
        let scraper = Scraper::with_source(test_config(), ScriptedSource::default()).unwrap();
        let outcome = scraper.process_article("<html><body><p>hi</p></body></html>", &story(1));
        assert!(matches!(
            outcome,
            ArticleOutcome::Skipped { reason: SkipReason::MissingFields, .. }
        ));
    }

    #[test]
    fn test_process_article_with_title_but_no_content_is_dropped() {
        let scraper = Scraper::with_source(test_config(), ScriptedSource::default()).unwrap();
        let html = r#"<h1 class="article-head__title">Only a title</h1>"#;
        match scraper.process_article(html, &story(1)) {
            ArticleOutcome::Skipped { url, reason } => {
                assert_eq!(url, story(1));
                assert_eq!(reason, SkipReason::MissingFields);
            }
            ArticleOutcome::Emitted(item) => {
                panic!("unexpected record with content {:?}", item.content)
            }
        }
    }

    #[test]
    fn test_invalid_site_origin_is_rejected() {
        let config = ScraperConfig {
            site_origin: "not a url".to_string(),
            ..test_config()
        };
        assert!(matches!(
            Scraper::with_source(config, ScriptedSource::default()),
            Err(ScrapeError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_run_retries_transient_failures() {
        let source = ScriptedSource::default()
            .with(INDEX, Reply::Body(listing_html(&["/money/story/5599/1"])))
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Body(article_html("Recovered")));
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        let items = scraper.run().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Recovered");
    }

    #[tokio::test]
    async fn test_fetch_articles_counts_attempts() {
        let source = ScriptedSource::default()
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Body(article_html("Recovered")));
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        let items = scraper.fetch_articles(vec![story(1)]).await;
        assert_eq!(items.len(), 1);
        assert_eq!(scraper.source.inner().calls_to(&story(1)), 3);
    }

    #[tokio::test]
    async fn test_run_exhausted_retries_yields_nothing() {
        let source = ScriptedSource::default()
            .with(INDEX, Reply::Body(listing_html(&["/money/story/5599/1"])))
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Transport)
            .with(&story(1), Reply::Transport);
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        assert!(scraper.run().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_isolates_article_failures() {
        let source = ScriptedSource::default()
            .with(
                INDEX,
                Reply::Body(listing_html(&[
                    "/money/story/5599/1",
                    "/money/story/5599/2",
                    "/money/story/5599/3",
                    "/money/story/5599/4",
                ])),
            )
            .with(&story(1), Reply::Body(article_html("First")))
            .with(&story(2), Reply::Status(500))
            .with(&story(3), Reply::Body("<html>no structure</html>".to_string()))
            .with(&story(4), Reply::Body(article_html("Fourth")));
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        let items = scraper.run().await;
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Fourth"]);
    }

    #[tokio::test]
    async fn test_http_status_article_is_not_retried() {
        let source = ScriptedSource::default().with(&story(1), Reply::Status(503));
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        assert!(scraper.fetch_articles(vec![story(1)]).await.is_empty());
        assert_eq!(scraper.source.inner().calls_to(&story(1)), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_yields_empty_without_retry() {
        let source = ScriptedSource::default()
            .with(INDEX, Reply::Transport)
            .with(INDEX, Reply::Body(listing_html(&["/money/story/5599/1"])));
        let scraper = Scraper::with_source(test_config(), source).unwrap();

        assert!(scraper.index_articles().await.is_err());
        assert_eq!(scraper.source.inner().calls_to(INDEX), 1);
    }

    #[tokio::test]
    async fn test_run_with_unreachable_listing_is_empty() {
        let source = ScriptedSource::default().with(INDEX, Reply::Status(502));
        let scraper = Scraper::with_source(test_config(), source).unwrap();
        assert!(scraper.run().await.is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_over_http() {
        let server = MockServer::start().await;
        let base = server.uri();

        Mock::given(method("GET"))
            .and(path("/money/index"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[
                "/money/story/5599/1",
                "/money/story/5599/2",
                "/money/story/5599/1",
                "/money/story/5599/3",
                "/money/story/5599/2",
                "/money/cate/12017",
            ])))
            .expect(1)
            .mount(&server)
            .await;
        for n in 1..=3 {
            Mock::given(method("GET"))
                .and(path(format!("/money/story/5599/{n}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(article_html(&format!("Story {n}"))),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let config = ScraperConfig {
            index_url: format!("{base}/money/index"),
            article_prefix: format!("{base}/money/story"),
            site_origin: base.clone(),
            ..test_config()
        };
        let items = Scraper::new(config).unwrap().run().await;

        assert_eq!(items.len(), 3);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 1", "Story 2", "Story 3"]);

        let unique: HashSet<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(unique.len(), items.len());

        for item in &items {
            assert!(!item.images.is_empty());
            assert!(item.images.iter().skip(1).all(|img| !img.is_main));
            assert_eq!(item.images[0].url, format!("{base}/photo/main.jpg"));
        }
    }
}
