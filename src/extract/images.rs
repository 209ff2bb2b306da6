//! Image discovery, URL normalization and filtering.
//!
//! Images come from two places in an article:
//!
//! 1. Every `<img>` inside the body container, in document order
//! 2. A single `<img>` in the header/figure container, which becomes the
//!    main image and is placed first
//!
//! Candidates that look like icons, ads, social buttons or tracking pixels
//! are dropped by [`is_valid_news_image`].

use super::ArticleSelectors;
use crate::models::ImageRef;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;
use url::Url;

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Substrings marking a URL as something other than a news photo (case-insensitive).
const BLOCKED_KEYWORDS: &[&str] = &[
    "ad",
    "ads",
    "advertisement",
    "banner",
    "logo",
    "facebook",
    "twitter",
    "line",
    "weibo",
    "pixel",
    "tracking",
    "beacon",
];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Images narrower or shorter than this, by declared size, are icons or trackers.
const MIN_DIMENSION: i64 = 100;

/// Resolve an image `src` to an absolute URL.
///
/// - `//host/path` becomes `https://host/path`
/// - `/path` resolves against `site_origin`
/// - absolute URLs pass through
/// - anything else resolves against the article URL
///
/// Returns `None` for empty sources, inline `data:` URIs and unresolvable input.
pub fn normalize_image_url(src: &str, site_origin: &Url, article_url: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }

    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    let resolved = if src.starts_with('/') {
        site_origin.join(src)
    } else {
        article_url.join(src)
    };
    resolved.ok().map(String::from)
}

/// Whether an image looks like a real news photo.
///
/// `width`/`height` are the raw attribute values; they only count when both
/// are present and parse as integers.
pub fn is_valid_news_image(url: &str, width: Option<&str>, height: Option<&str>) -> bool {
    if let (Some(w), Some(h)) = (parse_dimension(width), parse_dimension(height)) {
        if w < MIN_DIMENSION || h < MIN_DIMENSION {
            return false;
        }
    }

    let lower = url.to_lowercase();
    if BLOCKED_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return false;
    }
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn parse_dimension(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Resolution context for the images of one article.
#[derive(Debug, Clone, Copy)]
pub struct ImageContext<'a> {
    pub site_origin: &'a Url,
    pub article_url: &'a Url,
    pub source_attrs: &'a [String],
}

impl ImageContext<'_> {
    fn image_ref(&self, element: ElementRef<'_>, is_main: bool) -> Option<ImageRef> {
        let attrs = element.value();
        let src = self
            .source_attrs
            .iter()
            .filter_map(|name| attrs.attr(name))
            .find(|value| !value.trim().is_empty())?;

        let url = normalize_image_url(src, self.site_origin, self.article_url)?;
        if !is_valid_news_image(&url, attrs.attr("width"), attrs.attr("height")) {
            trace!(%url, "Rejected image");
            return None;
        }

        Some(ImageRef {
            url,
            alt: attrs.attr("alt").unwrap_or_default().trim().to_string(),
            title: attrs.attr("title").unwrap_or_default().trim().to_string(),
            is_main,
        })
    }
}

/// Collect an article's images, main image first when one exists.
///
/// # Arguments
///
/// * `document` - The parsed article page
/// * `selectors` - Compiled chains locating the body and header containers
/// * `context` - Origin, article URL and source attributes for resolving `src`
///
/// # Returns
///
/// Valid body images in document order, preceded by the header image marked
/// `is_main` when it exists and passes [`is_valid_news_image`].
pub fn extract_images(
    document: &Html,
    selectors: &ArticleSelectors,
    context: &ImageContext<'_>,
) -> Vec<ImageRef> {
    let mut images: Vec<ImageRef> = selectors
        .body
        .first_match(document)
        .map(|body| {
            body.select(&IMG)
                .filter_map(|img| context.image_ref(img, false))
                .collect()
        })
        .unwrap_or_default();

    let header_img = selectors.header_image.first_match(document).and_then(|container| {
        if container.value().name() == "img" {
            Some(container)
        } else {
            container.select(&IMG).next()
        }
    });

    if let Some(main) = header_img.and_then(|img| context.image_ref(img, true)) {
        images.insert(0, main);
    }
    images
}
