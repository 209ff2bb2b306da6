//! Field and image extraction from parsed article markup.
//!
//! Every field is located through a [`SelectorChain`]: an ordered list of CSS
//! selectors where the first selector matching any element wins. Chains are
//! data, compiled once per run from [`SelectorConfig`], so supporting another
//! page layout means appending a selector rather than adding a branch.
//!
//! # Submodules
//!
//! - [`fields`]: Title, publish time, reporter and body text
//! - [`images`]: Body and header images, URL normalization and filtering

pub mod fields;
pub mod images;

use crate::config::SelectorConfig;
use crate::error::ScrapeError;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

/// Ordered CSS selector fallbacks; the first selector with a match wins.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    pub fn compile<S: AsRef<str>>(css: &[S]) -> Result<Self, ScrapeError> {
        let selectors = css
            .iter()
            .map(|s| {
                Selector::parse(s.as_ref()).map_err(|_| ScrapeError::Selector(s.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// The first element matched by the earliest selector that matches anything.
    pub fn first_match<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
    }
}

/// All selector chains needed to extract one article.
#[derive(Debug, Clone)]
pub struct ArticleSelectors {
    pub title: SelectorChain,
    pub time: SelectorChain,
    pub reporter: SelectorChain,
    pub body: SelectorChain,
    pub header_image: SelectorChain,
    pub image_source_attrs: Vec<String>,
}

impl ArticleSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            title: SelectorChain::compile(&config.title)?,
            time: SelectorChain::compile(&config.time)?,
            reporter: SelectorChain::compile(&config.reporter)?,
            body: SelectorChain::compile(&config.body)?,
            header_image: SelectorChain::compile(&config.header_image)?,
            image_source_attrs: config.image_source_attrs.clone(),
        })
    }
}

/// Text content of an element with whitespace runs collapsed and ends trimmed.
///
/// Adjacent text nodes are joined as-is, so inline tags never introduce
/// spacing that the markup does not have.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_prefers_earlier_selector() {
        let doc = Html::parse_document(
            r#"<div class="legacy">old</div><div class="primary">new</div>"#,
        );
        let chain = SelectorChain::compile(&["div.primary", "div.legacy"]).unwrap();
        assert_eq!(element_text(chain.first_match(&doc).unwrap()), "new");
    }

    #[test]
    fn test_chain_falls_back() {
        let doc = Html::parse_document(r#"<div class="legacy">old</div>"#);
        let chain = SelectorChain::compile(&["div.primary", "div.legacy"]).unwrap();
        assert_eq!(element_text(chain.first_match(&doc).unwrap()), "old");
    }

    #[test]
    fn test_chain_no_match() {
        let doc = Html::parse_document("<p>nothing</p>");
        let chain = SelectorChain::compile(&["div.primary"]).unwrap();
        assert!(chain.first_match(&doc).is_none());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let err = SelectorChain::compile(&["div.ok", "[[[broken"]).unwrap_err();
        match err {
            ScrapeError::Selector(css) => assert_eq!(css, "[[[broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let doc = Html::parse_document("<h1>\n  Hello   <span>big\tworld</span>  </h1>");
        let chain = SelectorChain::compile(&["h1"]).unwrap();
        assert_eq!(element_text(chain.first_match(&doc).unwrap()), "Hello big world");
    }

    #[test]
    fn test_default_selectors_compile() {
        assert!(ArticleSelectors::compile(&SelectorConfig::default()).is_ok());
    }
}
