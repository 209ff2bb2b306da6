//! Text field extraction: title, publish time, reporter and body.

use super::{ArticleSelectors, element_text};
use crate::models::{UNKNOWN_CONTENT, UNKNOWN_REPORTER, UNKNOWN_TIME, UNKNOWN_TITLE};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Text fields of one article, sentinel-filled where extraction missed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: String,
    pub publish_time: String,
    pub reporter: String,
    pub content: String,
}

pub fn extract_fields(document: &Html, selectors: &ArticleSelectors) -> ArticleFields {
    ArticleFields {
        title: text_or(selectors.title.first_match(document), UNKNOWN_TITLE),
        publish_time: text_or(selectors.time.first_match(document), UNKNOWN_TIME),
        reporter: text_or(selectors.reporter.first_match(document), UNKNOWN_REPORTER),
        content: selectors
            .body
            .first_match(document)
            .map(body_text)
            .unwrap_or_else(|| UNKNOWN_CONTENT.to_string()),
    }
}

fn text_or(element: Option<ElementRef<'_>>, sentinel: &str) -> String {
    element
        .map(element_text)
        .unwrap_or_else(|| sentinel.to_string())
}

/// Non-empty paragraphs of the body container, one per line.
fn body_text(container: ElementRef<'_>) -> String {
    container
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;

    fn selectors() -> ArticleSelectors {
        ArticleSelectors::compile(&SelectorConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_primary_layout() {
        let doc = Html::parse_document(
            r#"<html><body>
            <h1 class="article-head__title">  台股收紅 </h1>
            <time class="article-body__time">2026-10-18 09:30</time>
            <div class="article-body__info"><span>記者王小明</span>／台北報導</div>
            <section class="article-body__editor">
                <p> 第一段 </p>
                <p>   </p>
                <div><p>第二段</p></div>
                <span>not a paragraph</span>
            </section>
            </body></html>"#,
        );
        let fields = extract_fields(&doc, &selectors());

        assert_eq!(fields.title, "台股收紅");
        assert_eq!(fields.publish_time, "2026-10-18 09:30");
        assert_eq!(fields.reporter, "記者王小明／台北報導");
        assert_eq!(fields.content, "第一段\n第二段");
    }

    #[test]
    fn test_inline_markup_keeps_text_contiguous() {
        let doc = Html::parse_document(
            r#"<h1 class="article-head__title">台股<span>收紅</span></h1>
            <section class="article-body__editor">
                <p>台積電<a href="/money/story/1">股價</a>上漲</p>
                <p>Foreign <b>investors</b> bought</p>
            </section>"#,
        );
        let fields = extract_fields(&doc, &selectors());

        assert_eq!(fields.title, "台股收紅");
        assert_eq!(fields.content, "台積電股價上漲\nForeign investors bought");
    }

    #[test]
    fn test_falls_back_to_legacy_layout() {
        let doc = Html::parse_document(
            r#"<h1 class="story_art_title">Legacy title</h1>
            <div id="article_body"><p>Legacy body</p></div>"#,
        );
        let fields = extract_fields(&doc, &selectors());

        assert_eq!(fields.title, "Legacy title");
        assert_eq!(fields.content, "Legacy body");
    }

    #[test]
    fn test_sentinels_when_nothing_matches() {
        let doc = Html::parse_document("<h2>Not a title</h2><p>Loose paragraph</p>");
        let fields = extract_fields(&doc, &selectors());

        assert_eq!(fields.title, UNKNOWN_TITLE);
        assert_eq!(fields.publish_time, UNKNOWN_TIME);
        assert_eq!(fields.reporter, UNKNOWN_REPORTER);
        assert_eq!(fields.content, UNKNOWN_CONTENT);
    }

    #[test]
    fn test_container_without_paragraphs_is_empty_content() {
        let doc = Html::parse_document(
            r#"<section class="article-body__editor"><div>just a div</div></section>"#,
        );
        let fields = extract_fields(&doc, &selectors());
        assert_eq!(fields.content, "");
    }
}
