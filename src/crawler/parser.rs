//! HTML parsing for crawled pages
//!
//! Two views of a page are needed: a short summary (title plus meta
//! description) for the page fetcher, and the main-content HTML the
//! rendering crawler converts to Markdown.

use scraper::{Html, Selector};

/// Title and description of a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Parses an HTML document into a [`PageSummary`]
///
/// # Example
///
/// ```
/// use tributary::crawler::parse_summary;
///
/// let html = r#"<html><head><title>Test</title></head><body></body></html>"#;
/// let summary = parse_summary(html);
/// assert_eq!(summary.title, Some("Test".to_string()));
/// assert_eq!(summary.description, None);
/// ```
pub fn parse_summary(html: &str) -> PageSummary {
    let document = Html::parse_document(html);
    PageSummary {
        title: extract_title(&document),
        description: extract_description(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts `<meta name="description">`, matching the name case-insensitively
fn extract_description(document: &Html) -> Option<String> {
    let meta_selector = Selector::parse("meta[name][content]").ok()?;

    document
        .select(&meta_selector)
        .find(|element| {
            element
                .value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"))
        })
        .and_then(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

/// Containers tried, in order, when looking for the readable part of a page
const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".post-content",
    ".entry-content",
];

/// Elements whose text is never readable content, wherever they appear
const NON_TEXT_SELECTORS: &[&str] = &["script", "style", "noscript", "iframe", "template"];

/// Page chrome stripped when falling back to `<body>`
const LAYOUT_SELECTORS: &[&str] = &["nav", "header", "footer", "aside", "form"];

/// Returns the HTML of the page's main content area
///
/// Falls back to `<body>` with layout elements removed, then to the whole
/// document. Scripts and styles are removed in every case.
pub fn extract_main_content(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in MAIN_SELECTORS {
        if let Ok(selector) = Selector::parse(selector) {
            if let Some(main) = document.select(&selector).next() {
                return strip_elements(&document, main.html(), NON_TEXT_SELECTORS);
            }
        }
    }

    let html = match Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
    {
        Some(body) => strip_elements(&document, body.html(), LAYOUT_SELECTORS),
        None => document.html(),
    };
    strip_elements(&document, html, NON_TEXT_SELECTORS)
}

fn strip_elements(document: &Html, mut html: String, selectors: &[&str]) -> String {
    for selector in selectors {
        if let Ok(selector) = Selector::parse(selector) {
            for element in document.select(&selector) {
                html = html.replace(&element.html(), "");
            }
        }
    }
    html
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
