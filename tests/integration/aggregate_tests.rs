//! End-to-end aggregation runs against mock sources

use crate::harness::{search_body, Harness, ATOM_FEED, NEWS_BODY, SLOW, WIKI_BODY, WIKI_MISSING};
use std::sync::Arc;
use tributary::config::CrawlMode;
use tributary::crawler::MarkdownEngine;
use tributary::sources::{
    build_blocking_client, AcademicAdapter, EncyclopediaAdapter, HttpSource, RegistryAdapter,
    SearchAdapter,
};
use tributary::{Aggregator, Harvest, RetryPolicy, SourceAdapter, SourceKind};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Mounts healthy academic, news, registry and encyclopedia sources
fn mount_secondary_sources(harness: &Harness) {
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/arxiv"))
            .and(query_param("search_query", "all:rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ATOM_FEED)),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("apiKey", "news-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_BODY)),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/edgar"))
            .and(query_param("action", "getcompany"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table>RUST CORP</table>")),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/wiki"))
            .and(query_param("titles", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WIKI_BODY)),
    );
}

fn mount_search(harness: &Harness, links: &[String]) {
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("key", "search-secret"))
            .and(query_param("num", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(search_body(links))),
    );
}

fn mount_page(harness: &Harness, page: &str, title: &str) {
    harness.mount(
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><head><title>{title}</title><meta name="description" content="About {title}"></head>
                <body><main><p>Body of {title}</p></main></body></html>"#
            ))),
    );
}

fn position(corpus: &str, needle: &str) -> usize {
    corpus
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in corpus:\n{}", needle, corpus))
}

#[test]
fn test_every_source_contributes_in_order() {
    let harness = Harness::start();
    let links = vec![harness.url("/page1"), harness.url("/page2")];
    mount_search(&harness, &links);
    mount_secondary_sources(&harness);
    mount_page(&harness, "/page1", "First");
    mount_page(&harness, "/page2", "Second");

    let aggregator = Aggregator::new(harness.config(CrawlMode::Fetch)).unwrap();
    let corpus = aggregator.aggregate("rust");

    let order = [
        "[Search Result 1] Result 1 - site1.example\nSnippet 1",
        "[Search Result 2] Result 2 - site2.example\nSnippet 2",
        "[Academic Result 1] A Paper on Rust\nSummary: Memory safety without garbage collection.",
        "[News 1] Rust ships (Daily Wire)\nA release.\nURL: https://news.example/rust",
        "Registry: Filings and data retrieved for rust.",
        "[Encyclopedia]\nRust is a programming language.",
        "[Fetched Page 1] First\nDescription: About First",
        "[Fetched Page 2] Second\nDescription: About Second",
    ];
    let positions: Vec<usize> = order.iter().map(|n| position(&corpus, n)).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", corpus);
    assert_eq!(corpus.split("\n\n").count(), order.len());
}

#[test]
fn test_two_urls_time_out() {
    let harness = Harness::start();
    let links = vec![harness.url("/slow1"), harness.url("/slow2")];
    mount_search(&harness, &links);
    mount_secondary_sources(&harness);
    for page in ["/slow1", "/slow2"] {
        harness.mount(
            Mock::given(method("GET"))
                .and(path(page))
                .respond_with(ResponseTemplate::new(200).set_delay(SLOW)),
        );
    }

    let aggregator = Aggregator::new(harness.config(CrawlMode::Fetch)).unwrap();
    let corpus = aggregator.aggregate("rust");
    let entries: Vec<&str> = corpus.split("\n\n").collect();

    assert_eq!(entries.len(), 8, "{}", corpus);
    assert!(entries[0].starts_with("[Search Result 1]"));
    assert!(entries[1].starts_with("[Search Result 2]"));
    assert!(entries[2].starts_with("[Academic Result 1]"));
    assert!(entries[3].starts_with("[News 1]"));
    assert!(entries[4].starts_with("Registry: "));
    assert!(entries[5].starts_with("[Encyclopedia]"));
    assert!(entries[6].starts_with("[Fetched Page 1] Error fetching content: "));
    assert!(entries[7].starts_with("[Fetched Page 2] Error fetching content: "));
}

#[test]
fn test_all_sources_failing_gives_five_error_lines() {
    let harness = Harness::start();
    for endpoint in ["/search", "/arxiv", "/news", "/edgar", "/wiki"] {
        harness.mount(
            Mock::given(method("GET"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(500)),
        );
    }

    let config = harness.config(CrawlMode::Fetch);
    let attempts = config.retry.max_retries as usize + 1;
    let aggregator = Aggregator::new(config).unwrap();
    let corpus = aggregator.aggregate("rust");
    let entries: Vec<&str> = corpus.split("\n\n").collect();

    assert_eq!(entries.len(), 5, "{}", corpus);
    // Sources that require success are retried to exhaustion, once per attempt
    assert_eq!(harness.requests_to("/search"), attempts);
    assert_eq!(harness.requests_to("/arxiv"), attempts);
    assert_eq!(harness.requests_to("/news"), attempts);
    // Registry and encyclopedia classify the status instead of retrying it
    assert_eq!(harness.requests_to("/edgar"), 1);
    assert_eq!(harness.requests_to("/wiki"), 1);
    assert!(entries[0].starts_with("Search Error: "));
    assert!(entries[1].starts_with("Academic Error: "));
    assert!(entries[2].starts_with("News Error: "));
    assert_eq!(
        entries[3],
        "Registry Error: 500 - Unable to retrieve data from registry."
    );
    assert!(entries[4].starts_with("Encyclopedia Error: "));
    assert!(!corpus.contains("search-secret"));
    assert!(!corpus.contains("news-secret"));
}

#[test]
fn test_retried_source_recovers_without_error_entry() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_BODY)),
    );

    let corpus = Aggregator::new(harness.config(CrawlMode::Fetch))
        .unwrap()
        .aggregate("rust");

    assert_eq!(harness.requests_to("/news"), 2);
    assert!(corpus.contains("[News 1] "), "{}", corpus);
    assert!(!corpus.contains("News Error: "));
}

#[test]
fn test_unreachable_everything_still_returns_corpus() {
    let harness = Harness::start();
    let mut config = harness.config(CrawlMode::Render);
    config.endpoints.search = "http://127.0.0.1:9/search".to_string();
    config.endpoints.academic = "http://127.0.0.1:9/arxiv".to_string();
    config.endpoints.news = "http://127.0.0.1:9/news".to_string();
    config.endpoints.registry = "http://127.0.0.1:9/edgar".to_string();
    config.endpoints.encyclopedia = "http://127.0.0.1:9/wiki".to_string();

    let corpus = Aggregator::new(config).unwrap().aggregate("rust");
    assert_eq!(corpus.split("\n\n").count(), 5, "{}", corpus);
}

#[test]
fn test_missing_encyclopedia_page_contributes_nothing() {
    let harness = Harness::start();
    mount_search(&harness, &[]);
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/wiki"))
            .respond_with(ResponseTemplate::new(200).set_body_string(WIKI_MISSING)),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/edgar"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<p>No matching companies.</p>"),
            ),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/arxiv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ATOM_FEED)),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NEWS_BODY)),
    );

    let corpus = Aggregator::new(harness.config(CrawlMode::Fetch))
        .unwrap()
        .aggregate("rust");

    assert!(!corpus.contains("Encyclopedia"), "{}", corpus);
    assert!(corpus.ends_with("Registry: No filings found for 'rust'."));
}

#[test]
fn test_missing_credentials_skip_requests() {
    let harness = Harness::start();
    mount_secondary_sources(&harness);
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(search_body(&[]))),
    );

    let mut config = harness.config(CrawlMode::Fetch);
    config.credentials.search_api_key = None;
    config.credentials.news_api_key = None;

    let corpus = Aggregator::new(config).unwrap().aggregate("rust");
    let entries: Vec<&str> = corpus.split("\n\n").collect();

    assert_eq!(entries[0], "Search Error: Missing credential: search API key");
    assert_eq!(entries[2], "News Error: Missing credential: news API key");
    assert!(entries[1].starts_with("[Academic Result 1]"));
    assert_eq!(harness.requests_to("/search"), 0);
    assert_eq!(harness.requests_to("/news"), 0);
}

#[test]
fn test_identical_runs_give_identical_corpora() {
    let harness = Harness::start();
    let links = vec![harness.url("/page1"), harness.url("/page2")];
    mount_search(&harness, &links);
    mount_secondary_sources(&harness);
    mount_page(&harness, "/page1", "First");
    mount_page(&harness, "/page2", "Second");

    let aggregator = Aggregator::new(harness.config(CrawlMode::Fetch)).unwrap();
    let first = aggregator.aggregate("rust");
    let second = aggregator.aggregate("rust");

    assert_eq!(first, second);
}

#[test]
fn test_render_mode_uses_markdown_engine() {
    let harness = Harness::start();
    let links = vec![harness.url("/page1"), harness.url("/missing")];
    mount_search(&harness, &links);
    mount_secondary_sources(&harness);
    mount_page(&harness, "/page1", "First");
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let corpus = Aggregator::new(harness.config(CrawlMode::Render))
        .unwrap()
        .aggregate("rust");

    let rendered = format!("[Rendered Page] URL: {}\n", links[0]);
    let failed = format!("[Render Error] URL: {} Error: ", links[1]);
    assert!(position(&corpus, &rendered) < position(&corpus, &failed));
    assert!(corpus.contains("Body of First"));
    assert!(position(&corpus, "[Encyclopedia]") < position(&corpus, &rendered));
}

#[test]
fn test_crawl_limit_caps_pages() {
    let harness = Harness::start();
    let links: Vec<String> = (1..=5).map(|i| harness.url(&format!("/p{}", i))).collect();
    mount_search(&harness, &links);
    mount_secondary_sources(&harness);
    for i in 1..=5 {
        mount_page(&harness, &format!("/p{}", i), &format!("Page {}", i));
    }

    let corpus = Aggregator::new(harness.config(CrawlMode::Fetch))
        .unwrap()
        .aggregate("rust");

    assert!(corpus.contains("[Fetched Page 3] Page 3"));
    assert!(!corpus.contains("[Fetched Page 4]"));
}

/// Adapter that always fails the way a broken source does
struct BrokenNews;

impl SourceAdapter for BrokenNews {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn limit(&self) -> usize {
        5
    }

    fn harvest(&self, _query: &str) -> Harvest {
        Harvest::failed(self.kind(), "upstream returned garbage")
    }
}

#[test]
fn test_one_faulty_adapter_leaves_others_intact() {
    let harness = Harness::start();
    mount_search(&harness, &[]);
    mount_secondary_sources(&harness);

    let config = harness.config(CrawlMode::Fetch);
    let client = build_blocking_client(&config).unwrap();
    let retry = RetryPolicy::none();
    let source = |endpoint: &str| HttpSource::new(client.clone(), endpoint, retry);

    let search = Box::new(SearchAdapter::new(
        source(&config.endpoints.search),
        &config.credentials,
    ));
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(AcademicAdapter::new(source(&config.endpoints.academic))),
        Box::new(BrokenNews),
        Box::new(RegistryAdapter::new(source(&config.endpoints.registry))),
        Box::new(EncyclopediaAdapter::new(source(&config.endpoints.encyclopedia))),
    ];
    let engine = Arc::new(MarkdownEngine::new(&config));
    let aggregator = Aggregator::from_parts(config.clone(), search, adapters, engine);

    let corpus = aggregator.aggregate("rust");
    let entries: Vec<&str> = corpus.split("\n\n").collect();

    assert_eq!(entries.len(), 4, "{}", corpus);
    assert!(entries[0].starts_with("[Academic Result 1]"));
    assert_eq!(entries[1], "News Error: upstream returned garbage");
    assert!(entries[2].starts_with("Registry: "));
    assert!(entries[3].starts_with("[Encyclopedia]"));
}
