use std::time::Duration;
use tokio::runtime::Runtime;
use tributary::config::{Config, Credentials, CrawlMode, EndpointConfig, RetryConfig};
use wiremock::{Mock, MockServer};

/// A mock server reachable from blocking test code
pub struct Harness {
    runtime: Runtime,
    pub server: MockServer,
}

impl Harness {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("Failed to build test runtime");
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Number of requests the server has seen for `path`
    pub fn requests_to(&self, path: &str) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Configuration pointing every source at this server
    pub fn config(&self, mode: CrawlMode) -> Config {
        let mut config = Config::default();
        config.aggregator.crawl_mode = mode;
        config.retry = RetryConfig {
            max_retries: 1,
            backoff_ms: 10,
        };
        config.timeouts.request_ms = 2_000;
        config.timeouts.fetch_ms = 300;
        config.timeouts.render_ms = 300;
        config.endpoints = EndpointConfig {
            search: self.url("/search"),
            academic: self.url("/arxiv"),
            news: self.url("/news"),
            registry: self.url("/edgar"),
            encyclopedia: self.url("/wiki"),
        };
        config.credentials = Credentials {
            search_api_key: Some("search-secret".to_string()),
            search_scope_id: Some("scope-1".to_string()),
            news_api_key: Some("news-secret".to_string()),
        };
        config
    }
}

pub const SLOW: Duration = Duration::from_secs(3);

pub fn search_body(links: &[String]) -> String {
    let items: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            format!(
                r#"{{"title": "Result {n}", "displayLink": "site{n}.example", "snippet": "Snippet {n}", "link": "{link}"}}"#,
                n = i + 1,
                link = link
            )
        })
        .collect();
    format!(r#"{{"items": [{}]}}"#, items.join(","))
}

pub const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>query</title>
  <entry>
    <title>A Paper on Rust</title>
    <summary>Memory safety without garbage collection.</summary>
  </entry>
</feed>"#;

pub const NEWS_BODY: &str = r#"{"status": "ok", "totalResults": 1, "articles": [
    {"source": {"name": "Daily Wire"}, "title": "Rust ships", "description": "A release.", "url": "https://news.example/rust"}
]}"#;

pub const WIKI_BODY: &str =
    r#"{"query": {"pages": {"1": {"title": "Rust", "extract": "Rust is a programming language."}}}}"#;

pub const WIKI_MISSING: &str =
    r#"{"batchcomplete": "", "query": {"pages": {"-1": {"title": "Zzq", "missing": ""}}}}"#;
