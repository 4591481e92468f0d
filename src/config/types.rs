use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for Tributary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub credentials: Credentials,
}

/// How the top search hits are turned into page text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Plain concurrent GETs, keeping only title and meta description
    Fetch,
    /// One rendering session producing full document text per page
    #[default]
    Render,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// Aggregation behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AggregatorConfig {
    /// Crawling strategy for search result pages
    pub crawl_mode: CrawlMode,

    /// Maximum number of search result URLs handed to the crawler
    pub crawl_limit: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            crawl_mode: CrawlMode::Render,
            crawl_limit: 3,
        }
    }
}

/// Retry behavior shared by every external call
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Fixed delay between attempts (milliseconds)
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_ms: 2_000,
        }
    }
}

/// Per-attempt timeouts (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeoutConfig {
    /// Source adapter requests
    pub request_ms: u64,

    /// Single page fetch
    pub fetch_ms: u64,

    /// Single page render
    pub render_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_millis(self.fetch_ms)
    }

    pub fn render(&self) -> Duration {
        Duration::from_millis(self.render_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_ms: 15_000,
            fetch_ms: 10_000,
            render_ms: 20_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the client
    pub name: String,

    /// Version of the client
    pub version: String,

    /// URL with information about the client
    pub contact_url: String,

    /// Email address for contact about our traffic
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.name, self.version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "Tributary".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/tributary".to_string(),
            contact_email: "contact@example.com".to_string(),
        }
    }
}

/// Base URLs of the external sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    pub search: String,
    pub academic: String,
    pub news: String,
    pub registry: String,
    pub encyclopedia: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search: "https://www.googleapis.com/customsearch/v1".to_string(),
            academic: "http://export.arxiv.org/api/query".to_string(),
            news: "https://newsapi.org/v2/everything".to_string(),
            registry: "https://www.sec.gov/cgi-bin/browse-edgar".to_string(),
            encyclopedia: "https://en.wikipedia.org/w/api.php".to_string(),
        }
    }
}

/// API credentials; any of them may be absent
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Credentials {
    pub search_api_key: Option<String>,
    pub search_scope_id: Option<String>,
    pub news_api_key: Option<String>,
}

impl Credentials {
    /// Fills every credential the file left empty from the process environment
    ///
    /// | Field | Variables (first non-empty wins) |
    /// |-------|----------------------------------|
    /// | `search_api_key` | `SEARCH_API_KEY`, `GOOGLE_API_KEY` |
    /// | `search_scope_id` | `SEARCH_SCOPE_ID`, `SEARCH_ENGINE_ID` |
    /// | `news_api_key` | `NEWS_API_KEY`, `NEWSAPI_KEY` |
    pub fn fill_from_env(&mut self) {
        fill(&mut self.search_api_key, &["SEARCH_API_KEY", "GOOGLE_API_KEY"]);
        fill(&mut self.search_scope_id, &["SEARCH_SCOPE_ID", "SEARCH_ENGINE_ID"]);
        fill(&mut self.news_api_key, &["NEWS_API_KEY", "NEWSAPI_KEY"]);
    }
}

fn fill(slot: &mut Option<String>, vars: &[&str]) {
    if slot.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        return;
    }
    *slot = vars
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty());
}

// Keys never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn state(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<present>"
            } else {
                "<missing>"
            }
        }
        f.debug_struct("Credentials")
            .field("search_api_key", &state(&self.search_api_key))
            .field("search_scope_id", &state(&self.search_scope_id))
            .field("news_api_key", &state(&self.news_api_key))
            .finish()
    }
}
