//! Structured web search (Custom Search JSON API)
//!
//! Besides its own snippets, this adapter hands the ranked result links to
//! the crawling stage.

use crate::config::Credentials;
use crate::sources::http::{HttpSource, StatusCheck};
use crate::sources::{or_placeholder, Harvest, SourceAdapter, SourceKind, SourceResult};
use crate::url::{clean_candidate, UrlCandidate};
use crate::TributaryError;
use serde::Deserialize;

const SEARCH_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

/// Structured-search source adapter
pub struct SearchAdapter {
    http: HttpSource,
    api_key: Option<String>,
    scope_id: Option<String>,
}

impl SearchAdapter {
    pub fn new(http: HttpSource, credentials: &Credentials) -> Self {
        Self {
            http,
            api_key: credentials.search_api_key.clone(),
            scope_id: credentials.search_scope_id.clone(),
        }
    }

    fn search(&self, query: &str) -> Result<Harvest, TributaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TributaryError::MissingCredential("search API key"))?;
        let scope_id = self
            .scope_id
            .as_deref()
            .ok_or(TributaryError::MissingCredential("search scope id"))?;

        let params = [
            ("key", api_key.to_string()),
            ("cx", scope_id.to_string()),
            ("q", query.to_string()),
            ("num", SEARCH_LIMIT.to_string()),
        ];
        let (_, body) = self
            .http
            .get("structured search", &params, StatusCheck::RequireSuccess)?;

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| TributaryError::Malformed {
                what: "search",
                message: e.to_string(),
            })?;

        Ok(self.to_harvest(response))
    }

    fn to_harvest(&self, response: SearchResponse) -> Harvest {
        let mut harvest = Harvest::default();

        for (i, item) in response.items.into_iter().take(SEARCH_LIMIT).enumerate() {
            let rank = i + 1;
            let body = format!(
                "[Search Result {}] {} - {}\n{}",
                rank,
                or_placeholder(item.title.as_deref(), "No title"),
                or_placeholder(item.display_link.as_deref(), "unknown site"),
                or_placeholder(item.snippet.as_deref(), "No snippet"),
            );
            harvest
                .results
                .push(SourceResult::snippet(SourceKind::StructuredSearch, rank, body));

            match item.link.as_deref().map(clean_candidate) {
                Some(Ok(url)) => harvest.urls.push(UrlCandidate { rank, url }),
                Some(Err(e)) => tracing::debug!("Dropping search link at rank {}: {}", rank, e),
                None => tracing::debug!("Search result {} has no link", rank),
            }
        }

        harvest
    }
}

impl SourceAdapter for SearchAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::StructuredSearch
    }

    fn limit(&self) -> usize {
        SEARCH_LIMIT
    }

    fn harvest(&self, query: &str) -> Harvest {
        match self.search(query) {
            Ok(harvest) => {
                tracing::info!(
                    "Search returned {} results, {} crawlable links",
                    harvest.results.len(),
                    harvest.urls.len()
                );
                harvest
            }
            Err(e) => Harvest::failed(self.kind(), e),
        }
    }
}
