//! Encyclopedia summaries (MediaWiki `prop=extracts`)
//!
//! The query is used as an exact page title. A missing page is an ordinary
//! outcome and contributes nothing.

use crate::sources::http::{HttpSource, StatusCheck};
use crate::sources::{Harvest, SourceAdapter, SourceKind, SourceResult};
use crate::TributaryError;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiQuery {
    #[serde(default)]
    pages: BTreeMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    extract: Option<String>,
}

/// Encyclopedia source adapter
pub struct EncyclopediaAdapter {
    http: HttpSource,
}

impl EncyclopediaAdapter {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }

    fn extract(&self, query: &str) -> Result<Vec<SourceResult>, TributaryError> {
        let params = [
            ("action", "query".to_string()),
            ("prop", "extracts".to_string()),
            ("titles", query.to_string()),
            ("format", "json".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("redirects", "1".to_string()),
        ];
        let (status, body) = self
            .http
            .get("encyclopedia extract", &params, StatusCheck::AcceptAny)?;

        if status != StatusCode::OK {
            return Err(TributaryError::Status {
                url: self.http.endpoint().to_string(),
                status: status.as_u16(),
            });
        }

        let response: WikiResponse =
            serde_json::from_str(&body).map_err(|e| TributaryError::Malformed {
                what: "encyclopedia",
                message: e.to_string(),
            })?;

        Ok(format_pages(response))
    }
}

fn format_pages(response: WikiResponse) -> Vec<SourceResult> {
    response
        .query
        .map(|q| q.pages)
        .unwrap_or_default()
        .into_values()
        .filter_map(|page| page.extract)
        .filter(|extract| !extract.trim().is_empty())
        .take(1)
        .map(|extract| {
            SourceResult::snippet(
                SourceKind::Encyclopedia,
                1,
                format!("[Encyclopedia]\n{}", extract.trim()),
            )
        })
        .collect()
}

impl SourceAdapter for EncyclopediaAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Encyclopedia
    }

    fn limit(&self) -> usize {
        1
    }

    fn harvest(&self, query: &str) -> Harvest {
        match self.extract(query) {
            Ok(results) => {
                if results.is_empty() {
                    tracing::info!("No encyclopedia page for '{}'", query);
                }
                Harvest::from_results(results)
            }
            Err(e) => Harvest::failed(self.kind(), e),
        }
    }
}
