//! News articles (NewsAPI `everything` endpoint)

use crate::config::Credentials;
use crate::sources::http::{HttpSource, StatusCheck};
use crate::sources::{or_placeholder, Harvest, SourceAdapter, SourceKind, SourceResult};
use crate::TributaryError;
use serde::Deserialize;

const NEWS_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// News-feed source adapter
pub struct NewsAdapter {
    http: HttpSource,
    api_key: Option<String>,
}

impl NewsAdapter {
    pub fn new(http: HttpSource, credentials: &Credentials) -> Self {
        Self {
            http,
            api_key: credentials.news_api_key.clone(),
        }
    }

    fn articles(&self, query: &str) -> Result<Vec<SourceResult>, TributaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(TributaryError::MissingCredential("news API key"))?;

        let params = [
            ("q", query.to_string()),
            ("language", "en".to_string()),
            ("sortBy", "relevancy".to_string()),
            ("pageSize", NEWS_LIMIT.to_string()),
            ("apiKey", api_key.to_string()),
        ];
        let (_, body) = self
            .http
            .get("news feed", &params, StatusCheck::RequireSuccess)?;

        let response: NewsResponse =
            serde_json::from_str(&body).map_err(|e| TributaryError::Malformed {
                what: "news",
                message: e.to_string(),
            })?;

        format_articles(response)
    }
}

fn format_articles(response: NewsResponse) -> Result<Vec<SourceResult>, TributaryError> {
    if response.status.as_deref() == Some("error") {
        return Err(TributaryError::Malformed {
            what: "news",
            message: response
                .message
                .unwrap_or_else(|| "service reported an error".to_string()),
        });
    }

    Ok(response
        .articles
        .into_iter()
        .take(NEWS_LIMIT)
        .enumerate()
        .map(|(i, article)| {
            let source = article.source.and_then(|s| s.name);
            let body = format!(
                "[News {}] {} ({})\n{}\nURL: {}",
                i + 1,
                or_placeholder(article.title.as_deref(), "No title"),
                or_placeholder(source.as_deref(), "Unknown source"),
                or_placeholder(article.description.as_deref(), "No description"),
                or_placeholder(article.url.as_deref(), "n/a"),
            );
            SourceResult::snippet(SourceKind::News, i + 1, body)
        })
        .collect())
}

impl SourceAdapter for NewsAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn limit(&self) -> usize {
        NEWS_LIMIT
    }

    fn harvest(&self, query: &str) -> Harvest {
        match self.articles(query) {
            Ok(results) => Harvest::from_results(results),
            Err(e) => Harvest::failed(self.kind(), e),
        }
    }
}
