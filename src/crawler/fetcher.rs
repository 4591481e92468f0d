//! Concurrent page fetcher
//!
//! All URLs of a batch are fetched at once, one task each. Every attempt is
//! bounded by the fetch timeout and retried through the shared
//! [`RetryPolicy`]. Results come back in input order with exactly one entry
//! per URL, whatever happened to the individual fetches.

use crate::config::Config;
use crate::crawler::parser::parse_summary;
use crate::retry::RetryPolicy;
use crate::sources::{SourceKind, SourceResult};
use crate::TributaryError;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;

/// Builds the async HTTP client used for crawling
///
/// Must be called inside the runtime that will drive the client; connection
/// pools do not survive their runtime.
///
/// # Example
///
/// ```no_run
/// use tributary::config::Config;
/// use tributary::crawler::build_http_client;
///
/// # async fn demo() {
/// let client = build_http_client(&Config::default()).unwrap();
/// # }
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches raw pages and reduces them to title and description
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    /// Fetches every URL concurrently
    ///
    /// Returns one [`SourceResult`] per input URL, in input order. A task that
    /// panics is reported like any other failed fetch.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<SourceResult> {
        tracing::info!("Fetching {} pages", urls.len());

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let fetcher = self.clone();
                let url = url.clone();
                tokio::spawn(async move { fetcher.fetch_page(&url).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(i, joined)| {
                let index = i + 1;
                match joined {
                    Ok(Ok(html)) => summarize(index, &html),
                    Ok(Err(e)) => SourceResult::error(SourceKind::PageFetch, index, e),
                    Err(e) => {
                        tracing::error!("Fetch task {} did not complete: {}", index, e);
                        SourceResult::error(
                            SourceKind::PageFetch,
                            index,
                            format!("fetch task failed: {}", e),
                        )
                    }
                }
            })
            .collect()
    }

    /// Fetches one page body, retrying failed attempts
    pub async fn fetch_page(&self, url: &str) -> Result<String, TributaryError> {
        let this = self;
        self.retry
            .run_async(url, move || async move {
                match tokio::time::timeout(this.timeout, this.get(url)).await {
                    Ok(result) => result,
                    Err(_) => Err(TributaryError::Timeout {
                        url: url.to_string(),
                    }),
                }
            })
            .await
    }

    async fn get(&self, url: &str) -> Result<String, TributaryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TributaryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(url, e))
    }
}

/// Maps a transport error to the crate error, keeping timeouts distinct
pub(crate) fn classify(url: &str, error: reqwest::Error) -> TributaryError {
    if error.is_timeout() {
        TributaryError::Timeout {
            url: url.to_string(),
        }
    } else {
        TributaryError::Http {
            url: url.to_string(),
            source: error.without_url(),
        }
    }
}

fn summarize(index: usize, html: &str) -> SourceResult {
    let summary = parse_summary(html);
    SourceResult::snippet(
        SourceKind::PageFetch,
        index,
        format!(
            "[Fetched Page {}] {}\nDescription: {}",
            index,
            summary.title.as_deref().unwrap_or("No title found"),
            summary
                .description
                .as_deref()
                .unwrap_or("No description found"),
        ),
    )
}
