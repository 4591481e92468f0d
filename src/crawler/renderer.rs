//! Rendering crawler
//!
//! A [`RenderEngine`] opens one [`RenderSession`] per batch; the session turns
//! a URL into normalized document text. Sessions release whatever they hold
//! when dropped, so a batch that ends early still cleans up.
//!
//! The bundled [`MarkdownEngine`] renders static HTML only. Engines that drive
//! a real browser plug in through the same traits.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, classify};
use crate::crawler::parser::extract_main_content;
use crate::retry::RetryPolicy;
use crate::sources::{SourceKind, SourceResult};
use crate::TributaryError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Factory for render sessions
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Starts a session; called once per batch, inside the crawl runtime
    async fn open(&self) -> Result<Box<dyn RenderSession>, TributaryError>;
}

/// A live rendering context, released on drop
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Renders one URL to document text
    async fn render(&self, url: &str) -> Result<String, TributaryError>;
}

/// Renders pages sequentially through one engine session
pub struct RenderingCrawler {
    engine: Arc<dyn RenderEngine>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RenderingCrawler {
    pub fn new(engine: Arc<dyn RenderEngine>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            engine,
            timeout,
            retry,
        }
    }

    /// Renders every URL with one session
    ///
    /// Each URL yields one entry, in input order. When the session cannot be
    /// opened the batch yields a single initialization error instead.
    pub async fn render_all(&self, urls: &[String]) -> Vec<SourceResult> {
        let session = match self.engine.open().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Render session failed to start: {}", e);
                return vec![SourceResult::error(
                    SourceKind::PageRender,
                    1,
                    format!("Session initialization failed: {}", e),
                )];
            }
        };

        let mut results = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            tracing::info!("Rendering page {}/{}: {}", index, urls.len(), url);

            let entry = match self.render_one(session.as_ref(), url).await {
                Ok(text) => SourceResult::snippet(
                    SourceKind::PageRender,
                    index,
                    format!("[Rendered Page] URL: {}\n{}", url, text),
                ),
                Err(e) => SourceResult::error(
                    SourceKind::PageRender,
                    index,
                    format!("URL: {} Error: {}", url, e),
                ),
            };
            results.push(entry);
        }

        results
    }

    async fn render_one(
        &self,
        session: &dyn RenderSession,
        url: &str,
    ) -> Result<String, TributaryError> {
        let timeout = self.timeout;
        self.retry
            .run_async(url, move || async move {
                match tokio::time::timeout(timeout, session.render(url)).await {
                    Ok(result) => result,
                    Err(_) => Err(TributaryError::Timeout {
                        url: url.to_string(),
                    }),
                }
            })
            .await
    }
}

/// Static-HTML engine: fetch, keep the main content, convert to Markdown
#[derive(Debug, Clone)]
pub struct MarkdownEngine {
    config: Config,
}

impl MarkdownEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl RenderEngine for MarkdownEngine {
    async fn open(&self) -> Result<Box<dyn RenderSession>, TributaryError> {
        let client = build_http_client(&self.config)?;
        tracing::debug!("Render session opened");
        Ok(Box::new(MarkdownSession { client }))
    }
}

struct MarkdownSession {
    client: Client,
}

#[async_trait]
impl RenderSession for MarkdownSession {
    async fn render(&self, url: &str) -> Result<String, TributaryError> {
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

        let html = response.text().await.map_err(|e| classify(url, e))?;
        html_to_text(url, &html)
    }
}

impl Drop for MarkdownSession {
    fn drop(&mut self) {
        tracing::debug!("Render session closed");
    }
}

/// Converts a page's main content to trimmed Markdown
fn html_to_text(url: &str, html: &str) -> Result<String, TributaryError> {
    let content = extract_main_content(html);
    let markdown = htmd::convert(&content).map_err(|e| TributaryError::Render {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let text = markdown.trim();
    if text.is_empty() {
        return Err(TributaryError::Render {
            url: url.to_string(),
            message: "page has no readable content".to_string(),
        });
    }
    Ok(text.to_string())
}
