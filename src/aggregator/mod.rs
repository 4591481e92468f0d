//! Orchestration of one aggregation run
//!
//! The flow for a query:
//! 1. Structured search, which also yields the crawl candidates
//! 2. Crawl of the top candidates inside a [`CrawlScope`]
//! 3. Academic, news, registry and encyclopedia adapters, in that order
//! 4. Merge into the corpus: search, academic, news, registry,
//!    encyclopedia, crawl
//!
//! Nothing in this flow can make [`Aggregator::aggregate`] fail. Source and
//! page faults are already inline entries; anything else, including a panic,
//! is caught here and reported as the whole corpus.

mod scope;

pub use scope::CrawlScope;

use crate::config::{Config, CrawlMode};
use crate::crawler::{build_http_client, MarkdownEngine, PageFetcher, RenderEngine, RenderingCrawler};
use crate::retry::RetryPolicy;
use crate::sources::{
    build_blocking_client, AcademicAdapter, EncyclopediaAdapter, Harvest, HttpSource, NewsAdapter,
    RegistryAdapter, SearchAdapter, SourceAdapter, SourceKind, SourceResult,
};
use crate::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Separator between corpus entries
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Multi-source aggregator
pub struct Aggregator {
    config: Config,
    retry: RetryPolicy,
    search: Box<dyn SourceAdapter>,

    /// Adapters queried after the crawl, in corpus order
    adapters: Vec<Box<dyn SourceAdapter>>,

    engine: Arc<dyn RenderEngine>,
}

impl Aggregator {
    /// Builds the aggregator with the five default adapters and the Markdown
    /// render engine
    ///
    /// Call this outside any async runtime; the adapters share a blocking
    /// HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_blocking_client(&config)?;
        let retry = RetryPolicy::from(&config.retry);
        let endpoints = &config.endpoints;
        let source = |endpoint: &str| HttpSource::new(client.clone(), endpoint, retry);

        let search = Box::new(SearchAdapter::new(
            source(&endpoints.search),
            &config.credentials,
        ));
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(AcademicAdapter::new(source(&endpoints.academic))),
            Box::new(NewsAdapter::new(source(&endpoints.news), &config.credentials)),
            Box::new(RegistryAdapter::new(source(&endpoints.registry))),
            Box::new(EncyclopediaAdapter::new(source(&endpoints.encyclopedia))),
        ];
        let engine = Arc::new(MarkdownEngine::new(&config));

        Ok(Self::from_parts(config, search, adapters, engine))
    }

    /// Assembles an aggregator from explicit parts
    ///
    /// `adapters` are queried in the given order after the search adapter.
    pub fn from_parts(
        config: Config,
        search: Box<dyn SourceAdapter>,
        adapters: Vec<Box<dyn SourceAdapter>>,
        engine: Arc<dyn RenderEngine>,
    ) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        Self {
            config,
            retry,
            search,
            adapters,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every source for `query` and returns the merged corpus
    ///
    /// Always returns. An unexpected fault yields
    /// `"Unexpected error occurred: <message>"` in place of the corpus.
    pub fn aggregate(&self, query: &str) -> String {
        tracing::info!("Aggregating sources for query: {}", query);
        guarded(|| build_corpus(&self.collect(query)))
    }

    /// Crawls a caller-supplied URL list without querying any source
    ///
    /// The list is capped at the configured crawl limit, like search links.
    pub fn crawl_urls(&self, urls: &[String]) -> String {
        tracing::info!("Crawling {} caller-supplied URLs", urls.len());
        guarded(|| build_corpus(&self.crawl(urls)))
    }

    /// Runs every source for `query`, returning entries in corpus order
    pub fn collect(&self, query: &str) -> Vec<SourceResult> {
        let search = bounded(self.search.as_ref(), query);

        let urls: Vec<String> = search
            .urls
            .iter()
            .map(|candidate| candidate.as_str().to_string())
            .collect();
        let crawled = self.crawl(&urls);

        let mut entries = search.results;
        for adapter in &self.adapters {
            entries.extend(bounded(adapter.as_ref(), query).results);
        }
        entries.extend(crawled);

        tracing::info!(
            "Collected {} entries ({} errors)",
            entries.len(),
            entries.iter().filter(|e| e.is_error()).count()
        );
        entries
    }

    /// Crawls the first `crawl_limit` URLs in the configured mode
    fn crawl(&self, urls: &[String]) -> Vec<SourceResult> {
        let limit = self.config.aggregator.crawl_limit;
        let urls = &urls[..urls.len().min(limit)];
        if urls.is_empty() {
            tracing::info!("No crawl candidates");
            return Vec::new();
        }

        let mode = self.config.aggregator.crawl_mode;
        let kind = match mode {
            CrawlMode::Fetch => SourceKind::PageFetch,
            CrawlMode::Render => SourceKind::PageRender,
        };
        tracing::info!("Crawling {} pages in {} mode", urls.len(), mode);

        let scope = match CrawlScope::enter() {
            Ok(scope) => scope,
            Err(e) => {
                tracing::error!("Cannot start crawl: {}", e);
                return vec![SourceResult::error(kind, 1, e)];
            }
        };

        let timeouts = &self.config.timeouts;
        match mode {
            CrawlMode::Fetch => scope.run(async {
                match build_http_client(&self.config) {
                    Ok(client) => {
                        PageFetcher::new(client, timeouts.fetch(), self.retry)
                            .fetch_all(urls)
                            .await
                    }
                    Err(e) => vec![SourceResult::error(kind, 1, e)],
                }
            }),
            CrawlMode::Render => {
                let crawler =
                    RenderingCrawler::new(self.engine.clone(), timeouts.render(), self.retry);
                scope.run(crawler.render_all(urls))
            }
        }
    }
}

/// Runs one adapter and enforces its result limit
fn bounded(adapter: &dyn SourceAdapter, query: &str) -> Harvest {
    let mut harvest = adapter.harvest(query);
    let limit = adapter.limit();
    if harvest.results.len() > limit {
        tracing::debug!(
            "Truncating {} results from {} to {}",
            adapter.kind(),
            harvest.results.len(),
            limit
        );
        harvest.results.truncate(limit);
    }
    harvest
}

/// Drops blank entries and joins the rest with [`ENTRY_SEPARATOR`]
pub fn build_corpus(entries: &[SourceResult]) -> String {
    entries
        .iter()
        .filter(|entry| !entry.is_blank())
        .map(|entry| entry.body.as_str())
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Converts a panic inside `run` into the unexpected-error corpus
fn guarded<F: FnOnce() -> String>(run: F) -> String {
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(corpus) => corpus,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Aggregation aborted: {}", message);
            format!("Unexpected error occurred: {}", message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
