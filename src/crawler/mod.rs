//! Crawling of the pages the search source points at
//!
//! Two strategies share this module:
//! - [`PageFetcher`]: concurrent plain GETs reduced to title and description
//! - [`RenderingCrawler`]: one engine session producing full document text
//!
//! Both are async and only run inside the aggregator's crawl scope.

mod fetcher;
mod parser;
mod renderer;

pub use fetcher::{build_http_client, PageFetcher};
pub use parser::{extract_main_content, parse_summary, PageSummary};
pub use renderer::{MarkdownEngine, RenderEngine, RenderSession, RenderingCrawler};
