//! Source adapters for external data sources
//!
//! Each adapter issues one blocking request per query (wrapped in the shared
//! [`RetryPolicy`]), parses the response, and turns it into labeled text
//! blocks. Adapters never fail: every fault becomes exactly one error
//! [`SourceResult`], so a broken source cannot take the others down.
//!
//! | Adapter | Kind | Limit | Default service |
//! |---------|------|-------|-----------------|
//! | [`SearchAdapter`] | structured-search | 5 | Custom Search JSON API |
//! | [`AcademicAdapter`] | academic | 3 | arXiv Atom API |
//! | [`NewsAdapter`] | news | 5 | NewsAPI |
//! | [`RegistryAdapter`] | registry | 1 | EDGAR company browse |
//! | [`EncyclopediaAdapter`] | encyclopedia | 1 | MediaWiki extracts |

mod academic;
mod encyclopedia;
mod http;
mod news;
mod registry;
mod search;

pub use academic::{parse_atom_entries, truncate_summary, AcademicAdapter, AtomEntry};
pub use encyclopedia::EncyclopediaAdapter;
pub use http::{build_blocking_client, HttpSource, StatusCheck};
pub use news::NewsAdapter;
pub use registry::{RegistryAdapter, RegistryOutcome};
pub use search::SearchAdapter;

use crate::url::UrlCandidate;
use std::fmt;

/// Where a [`SourceResult`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    StructuredSearch,
    Academic,
    News,
    Registry,
    Encyclopedia,
    PageFetch,
    PageRender,
}

impl SourceKind {
    /// Human-readable label used in corpus entries
    pub fn label(&self) -> &'static str {
        match self {
            Self::StructuredSearch => "Search",
            Self::Academic => "Academic",
            Self::News => "News",
            Self::Registry => "Registry",
            Self::Encyclopedia => "Encyclopedia",
            Self::PageFetch => "Fetch",
            Self::PageRender => "Render",
        }
    }

}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StructuredSearch => "structured-search",
            Self::Academic => "academic",
            Self::News => "news",
            Self::Registry => "registry",
            Self::Encyclopedia => "encyclopedia",
            Self::PageFetch => "page-fetch",
            Self::PageRender => "page-render",
        };
        write!(f, "{}", name)
    }
}

/// One labeled text block of the corpus
///
/// Snippets and error descriptions share this shape; they differ only in the
/// text of `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    pub kind: SourceKind,

    /// 1-based position within the producing adapter's output
    pub index: usize,

    pub body: String,
}

impl SourceResult {
    pub fn snippet(kind: SourceKind, index: usize, body: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            body: body.into(),
        }
    }

    /// An inline error entry
    ///
    /// Adapters produce `"<Label> Error: <detail>"`. Crawl entries keep the
    /// bracketed shape of their successful counterparts:
    /// `"[Fetched Page i] Error fetching content: <detail>"` and
    /// `"[Render Error] <detail>"`.
    pub fn error(kind: SourceKind, index: usize, detail: impl fmt::Display) -> Self {
        let body = match kind {
            SourceKind::PageFetch => {
                format!("[Fetched Page {}] Error fetching content: {}", index, detail)
            }
            SourceKind::PageRender => format!("[Render Error] {}", detail),
            _ => format!("{} Error: {}", kind.label(), detail),
        };
        Self { kind, index, body }
    }

    pub fn is_error(&self) -> bool {
        match self.kind {
            SourceKind::PageFetch => self.body.starts_with(&format!(
                "[Fetched Page {}] Error fetching content:",
                self.index
            )),
            SourceKind::PageRender => self.body.starts_with("[Render Error]"),
            _ => self.body.starts_with(&format!("{} Error:", self.kind.label())),
        }
    }

    /// True when the body carries no visible text
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Everything one adapter contributes for one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub results: Vec<SourceResult>,

    /// Crawl candidates, in source rank order (only search fills this)
    pub urls: Vec<UrlCandidate>,
}

impl Harvest {
    pub fn from_results(results: Vec<SourceResult>) -> Self {
        Self {
            results,
            urls: Vec::new(),
        }
    }

    /// A harvest holding a single error entry and no URLs
    pub fn failed(kind: SourceKind, detail: impl fmt::Display) -> Self {
        tracing::error!("{} source failed: {}", kind, detail);
        Self::from_results(vec![SourceResult::error(kind, 1, detail)])
    }
}

/// A single external data source
///
/// Implementations must contain their own failures: `harvest` always returns,
/// and never more than `limit()` results.
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Maximum number of results this adapter contributes per query
    fn limit(&self) -> usize;

    fn harvest(&self, query: &str) -> Harvest;
}

/// Returns `text` trimmed, or `placeholder` when it is missing or blank
pub(crate) fn or_placeholder(text: Option<&str>, placeholder: &str) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => placeholder.to_string(),
    }
}
