//! Tributary: a multi-source research aggregator
//!
//! This crate queries several independent data sources for a research query,
//! crawls the top pages the search source points at, and merges everything into
//! one ordered text corpus. Any individual source or page may fail without
//! aborting the run; failures show up as readable error lines in the corpus.

pub mod aggregator;
pub mod config;
pub mod crawler;
pub mod output;
pub mod plan;
pub mod retry;
pub mod sources;
pub mod url;

use thiserror::Error;

/// Main error type for Tributary operations
#[derive(Debug, Error)]
pub enum TributaryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Malformed {what} response: {message}")]
    Malformed { what: &'static str, message: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Render error for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Crawl scope error: {0}")]
    Scope(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Tributary operations
pub type Result<T> = std::result::Result<T, TributaryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use aggregator::Aggregator;
pub use config::{Config, CrawlMode};
pub use retry::RetryPolicy;
pub use sources::{Harvest, SourceAdapter, SourceKind, SourceResult};
