//! Configuration module for Tributary
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every table is optional; a missing file section falls back to the defaults
//! that point each source at its public endpoint. Credentials may also come
//! from the environment, see [`Credentials::fill_from_env`].
//!
//! # Example
//!
//! ```no_run
//! use tributary::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tributary.toml")).unwrap();
//! println!("Crawling at most {} pages", config.aggregator.crawl_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AggregatorConfig, Config, CrawlMode, Credentials, EndpointConfig, RetryConfig, TimeoutConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
