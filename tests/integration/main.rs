//! Integration tests for Tributary
//!
//! The aggregator is synchronous and owns its async crawl stage, so these
//! tests are plain `#[test]` functions. Mock servers run on wiremock's own
//! threads; a small runtime is kept around only to start and mount them.

mod aggregate_tests;
mod harness;
