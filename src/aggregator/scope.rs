//! The one crossing from blocking code into the async crawl stage
//!
//! Every crawl batch gets its own multi-thread runtime, which is torn down
//! before the batch returns. Nothing async outlives a [`CrawlScope`].

use crate::TributaryError;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};

/// How long teardown waits for stray tasks before abandoning them
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// A private runtime for a single crawl batch
pub struct CrawlScope {
    runtime: Runtime,
}

impl CrawlScope {
    /// Starts a fresh runtime
    ///
    /// Fails when called from inside a tokio runtime; the crawl stage is
    /// never nested into a context it does not own.
    pub fn enter() -> Result<Self, TributaryError> {
        if Handle::try_current().is_ok() {
            return Err(TributaryError::Scope(
                "already inside an async runtime, refusing to start a nested one".to_string(),
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("tributary-crawl")
            .enable_all()
            .build()?;
        tracing::debug!("Crawl scope started");

        Ok(Self { runtime })
    }

    /// Drives `future` to completion, then shuts the runtime down
    pub fn run<F: Future>(self, future: F) -> F::Output {
        let output = self.runtime.block_on(future);
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
        tracing::debug!("Crawl scope closed");
        output
    }
}
