//! Blocking HTTP plumbing shared by the source adapters

use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::TributaryError;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Builds the blocking HTTP client used by every source adapter
///
/// Must not be called from inside an async runtime; the blocking client owns
/// a runtime of its own.
pub fn build_blocking_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.timeouts.request())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Which response statuses count as a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCheck {
    /// Non-2xx statuses are errors and are retried
    RequireSuccess,
    /// Any status is returned to the caller for classification
    AcceptAny,
}

/// One external endpoint reached through the shared client and retry policy
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl HttpSource {
    pub fn new(client: Client, endpoint: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            retry,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues a GET with the given query parameters and reads the body
    ///
    /// Transport failures, timeouts, body read errors, and (with
    /// [`StatusCheck::RequireSuccess`]) non-2xx statuses are retried.
    /// Errors never carry the full request URL, since query strings may hold
    /// API keys.
    pub fn get(
        &self,
        label: &str,
        params: &[(&str, String)],
        check: StatusCheck,
    ) -> Result<(StatusCode, String), TributaryError> {
        self.retry.run(label, || {
            let response = self
                .client
                .get(&self.endpoint)
                .query(params)
                .send()
                .map_err(|e| self.classify(e))?;

            let status = response.status();
            if check == StatusCheck::RequireSuccess && !status.is_success() {
                return Err(TributaryError::Status {
                    url: self.endpoint.clone(),
                    status: status.as_u16(),
                });
            }

            let body = response.text().map_err(|e| self.classify(e))?;
            Ok((status, body))
        })
    }

    fn classify(&self, error: reqwest::Error) -> TributaryError {
        if error.is_timeout() {
            TributaryError::Timeout {
                url: self.endpoint.clone(),
            }
        } else {
            TributaryError::Http {
                url: self.endpoint.clone(),
                source: error.without_url(),
            }
        }
    }
}
