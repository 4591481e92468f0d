//! Company registry lookup (EDGAR company browse)
//!
//! The registry answers in HTML with no stable machine-readable schema, so the
//! adapter only classifies the response instead of extracting records.

use crate::sources::http::{HttpSource, StatusCheck};
use crate::sources::{Harvest, SourceAdapter, SourceKind, SourceResult};
use reqwest::StatusCode;

/// Marker the registry prints when a lookup has no hits
const NO_MATCH_MARKER: &str = "No matching companies";

/// Classification of one registry response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOutcome {
    NoMatch,
    Match,
    HttpError(u16),
}

impl RegistryOutcome {
    pub fn classify(status: StatusCode, body: &str) -> Self {
        if status != StatusCode::OK {
            Self::HttpError(status.as_u16())
        } else if body.contains(NO_MATCH_MARKER) {
            Self::NoMatch
        } else {
            Self::Match
        }
    }

    fn into_result(self, query: &str) -> SourceResult {
        let kind = SourceKind::Registry;
        match self {
            Self::NoMatch => SourceResult::snippet(
                kind,
                1,
                format!("Registry: No filings found for '{}'.", query),
            ),
            Self::Match => SourceResult::snippet(
                kind,
                1,
                format!(
                    "Registry: Filings and data retrieved for {}. Check the registry website for details.",
                    query
                ),
            ),
            Self::HttpError(status) => SourceResult::error(
                kind,
                1,
                format!("{} - Unable to retrieve data from registry.", status),
            ),
        }
    }
}

/// Registry-lookup source adapter
pub struct RegistryAdapter {
    http: HttpSource,
}

impl RegistryAdapter {
    pub fn new(http: HttpSource) -> Self {
        Self { http }
    }
}

impl SourceAdapter for RegistryAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Registry
    }

    fn limit(&self) -> usize {
        1
    }

    fn harvest(&self, query: &str) -> Harvest {
        let params = [
            ("company", query.to_string()),
            ("action", "getcompany".to_string()),
        ];
        match self
            .http
            .get("registry lookup", &params, StatusCheck::AcceptAny)
        {
            Ok((status, body)) => {
                let outcome = RegistryOutcome::classify(status, &body);
                tracing::debug!("Registry outcome for '{}': {:?}", query, outcome);
                Harvest::from_results(vec![outcome.into_result(query)])
            }
            Err(e) => Harvest::failed(self.kind(), e),
        }
    }
}
