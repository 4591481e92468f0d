use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters removed from candidate URLs
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// A page URL discovered through search, in the rank order of its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCandidate {
    /// 1-based rank in the search results
    pub rank: usize,

    /// The cleaned URL
    pub url: Url,
}

impl UrlCandidate {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Cleans a raw link into a crawlable URL
///
/// # Cleaning Steps
///
/// 1. Trim whitespace and parse; reject if malformed or relative
/// 2. Reject schemes other than `http` and `https`
/// 3. Reject URLs without a host
/// 4. Remove the fragment
/// 5. Remove tracking query parameters, dropping an emptied query string
///
/// # Examples
///
/// ```
/// use tributary::url::clean_candidate;
///
/// let url = clean_candidate("https://example.com/a?utm_source=x&id=3#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/a?id=3");
/// ```
pub fn clean_candidate(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(raw.to_string()));
    }

    url.set_fragment(None);

    if let Some(query) = url.query() {
        let segments: Vec<&str> = query.split('&').collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| !is_tracking_segment(segment))
            .collect();

        // Kept parameters stay byte-for-byte as they were written
        if kept.len() != segments.len() {
            let rebuilt = kept.join("&");
            url.set_query((!rebuilt.is_empty()).then_some(rebuilt.as_str()));
        }
    }

    Ok(url)
}

fn is_tracking_segment(segment: &str) -> bool {
    let key = segment.split_once('=').map_or(segment, |(key, _)| key);
    TRACKING_PARAMS.contains(&key)
}
