//! URL handling for crawl candidates
//!
//! Search results hand back links of uneven quality. Before a link reaches the
//! crawler it is parsed, checked for an `http`/`https` scheme and a host, and
//! stripped of fragments and tracking parameters.

mod candidate;

pub use candidate::{clean_candidate, UrlCandidate};
