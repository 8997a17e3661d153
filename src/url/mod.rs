//! URL handling module for Site-Audit
//!
//! This module provides visited-key normalization, site scoping with wildcard
//! patterns, and the [`CrawlTarget`] type queued by the crawl loop.

mod domain;
mod matcher;
mod normalize;

use crate::config::QueryPolicy;
use crate::UrlError;
use url::Url;

pub use domain::{extract_domain, SiteScope};
pub use matcher::matches_wildcard;
pub use normalize::{
    normalize_key, parse_http_url, request_url, resolve_link, with_default_scheme,
};

/// A URL waiting to be crawled
///
/// `url` is what gets requested; `key` is its normalized form used for the
/// visited set and the queue membership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,
    pub key: String,
    pub depth: u32,
}

impl CrawlTarget {
    /// Builds a target from a resolved link
    pub fn new(url: &Url, depth: u32, policy: QueryPolicy) -> Self {
        let url = request_url(url, policy);
        let key = normalize_key(&url);
        Self { url, key, depth }
    }

    /// Builds the depth-0 target of a crawl
    ///
    /// The start URL keeps its query string regardless of policy.
    pub fn start(url_str: &str) -> Result<Self, UrlError> {
        let url = parse_http_url(url_str)?;
        Ok(Self::new(&url, 0, QueryPolicy::Preserve))
    }
}
