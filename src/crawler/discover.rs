//! Same-site link discovery
//!
//! # Link Extraction Rules
//!
//! **Include:**
//! - `<a href="...">` tags anywhere in the document
//!
//! **Exclude:**
//! - `<a href="..." download>`
//! - `javascript:`, `mailto:`, `tel:` links and data URIs
//! - Empty and fragment-only hrefs
//! - Targets outside the site scope
//!
//! `rel="nofollow"` links are followed.

use crate::config::QueryPolicy;
use crate::url::{resolve_link, CrawlTarget, SiteScope};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static HREF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("Failed to parse anchor selector - this is a bug")
});

/// Parses `html` and returns its same-site link targets
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL relative links are resolved against
/// * `scope` - Hosts that belong to the site
/// * `policy` - Whether request URLs keep their query string
/// * `depth` - Depth assigned to every returned target
///
/// # Example
///
/// ```
/// use site_audit::config::QueryPolicy;
/// use site_audit::crawler::discover;
/// use site_audit::url::SiteScope;
/// use url::Url;
///
/// let html = r#"<a href="/about">About</a><a href="https://other.com/">Other</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let scope = SiteScope::new(&base, &[]).unwrap();
/// let targets = discover(html, &base, &scope, QueryPolicy::Ignore, 1);
/// assert_eq!(targets.len(), 1);
/// assert_eq!(targets[0].key, "https://example.com/about");
/// ```
pub fn discover(
    html: &str,
    base_url: &Url,
    scope: &SiteScope,
    policy: QueryPolicy,
    depth: u32,
) -> Vec<CrawlTarget> {
    let document = Html::parse_document(html);
    discover_in(&document, base_url, scope, policy, depth)
}

/// Same as [`discover`] on an already parsed document
///
/// Targets are unique by key and returned in document order.
pub fn discover_in(
    document: &Html,
    base_url: &Url,
    scope: &SiteScope,
    policy: QueryPolicy,
    depth: u32,
) -> Vec<CrawlTarget> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for element in document.select(&HREF_SELECTOR) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(resolved) = resolve_link(href, base_url) else {
            continue;
        };

        if !scope.contains(&resolved) {
            continue;
        }

        let target = CrawlTarget::new(&resolved, depth, policy);
        if seen.insert(target.key.clone()) {
            targets.push(target);
        }
    }

    targets
}
