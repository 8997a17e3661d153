use crate::url::matcher::matches_wildcard;
use crate::UrlError;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_audit::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The set of hosts that belong to the audited site
///
/// A URL is in scope when its host equals one of the site hosts or matches one
/// of the configured extra domain patterns. Ports are not compared.
#[derive(Debug, Clone)]
pub struct SiteScope {
    /// The start host, then any host the start URL redirected to
    hosts: Vec<String>,
    extra_patterns: Vec<String>,
}

impl SiteScope {
    /// Creates the scope of a crawl started at `start`
    ///
    /// # Arguments
    ///
    /// * `start` - The start URL; its host is the first site host
    /// * `extra_patterns` - Wildcard patterns such as `*.example.com`
    ///
    /// # Errors
    ///
    /// Returns `UrlError::MissingDomain` if `start` has no host.
    pub fn new(start: &Url, extra_patterns: &[String]) -> Result<Self, UrlError> {
        let host = extract_domain(start).ok_or(UrlError::MissingDomain)?;
        Ok(Self {
            hosts: vec![host],
            extra_patterns: extra_patterns.iter().map(|p| p.to_lowercase()).collect(),
        })
    }

    /// Adds the host of `url` to the site hosts
    ///
    /// # Returns
    ///
    /// `true` if the host was not in scope before
    pub fn add_host(&mut self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) if !self.contains(url) => {
                self.hosts.push(host);
                true
            }
            _ => false,
        }
    }

    /// Returns true if the URL is part of the site
    pub fn contains(&self, url: &Url) -> bool {
        let Some(host) = extract_domain(url) else {
            return false;
        };

        self.hosts.contains(&host)
            || self
                .extra_patterns
                .iter()
                .any(|pattern| matches_wildcard(pattern, &host))
    }
}
