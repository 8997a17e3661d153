use crate::config::QueryPolicy;
use crate::UrlError;
use url::Url;

/// Parses an absolute HTTP(S) URL
///
/// # Errors
///
/// * `UrlError::Parse` - the string is not a URL
/// * `UrlError::InvalidScheme` - the scheme is not http or https
/// * `UrlError::MissingDomain` - the URL has no host
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Prepends `https://` to user input that carries no scheme
///
/// # Examples
///
/// ```
/// use site_audit::url::with_default_scheme;
///
/// assert_eq!(with_default_scheme("example.com"), "https://example.com");
/// assert_eq!(with_default_scheme("http://example.com"), "http://example.com");
/// ```
pub fn with_default_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Computes the visited-set key of a URL
///
/// # Normalization Steps
///
/// 1. Keep the scheme as-is
/// 2. Lowercase the host, keep a non-default port
/// 3. Normalize the path:
///    - Remove empty and `.` segments, resolve `..`
///    - Remove trailing slash (the root path becomes empty)
/// 4. Drop the query and the fragment
///
/// Normalizing a key again yields the same key.
///
/// # Examples
///
/// ```
/// use site_audit::url::normalize_key;
/// use url::Url;
///
/// let url = Url::parse("https://Example.com/blog/?page=2#top").unwrap();
/// assert_eq!(normalize_key(&url), "https://example.com/blog");
/// ```
pub fn normalize_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!(
        "{}://{}{}{}",
        url.scheme(),
        host,
        port,
        normalize_path(url.path())
    )
}

/// Returns the URL that should actually be requested for a discovered link
///
/// The fragment is always removed; the query survives only under
/// [`QueryPolicy::Preserve`].
pub fn request_url(url: &Url, policy: QueryPolicy) -> Url {
    let mut request = url.clone();
    request.set_fragment(None);
    if policy == QueryPolicy::Ignore || request.query() == Some("") {
        request.set_query(None);
    }
    request
}

/// Resolves an `href` value against the page it appeared on
///
/// Returns `None` when the link should not be followed:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` targets
/// - values that do not resolve, or resolve to a non-HTTP(S) URL
///
/// The fragment of the resolved URL is removed.
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> String {
        normalize_key(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(key("https://example.com/page/"), "https://example.com/page");
    }

    #[test]
    fn test_root_has_empty_path() {
        assert_eq!(key("https://example.com/"), "https://example.com");
        assert_eq!(key("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_remove_fragment_and_query() {
        assert_eq!(
            key("https://example.com/page?b=2&a=1#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_scheme_kept() {
        assert_eq!(key("http://example.com/page"), "http://example.com/page");
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        assert_eq!(key("https://EXAMPLE.COM/Page"), "https://example.com/Page");
    }

    #[test]
    fn test_non_default_port_kept() {
        assert_eq!(key("http://127.0.0.1:8080/a/"), "http://127.0.0.1:8080/a");
        assert_eq!(key("https://example.com:443/a"), "https://example.com/a");
    }

    #[test]
    fn test_multiple_slashes() {
        assert_eq!(
            key("https://example.com///path//to///page"),
            "https://example.com/path/to/page"
        );
    }

    #[test]
    fn test_normalize_path_with_dots() {
        assert_eq!(key("https://example.com/a/../b/./c"), "https://example.com/b/c");
    }

    #[test]
    fn test_key_is_idempotent() {
        let inputs = [
            "https://example.com/",
            "https://example.com/blog/post/",
            "http://127.0.0.1:9000/a/b?x=1#y",
            "https://EXAMPLE.com//docs/./guide/../intro/",
        ];
        for input in inputs {
            let once = key(input);
            let twice = key(&once);
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_request_url_ignore_query() {
        let url = Url::parse("https://example.com/list?page=2#results").unwrap();
        let request = request_url(&url, QueryPolicy::Ignore);
        assert_eq!(request.as_str(), "https://example.com/list");
    }

    #[test]
    fn test_request_url_preserve_query() {
        let url = Url::parse("https://example.com/list?page=2#results").unwrap();
        let request = request_url(&url, QueryPolicy::Preserve);
        assert_eq!(request.as_str(), "https://example.com/list?page=2");
    }

    #[test]
    fn test_request_url_drops_empty_query() {
        let url = Url::parse("https://example.com/list?").unwrap();
        let request = request_url(&url, QueryPolicy::Preserve);
        assert_eq!(request.as_str(), "https://example.com/list");
    }

    #[test]
    fn test_resolve_link() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let resolve = |href: &str| resolve_link(href, &base).map(|u| u.to_string());

        assert_eq!(resolve("/about#team"), Some("https://example.com/about".to_string()));
        assert_eq!(resolve("next"), Some("https://example.com/blog/next".to_string()));
        assert_eq!(resolve("  https://other.com/x "), Some("https://other.com/x".to_string()));
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("#top"), None);
        assert_eq!(resolve("JavaScript:void(0)"), None);
        assert_eq!(resolve("mailto:hi@example.com"), None);
        assert_eq!(resolve("tel:+123"), None);
        assert_eq!(resolve("data:text/plain,hi"), None);
        assert_eq!(resolve("ftp://example.com/file"), None);
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com/").is_ok());
        assert!(parse_http_url("  http://example.com/a  ").is_ok());
        assert!(matches!(
            parse_http_url("ftp://example.com/").unwrap_err(),
            UrlError::InvalidScheme(_)
        ));
        assert!(matches!(
            parse_http_url("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }
}
