/// Checks if a host matches a domain pattern
///
/// Two pattern forms are supported:
/// 1. Exact: `"example.com"` matches only `"example.com"`
/// 2. Wildcard: `"*.example.com"` matches `"example.com"` and any subdomain
///
/// Hosts are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use site_audit::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "blog.example.com"));
/// assert!(!matches_wildcard("*.example.com", "myexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}
