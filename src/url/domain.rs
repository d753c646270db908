use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_harvest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Whether two URLs share host and effective port
///
/// Subdomains count as different sites: `blog.example.com` is not `example.com`.
pub fn same_domain(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}

/// Whether `url`'s host is `domain` or one of its subdomains
pub fn host_matches(url: &Url, domain: &str) -> bool {
    extract_domain(url)
        .map(|host| host == domain || host.ends_with(&format!(".{}", domain)))
        .unwrap_or(false)
}
