use crate::UrlError;
use url::Url;

/// Query parameters that only carry campaign tracking and never change page content
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Parses and validates a caller-supplied URL
///
/// The URL must be non-empty, parse as an absolute URL, use the HTTP or HTTPS
/// scheme, and carry a host.
///
/// # Examples
///
/// ```
/// use page_harvest::url::validate_url;
///
/// assert!(validate_url("https://example.com/").is_ok());
/// assert!(validate_url("").is_err());
/// assert!(validate_url("ftp://example.com/").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlError> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

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

/// Normalizes a URL into the identity used for crawl de-duplication
///
/// # Normalization Steps
///
/// 1. Validate (see [`validate_url`]); the host is lowercased by parsing
/// 2. Remove fragment (everything after #)
/// 3. Remove tracking query parameters, keeping the others in their order
/// 4. Remove empty query string (trailing ?)
///
/// # Examples
///
/// ```
/// use page_harvest::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/page?utm_source=x&id=3#reviews").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?id=3");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = validate_url(url_str)?;

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
