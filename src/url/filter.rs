use crate::url::same_domain;
use url::Url;

/// Static-asset extensions the crawler never enqueues (compared case-insensitively)
pub const ASSET_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".png", ".gif", ".css", ".js"];

/// Decides which discovered links may join the crawl frontier
#[derive(Debug, Clone)]
pub struct LinkFilter {
    origin: Url,
    same_domain_only: bool,
}

impl LinkFilter {
    /// Creates a filter anchored at the crawl's start URL
    pub fn new(origin: Url, same_domain_only: bool) -> Self {
        Self {
            origin,
            same_domain_only,
        }
    }

    /// Whether `url` passes every frontier rule
    ///
    /// - scheme is http or https
    /// - host matches the start URL when `same_domain_only` is set
    /// - path does not end in a static-asset extension
    pub fn allows(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if self.same_domain_only && !same_domain(&self.origin, url) {
            return false;
        }

        !is_static_asset(url)
    }
}

/// Whether the URL path ends in a denylisted asset extension
pub fn is_static_asset(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
