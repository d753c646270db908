//! Page-Harvest: web content extraction and crawling engine
//!
//! This crate fetches pages with retry/backoff, crawls sites breadth-first
//! under domain and depth bounds, scrapes many URLs with bounded concurrency,
//! and extracts structured data (prices, ratings, contacts, addresses, social
//! links, business hours, products) from raw HTML.
//!
//! Persistence of the returned records is left to the caller.

pub mod config;
pub mod crawler;
pub mod dom;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod product;
pub mod scrape;
pub mod url;

use serde::Serialize;
use thiserror::Error;

/// Main error type for Page-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        kind: ErrorKind,
        status_code: Option<u16>,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl HarvestError {
    /// Maps this error onto the engine's error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { kind, .. } => *kind,
            Self::Config(_) | Self::Validation(_) | Self::UrlError(_) => ErrorKind::ValidationError,
            Self::Reqwest(_) => ErrorKind::ConnectionError,
        }
    }

    /// Builds a validation error from any displayable message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Error taxonomy shared by fetch results and per-URL error records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Host is actively blocking (HTTP 403), never retried
    Forbidden,
    /// HTTP 429 persisted through every retry
    RateLimited,
    /// Request timed out on every attempt
    Timeout,
    /// Transport-level failure (refused, reset, DNS, body read)
    ConnectionError,
    /// Non-2xx status other than 403/429
    HttpError,
    /// Malformed embedded data; only used for diagnostics
    ParseError,
    /// Caller exceeded a cap or passed an unusable argument
    ValidationError,
}

impl ErrorKind {
    /// The serialized name (`rate_limited`, `http_error`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::ConnectionError => "connection_error",
            Self::HttpError => "http_error",
            Self::ParseError => "parse_error",
            Self::ValidationError => "validation_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("URL cannot be empty")]
    Empty,
}

/// Structured failure entry for one URL of a multi-URL operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub success: bool,
    pub url: String,
    pub error: String,
    pub error_kind: Option<ErrorKind>,
}

impl ErrorRecord {
    /// Records `error` as the failure for `url`
    pub fn new(url: impl Into<String>, error: &HarvestError) -> Self {
        Self {
            success: false,
            url: url.into(),
            error: error.to_string(),
            error_kind: Some(error.kind()),
        }
    }
}

/// Operational caps enforced at the engine boundary, before any network call
pub mod limits {
    /// Maximum URLs accepted by one batch scrape
    pub const MAX_BATCH_URLS: usize = 100;
    /// Upper bound on concurrent fetches within a batch
    pub const MAX_CONCURRENT: usize = 10;
    /// Maximum pages one crawl may return
    pub const MAX_CRAWL_PAGES: usize = 50;
    /// Maximum link depth one crawl may follow
    pub const MAX_CRAWL_DEPTH: u32 = 3;
    /// Maximum products one listing scrape may return
    pub const MAX_LISTING_PRODUCTS: usize = 100;
    /// Maximum listing pages one listing scrape may visit
    pub const MAX_LISTING_PAGES: usize = 5;
    /// Maximum products per comparison
    pub const MAX_COMPARE_URLS: usize = 10;
}

/// Result type alias for Page-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::Engine;
pub use fetch::{FetchOptions, FetchResult, Fetcher};
pub use url::{extract_domain, normalize_url};
