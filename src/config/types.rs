use serde::Deserialize;

/// Main configuration structure for Page-Harvest
///
/// Every section is optional; missing sections fall back to the engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Attempts per fetch call
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Replacement user-agent pool; the built-in pool is used when absent
    #[serde(rename = "user-agents")]
    pub user_agents: Option<Vec<String>>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            user_agents: None,
        }
    }
}

/// Batch scraping behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of URLs fetched concurrently per batch
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Pause between consecutive batches (milliseconds)
    #[serde(rename = "delay-between-batches-ms")]
    pub delay_between_batches_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            delay_between_batches_ms: 500,
        }
    }
}

/// Site crawl defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum pages returned by one crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum depth to follow from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Only follow links on the start URL's host
    #[serde(rename = "same-domain-only")]
    pub same_domain_only: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 2,
            same_domain_only: true,
        }
    }
}

/// Listing scrape defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum products collected across all listing pages
    #[serde(rename = "max-products")]
    pub max_products: usize,

    /// Maximum listing pages followed through pagination
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Pause between listing pages (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_products: 20,
            max_pages: 1,
            page_delay_ms: 500,
        }
    }
}
