//! Engine facade
//!
//! One [`Engine`] owns a pooled [`Fetcher`] and the loaded configuration and
//! exposes every operation with the configured defaults. Each call owns its
//! own working state; the engine itself is only read.

use crate::config::{load_config_with_hash, validate, Config};
use crate::crawler::{crawl, CrawlOptions, CrawlResult};
use crate::extract::{extract, ExtractOptions, StructuredRecord};
use crate::fetch::{FetchResult, Fetcher};
use crate::product::{
    compare_products, scrape_listing, scrape_product, ComparisonResult, ListingOptions,
    ListingResult, ProductRecord, ProductSelectors,
};
use crate::scrape::{scrape_many, scrape_page, BatchOptions, BatchResult, PageOptions, PageRecord};
use crate::HarvestError;
use std::path::Path;
use std::time::Duration;

/// Entry point for all fetch, scrape, crawl and extraction operations
#[derive(Debug)]
pub struct Engine {
    config: Config,
    fetcher: Fetcher,
}

impl Engine {
    /// Creates an engine from an already loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Configuration valid and HTTP client built
    /// * `Err(HarvestError)` - Invalid configuration or client construction failure
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let fetcher = Fetcher::new(&config.fetcher)?;
        Ok(Self { config, fetcher })
    }

    /// Loads a TOML configuration file and creates an engine from it
    pub fn from_path(path: &Path) -> Result<Self, HarvestError> {
        let (config, hash) = load_config_with_hash(path)?;
        tracing::info!("Loaded configuration {} (sha256 {})", path.display(), hash);
        Self::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Raw fetch with the configured retry settings
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.fetcher.fetch(url).await
    }

    pub async fn scrape_page(&self, url: &str, options: &PageOptions) -> Result<PageRecord, HarvestError> {
        scrape_page(&self.fetcher, url, options).await
    }

    /// Batch options from the `[batch]` section
    pub fn batch_options(&self, page: PageOptions) -> BatchOptions {
        BatchOptions {
            max_concurrent: self.config.batch.max_concurrent,
            delay_between_batches: Duration::from_millis(self.config.batch.delay_between_batches_ms),
            page,
        }
    }

    pub async fn scrape_many(&self, urls: &[String], options: &BatchOptions) -> Result<BatchResult, HarvestError> {
        scrape_many(&self.fetcher, urls, options).await
    }

    /// Crawl bounds from the `[crawler]` section
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.config.crawler.max_pages,
            max_depth: self.config.crawler.max_depth,
            same_domain_only: self.config.crawler.same_domain_only,
        }
    }

    pub async fn crawl(&self, start_url: &str, options: &CrawlOptions) -> Result<CrawlResult, HarvestError> {
        crawl(&self.fetcher, start_url, options).await
    }

    pub async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<StructuredRecord, HarvestError> {
        extract(&self.fetcher, url, options).await
    }

    pub async fn scrape_product(
        &self,
        url: &str,
        selectors: &ProductSelectors,
    ) -> Result<ProductRecord, HarvestError> {
        scrape_product(&self.fetcher, url, selectors).await
    }

    /// Listing options from the `[listing]` section
    pub fn listing_options(&self, product_selector: impl Into<String>) -> ListingOptions {
        ListingOptions {
            max_products: self.config.listing.max_products,
            max_pages: self.config.listing.max_pages,
            page_delay: Duration::from_millis(self.config.listing.page_delay_ms),
            ..ListingOptions::new(product_selector)
        }
    }

    pub async fn scrape_listing(&self, url: &str, options: &ListingOptions) -> Result<ListingResult, HarvestError> {
        scrape_listing(&self.fetcher, url, options).await
    }

    pub async fn compare_products(&self, urls: &[String]) -> Result<ComparisonResult, HarvestError> {
        compare_products(&self.fetcher, urls).await
    }
}
