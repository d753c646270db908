//! Site crawler
//!
//! Breadth-first traversal from a start URL, bounded by page count and link
//! depth, with a fixed pause between page fetches.

mod state;

pub use state::{CrawlState, QueuedUrl};

use crate::fetch::Fetcher;
use crate::scrape::{scrape_page, PageOptions, PageRecord};
use crate::url::{normalize_url, LinkFilter};
use crate::{limits, ErrorRecord, HarvestError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Pause before every page fetch except the first
pub const CRAWL_DELAY: Duration = Duration::from_millis(300);

/// Crawl bounds
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum pages returned (1..=50)
    pub max_pages: usize,

    /// Maximum link depth followed from the start URL (0..=3)
    pub max_depth: u32,

    /// Only follow links on the start URL's host
    pub same_domain_only: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_depth: 2,
            same_domain_only: true,
        }
    }
}

impl CrawlOptions {
    /// Rejects bounds above the operational caps
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.max_pages == 0 || self.max_pages > limits::MAX_CRAWL_PAGES {
            return Err(HarvestError::validation(format!(
                "max_pages must be between 1 and {}, got {}",
                limits::MAX_CRAWL_PAGES,
                self.max_pages
            )));
        }
        if self.max_depth > limits::MAX_CRAWL_DEPTH {
            return Err(HarvestError::validation(format!(
                "max_depth must be at most {}, got {}",
                limits::MAX_CRAWL_DEPTH,
                self.max_depth
            )));
        }
        Ok(())
    }
}

/// A scraped page tagged with the depth it was found at
#[derive(Debug, Clone, Serialize)]
pub struct CrawledPage {
    pub depth: u32,

    #[serde(flatten)]
    pub page: PageRecord,
}

/// Outcome of one crawl
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub pages: Vec<CrawledPage>,

    /// Distinct URLs that entered the frontier, start URL included
    pub pages_discovered: usize,

    /// Deepest depth among returned pages
    pub max_depth_reached: u32,

    pub errors: Vec<ErrorRecord>,
}

impl CrawlResult {
    /// Number of returned pages per depth
    pub fn pages_per_depth(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for page in &self.pages {
            *counts.entry(page.depth).or_insert(0) += 1;
        }
        counts
    }
}

/// Crawls a site breadth-first from `start_url`
///
/// # Arguments
///
/// * `fetcher` - Shared fetcher
/// * `start_url` - Seed URL (depth 0)
/// * `options` - Page and depth bounds, domain restriction
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Pages in visit order; failed pages, and pages whose
///   redirects leave the crawl's domain, are listed in `errors`
/// * `Err(HarvestError)` - Bounds or start URL rejected before any request
pub async fn crawl(
    fetcher: &Fetcher,
    start_url: &str,
    options: &CrawlOptions,
) -> Result<CrawlResult, HarvestError> {
    options.validate()?;
    let start = normalize_url(start_url)?;

    tracing::info!(
        "Starting crawl of {} (max {} pages, depth {})",
        start,
        options.max_pages,
        options.max_depth
    );

    let filter = LinkFilter::new(start.clone(), options.same_domain_only);
    let mut state = CrawlState::new(start);
    let page_options = PageOptions {
        extract_links: true,
        extract_images: false,
        custom_selectors: BTreeMap::new(),
    };

    let started = Instant::now();
    let mut result = CrawlResult::default();

    while result.pages.len() < options.max_pages {
        let Some(QueuedUrl { url, depth }) = state.next_url() else {
            tracing::debug!("Frontier is empty");
            break;
        };

        if state.visited() > 1 {
            tokio::time::sleep(CRAWL_DELAY).await;
        }

        let page = match scrape_page(fetcher, url.as_str(), &page_options).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to crawl {}: {}", url, e);
                result.errors.push(ErrorRecord::new(url.as_str(), &e));
                continue;
            }
        };

        let landed = normalize_url(&page.final_url).map(|final_url| filter.allows(&final_url));
        if !matches!(landed, Ok(true)) {
            tracing::warn!("{} redirected outside the crawl to {}, skipping", url, page.final_url);
            let error = HarvestError::validation(format!(
                "redirected outside the crawl to {}",
                page.final_url
            ));
            result.errors.push(ErrorRecord::new(url.as_str(), &error));
            continue;
        }

        if depth < options.max_depth {
            let mut added = 0;
            for link in &page.links {
                let Ok(next) = normalize_url(&link.url) else {
                    continue;
                };
                if filter.allows(&next) && state.enqueue(next, depth + 1) {
                    added += 1;
                }
            }
            tracing::debug!("{} added {} URLs at depth {}", url, added, depth + 1);
        }

        result.max_depth_reached = result.max_depth_reached.max(depth);
        result.pages.push(CrawledPage { depth, page });

        if result.pages.len() % 10 == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier",
                result.pages.len(),
                state.pending()
            );
        }
    }

    result.pages_discovered = state.discovered();

    tracing::info!(
        "Crawl completed: {} pages, {} discovered, {} errors in {:?}",
        result.pages.len(),
        result.pages_discovered,
        result.errors.len(),
        started.elapsed()
    );

    Ok(result)
}
