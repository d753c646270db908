//! Bounded-concurrency scraping of many URLs

use crate::fetch::Fetcher;
use crate::scrape::page::{scrape_page, validate_custom_selectors, PageOptions, PageRecord};
use crate::{limits, ErrorRecord, HarvestError};
use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;

/// Batch scraping parameters
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// URLs fetched concurrently per batch (clamped to 1..=10)
    pub max_concurrent: usize,

    /// Pause between consecutive batches
    pub delay_between_batches: Duration,

    /// Per-page extraction options
    pub page: PageOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            delay_between_batches: Duration::from_millis(500),
            page: PageOptions::default(),
        }
    }
}

/// Outcome of a batch scrape; partial success is the norm
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub results: Vec<PageRecord>,
    pub errors: Vec<ErrorRecord>,
}

/// Scrapes every URL, `max_concurrent` at a time
///
/// URLs are split into consecutive batches. All pages in a batch are scraped
/// concurrently and the batch completes before the next one starts. A failed
/// URL becomes an entry in `errors` and never stops the remaining work.
///
/// # Errors
///
/// Only caller mistakes fail the whole call: more than 100 URLs or an invalid
/// custom selector, both rejected before any request is made.
pub async fn scrape_many(
    fetcher: &Fetcher,
    urls: &[String],
    options: &BatchOptions,
) -> Result<BatchResult, HarvestError> {
    if urls.len() > limits::MAX_BATCH_URLS {
        return Err(HarvestError::validation(format!(
            "batch accepts at most {} URLs, got {}",
            limits::MAX_BATCH_URLS,
            urls.len()
        )));
    }
    validate_custom_selectors(&options.page.custom_selectors)?;

    let concurrency = options.max_concurrent.clamp(1, limits::MAX_CONCURRENT);
    let batch_count = urls.len().div_ceil(concurrency);
    let mut outcome = BatchResult::default();

    for (index, batch) in urls.chunks(concurrency).enumerate() {
        if index > 0 {
            tokio::time::sleep(options.delay_between_batches).await;
        }

        tracing::info!(
            "Scraping batch {}/{} ({} URLs)",
            index + 1,
            batch_count,
            batch.len()
        );

        let pages = join_all(batch.iter().map(|url| scrape_page(fetcher, url, &options.page))).await;

        for (url, page) in batch.iter().zip(pages) {
            match page {
                Ok(record) => outcome.results.push(record),
                Err(e) => {
                    tracing::warn!("Failed to scrape {}: {}", url, e);
                    outcome.errors.push(ErrorRecord::new(url.as_str(), &e));
                }
            }
        }
    }

    tracing::info!(
        "Batch scrape finished: {} succeeded, {} failed",
        outcome.results.len(),
        outcome.errors.len()
    );

    Ok(outcome)
}
