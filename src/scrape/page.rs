//! Single-page scraping into a normalized page record

use crate::dom::contacts::{extract_emails, extract_phones};
use crate::dom::meta::extract_meta;
use crate::dom::{parse_selector, Document, Image, Link};
use crate::fetch::{FetchedHtml, Fetcher};
use crate::url::validate_url;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// What to collect besides content, meta, headings and contacts
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Collect `<a href>` links
    pub extract_links: bool,

    /// Collect `<img>` sources
    pub extract_images: bool,

    /// Extra named CSS selectors; each yields the cleaned text of all matches
    pub custom_selectors: BTreeMap<String, String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            extract_links: true,
            extract_images: true,
            custom_selectors: BTreeMap::new(),
        }
    }
}

/// Headings grouped by level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

/// Normalized content of one fetched page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// The URL that was requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    pub fetched_at: DateTime<Utc>,

    /// Main content text with navigation chrome removed
    pub content: String,

    pub headings: Headings,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub meta: BTreeMap<String, String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,

    /// Results of caller-supplied selectors, keyed by the caller's names
    pub custom: BTreeMap<String, Vec<String>>,

    /// Words in `content`
    pub word_count: usize,
}

/// Rejects unusable custom selectors before any network call
pub fn validate_custom_selectors(selectors: &BTreeMap<String, String>) -> Result<(), HarvestError> {
    for (name, selector) in selectors {
        parse_selector(selector).map_err(|e| {
            HarvestError::validation(format!("custom selector '{}': {}", name, e))
        })?;
    }
    Ok(())
}

/// Fetches and scrapes one page
///
/// Fetch failures are returned verbatim as [`HarvestError::Fetch`], so callers
/// see the same taxonomy the fetcher produced.
///
/// # Example
///
/// ```no_run
/// use page_harvest::config::FetcherConfig;
/// use page_harvest::fetch::Fetcher;
/// use page_harvest::scrape::{scrape_page, PageOptions};
///
/// # async fn example() -> Result<(), page_harvest::HarvestError> {
/// let fetcher = Fetcher::new(&FetcherConfig::default())?;
/// let page = scrape_page(&fetcher, "https://example.com/", &PageOptions::default()).await?;
/// println!("{} words", page.word_count);
/// # Ok(())
/// # }
/// ```
pub async fn scrape_page(
    fetcher: &Fetcher,
    url: &str,
    options: &PageOptions,
) -> Result<PageRecord, HarvestError> {
    let requested = validate_url(url)?;
    validate_custom_selectors(&options.custom_selectors)?;

    let fetched = fetcher
        .fetch(requested.as_str())
        .await
        .into_html(requested.as_str())?;

    let record = build_page_record(requested.as_str(), &fetched, options);
    tracing::debug!(
        "Scraped {} ({} words, {} links)",
        record.url,
        record.word_count,
        record.links.len()
    );
    Ok(record)
}

/// Builds the page record from an already fetched document
pub fn build_page_record(requested_url: &str, fetched: &FetchedHtml, options: &PageOptions) -> PageRecord {
    let document = Document::parse(&fetched.html);
    let base_url = Url::parse(&fetched.final_url)
        .or_else(|_| Url::parse(requested_url))
        .ok();

    let content = document.main_content();
    let body_text = document.body_text();

    let headings = Headings {
        h1: document.all_text_of("h1"),
        h2: document.all_text_of("h2"),
        h3: document.all_text_of("h3"),
    };

    let links = match (&base_url, options.extract_links) {
        (Some(base), true) => document.links(base),
        _ => Vec::new(),
    };

    let images = match (&base_url, options.extract_images) {
        (Some(base), true) => document.images(base),
        _ => Vec::new(),
    };

    let custom = options
        .custom_selectors
        .iter()
        .map(|(name, selector)| (name.clone(), document.all_text_of(selector)))
        .collect();

    PageRecord {
        url: requested_url.to_string(),
        final_url: fetched.final_url.clone(),
        fetched_at: Utc::now(),
        word_count: content.split_whitespace().count(),
        content,
        headings,
        links,
        images,
        meta: extract_meta(&document),
        emails: extract_emails(&body_text),
        phones: extract_phones(&body_text),
        custom,
    }
}
