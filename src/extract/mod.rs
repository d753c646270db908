//! Structured data extraction
//!
//! Three strategies run independently for each data category, in fixed
//! order: embedded schema.org JSON-LD, CSS selectors, then free-text regular
//! expressions. Their candidates are appended to the same list, each tagged
//! with its [`Source`]; [`preferred`] picks the authoritative one.

pub mod patterns;
pub mod schema;
pub mod selectors;
mod types;

pub use types::{
    preferred, Address, BusinessHours, Contacts, PriceEntry, RatingEntry, Source, Sourced,
    StructuredRecord,
};

use crate::dom::contacts::{dedupe, extract_emails, extract_phones};
use crate::dom::Document;
use crate::fetch::Fetcher;
use crate::url::validate_url;
use crate::HarvestError;
use url::Url;

/// Total price entries kept across all strategies
pub const MAX_PRICES: usize = 20;

/// Data categories to extract
///
/// Social links and business hours are always extracted. Turning off
/// `json_ld` disables the schema strategy for every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub prices: bool,
    pub ratings: bool,
    pub contacts: bool,
    pub addresses: bool,
    pub json_ld: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            prices: true,
            ratings: true,
            contacts: true,
            addresses: true,
            json_ld: true,
        }
    }
}

/// Fetches a page and extracts its structured data
pub async fn extract(
    fetcher: &Fetcher,
    url: &str,
    options: &ExtractOptions,
) -> Result<StructuredRecord, HarvestError> {
    let requested = validate_url(url)?;
    let fetched = fetcher
        .fetch(requested.as_str())
        .await
        .into_html(requested.as_str())?;
    let base_url = Url::parse(&fetched.final_url).unwrap_or(requested);

    Ok(extract_from_html(&fetched.html, &base_url, options))
}

/// Extracts structured data from already fetched HTML
///
/// Deterministic: the same input always yields the same record, entries in
/// the same order.
pub fn extract_from_html(html: &str, base_url: &Url, options: &ExtractOptions) -> StructuredRecord {
    let document = Document::parse(html);
    let json_ld = if options.json_ld {
        schema::parse_json_ld(&document)
    } else {
        Vec::new()
    };
    let nodes = schema::schema_nodes(&json_ld);
    let body_text = document.body_text();

    let mut record = StructuredRecord {
        url: base_url.to_string(),
        ..StructuredRecord::default()
    };

    if options.prices {
        record.prices.extend(schema::prices(&nodes));
        record.prices.extend(selectors::prices(&document));
        record.prices.extend(patterns::prices(&body_text));
        record.prices.truncate(MAX_PRICES);
    }

    if options.ratings {
        record.ratings.extend(schema::ratings(&nodes));
        record.ratings.extend(selectors::ratings(&document));
        record.ratings.extend(patterns::ratings(&body_text));
    }

    if options.contacts {
        let mailto = document
            .select_all("a[href^=\"mailto:\"]")
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| href.get(7..))
            .map(|address| address.split('?').next().unwrap_or_default().trim().to_string())
            .filter(|address| !address.is_empty());

        record.contacts.emails = dedupe(extract_emails(&body_text).into_iter().chain(mailto));
        record.contacts.phones = extract_phones(&body_text);
    }

    if options.addresses {
        record.addresses.extend(schema::addresses(&nodes));
        record.addresses.extend(selectors::addresses(&document));
    }

    record.social_links = selectors::social_links(&document, base_url);
    record.business_hours =
        schema::business_hours(&nodes).or_else(|| selectors::business_hours(&document));

    tracing::debug!(
        "Extracted from {}: {} prices, {} ratings, {} addresses, {} social links",
        record.url,
        record.prices.len(),
        record.ratings.len(),
        record.addresses.len(),
        record.social_links.len()
    );

    record.json_ld = json_ld;
    record
}
