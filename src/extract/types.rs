//! Structured extraction record types and precedence resolution

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Which strategy produced a value
///
/// Variants are declared in precedence order, so `Ord` ranks the most
/// authoritative strategy lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Embedded schema.org JSON-LD
    Schema,
    /// CSS selector heuristics
    Selector,
    /// Free-text regular expressions
    Regex,
}

/// An extracted entry tagged with its source
pub trait Sourced {
    fn source(&self) -> Source;
}

/// Picks the authoritative entry: first schema, else first selector, else first regex
pub fn preferred<T: Sourced>(entries: &[T]) -> Option<&T> {
    entries.iter().min_by_key(|entry| entry.source())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEntry {
    /// Price as written on the page (`"19.99"`, `"$1,234"`)
    pub value: String,
    pub currency: Option<String>,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingEntry {
    pub value: f64,
    /// Top of the rating scale
    pub max: f64,
    pub count: Option<u64>,
    pub source: Source,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contacts {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

/// A postal address; the parts are only known for schema addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub source: Source,
}

impl Address {
    /// An address known only as one line of text
    pub fn from_text(formatted: String, source: Source) -> Self {
        Self {
            formatted,
            street: None,
            locality: None,
            region: None,
            postal_code: None,
            country: None,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessHours {
    pub hours: Vec<String>,
    pub source: Source,
}

impl Sourced for PriceEntry {
    fn source(&self) -> Source {
        self.source
    }
}

impl Sourced for RatingEntry {
    fn source(&self) -> Source {
        self.source
    }
}

impl Sourced for Address {
    fn source(&self) -> Source {
        self.source
    }
}

/// Everything the structured extractor found on one page
///
/// Candidates from every strategy are kept, in strategy order; use the
/// `best_*` accessors for a single authoritative value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecord {
    pub url: String,
    pub prices: Vec<PriceEntry>,
    pub ratings: Vec<RatingEntry>,
    pub contacts: Contacts,
    pub addresses: Vec<Address>,
    /// Platform name to profile URL
    pub social_links: BTreeMap<String, String>,
    pub business_hours: Option<BusinessHours>,
    /// Raw JSON-LD blocks that parsed successfully
    pub json_ld: Vec<Value>,
}

impl StructuredRecord {
    pub fn best_price(&self) -> Option<&PriceEntry> {
        preferred(&self.prices)
    }

    pub fn best_rating(&self) -> Option<&RatingEntry> {
        preferred(&self.ratings)
    }

    pub fn best_address(&self) -> Option<&Address> {
        preferred(&self.addresses)
    }
}
