//! CSS selector strategy and anchor scanning

use crate::dom::{clean_text, element_text, Document};
use crate::extract::patterns::{detect_currency, parse_rating_text};
use crate::extract::types::{Address, BusinessHours, PriceEntry, RatingEntry, Source};
use crate::url::host_matches;
use scraper::ElementRef;
use std::collections::{BTreeMap, HashSet};
use url::Url;

pub const PRICE_SELECTORS: &[&str] = &[
    "[itemprop=\"price\"]",
    "[data-price]",
    ".price",
    ".product-price",
    ".sale-price",
    ".offer-price",
];

pub const RATING_SELECTORS: &[&str] = &[
    "[itemprop=\"ratingValue\"]",
    "[data-rating]",
    ".rating",
    ".star-rating",
    ".review-rating",
];

pub const ADDRESS_SELECTORS: &[&str] = &[
    "[itemprop=\"address\"]",
    "address",
    ".address",
    ".location-address",
];

pub const HOURS_SELECTORS: &[&str] = &[
    "[itemprop=\"openingHours\"]",
    ".business-hours",
    ".opening-hours",
    ".hours",
    "#hours",
];

/// Platform name and the hosts that identify it
pub const SOCIAL_PLATFORMS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com", "fb.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("instagram", &["instagram.com"]),
    ("linkedin", &["linkedin.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("tiktok", &["tiktok.com"]),
    ("pinterest", &["pinterest.com"]),
];

/// Elements matching any selector, each element once, in table order
fn matching_elements<'a>(document: &'a Document, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    selectors
        .iter()
        .flat_map(|selector| document.select_all(selector))
        .filter(|element| seen.insert(element.id()))
        .collect()
}

/// Text of an element, preferring a machine-readable attribute
pub(crate) fn value_of(element: &ElementRef, attrs: &[&str]) -> String {
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(clean_text)
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| element_text(element))
}

pub fn prices(document: &Document) -> Vec<PriceEntry> {
    matching_elements(document, PRICE_SELECTORS)
        .into_iter()
        .filter_map(|element| {
            let value = value_of(&element, &["content", "data-price"]);
            if !value.chars().any(|c| c.is_ascii_digit()) {
                return None;
            }
            let currency = element
                .value()
                .attr("data-currency")
                .map(str::to_string)
                .or_else(|| detect_currency(&value));
            Some(PriceEntry {
                value,
                currency,
                source: Source::Selector,
            })
        })
        .collect()
}

pub fn ratings(document: &Document) -> Vec<RatingEntry> {
    matching_elements(document, RATING_SELECTORS)
        .into_iter()
        .filter_map(|element| {
            let text = value_of(&element, &["content", "data-rating", "aria-label"]);
            let (value, max) = parse_rating_text(&text)?;
            (value <= max).then_some(RatingEntry {
                value,
                max,
                count: None,
                source: Source::Selector,
            })
        })
        .collect()
}

pub fn addresses(document: &Document) -> Vec<Address> {
    matching_elements(document, ADDRESS_SELECTORS)
        .into_iter()
        .map(|element| element_text(&element))
        .filter(|text| !text.is_empty())
        .map(|text| Address::from_text(text, Source::Selector))
        .collect()
}

/// Text of the first non-empty hours element
pub fn business_hours(document: &Document) -> Option<BusinessHours> {
    let text = matching_elements(document, HOURS_SELECTORS)
        .into_iter()
        .map(|element| value_of(&element, &["content"]))
        .find(|text| !text.is_empty())?;

    Some(BusinessHours {
        hours: vec![text],
        source: Source::Selector,
    })
}

/// First profile link per platform, scanning anchors in document order
pub fn social_links(document: &Document, base_url: &Url) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();

    for link in document.links(base_url) {
        let Ok(url) = Url::parse(&link.url) else {
            continue;
        };
        for (platform, hosts) in SOCIAL_PLATFORMS {
            if found.contains_key(*platform) {
                continue;
            }
            if hosts.iter().any(|host| host_matches(&url, host)) {
                found.insert(platform.to_string(), link.url.clone());
                break;
            }
        }
    }

    found
}
