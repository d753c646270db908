//! Free-text regex strategy

use crate::extract::types::{PriceEntry, RatingEntry, Source};
use regex::Regex;
use std::sync::LazyLock;

/// Matches kept per pattern
pub const MATCHES_PER_PATTERN: usize = 5;

static PRICE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\$\s?\d+(?:,\d{3})*(?:\.\d{1,2})?", "USD"),
        (r"\bUSD\s?\d+(?:,\d{3})*(?:\.\d{1,2})?", "USD"),
        (r"\b\d+(?:,\d{3})*(?:\.\d{1,2})?\s?(?:USD|(?i:dollars))\b", "USD"),
        (r"£\s?\d+(?:,\d{3})*(?:\.\d{1,2})?", "GBP"),
        (r"€\s?\d+(?:[.,]\d{3})*(?:[.,]\d{1,2})?|\b\d+(?:[.,]\d{3})*(?:[.,]\d{1,2})?\s?€", "EUR"),
    ]
    .into_iter()
    .map(|(pattern, currency)| (Regex::new(pattern).expect("valid price pattern"), currency))
    .collect()
});

static OUT_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*out\s+of\s+(\d+(?:\.\d+)?)").expect("valid rating pattern")
});

static SLASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d(?:\.\d+)?)\s*/\s*(5|10)\b").expect("valid rating pattern")
});

static STARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d(?:\.\d+)?)\s*stars?\b").expect("valid rating pattern")
});

static LABELLED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brating:?\s*(\d+(?:\.\d+)?)").expect("valid rating pattern")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

/// Price mentions in free text, at most five per pattern
pub fn prices(text: &str) -> Vec<PriceEntry> {
    PRICE_PATTERNS
        .iter()
        .flat_map(|(pattern, currency)| {
            pattern
                .find_iter(text)
                .take(MATCHES_PER_PATTERN)
                .map(|m| PriceEntry {
                    value: m.as_str().trim().to_string(),
                    currency: Some(currency.to_string()),
                    source: Source::Regex,
                })
        })
        .collect()
}

/// Rating mentions in free text, at most five per pattern
pub fn ratings(text: &str) -> Vec<RatingEntry> {
    let mut found = Vec::new();

    for regex in [&*OUT_OF_RE, &*SLASH_RE] {
        found.extend(
            regex
                .captures_iter(text)
                .take(MATCHES_PER_PATTERN)
                .filter_map(|caps| rating(caps.get(1)?.as_str(), caps.get(2)?.as_str().parse().ok()?)),
        );
    }

    found.extend(
        STARS_RE
            .captures_iter(text)
            .take(MATCHES_PER_PATTERN)
            .filter_map(|caps| rating(caps.get(1)?.as_str(), 5.0)),
    );

    found.extend(
        LABELLED_RE
            .captures_iter(text)
            .take(MATCHES_PER_PATTERN)
            .filter_map(|caps| {
                let value = caps.get(1)?.as_str();
                rating(value, rating_scale(value.parse().ok()?))
            }),
    );

    found
}

fn rating(value: &str, max: f64) -> Option<RatingEntry> {
    let value: f64 = value.parse().ok()?;
    (max > 0.0 && value <= max).then_some(RatingEntry {
        value,
        max,
        count: None,
        source: Source::Regex,
    })
}

/// Reads a rating out of a short text: `"4.5 out of 5"`, `"8/10"` or a bare number
pub fn parse_rating_text(text: &str) -> Option<(f64, f64)> {
    for regex in [&*OUT_OF_RE, &*SLASH_RE] {
        if let Some(caps) = regex.captures(text) {
            let value = caps.get(1)?.as_str().parse().ok()?;
            let max = caps.get(2)?.as_str().parse().ok()?;
            return Some((value, max));
        }
    }

    let value: f64 = NUMBER_RE.find(text)?.as_str().parse().ok()?;
    Some((value, rating_scale(value)))
}

/// Guesses the rating scale from the value alone
pub fn rating_scale(value: f64) -> f64 {
    if value <= 5.0 {
        5.0
    } else if value <= 10.0 {
        10.0
    } else {
        100.0
    }
}

/// ISO currency code implied by a symbol or code in `text`
pub fn detect_currency(text: &str) -> Option<String> {
    let code = if text.contains('$') || text.contains("USD") {
        "USD"
    } else if text.contains('€') || text.contains("EUR") {
        "EUR"
    } else if text.contains('£') || text.contains("GBP") {
        "GBP"
    } else if text.contains('¥') || text.contains("JPY") {
        "JPY"
    } else {
        return None;
    };
    Some(code.to_string())
}
