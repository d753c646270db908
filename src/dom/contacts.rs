//! Email and phone number extraction from free text

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

// International form first so "+44 20 7946 0958" is not cut into a local number.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\+\d{1,3}[-.\s]\d{1,4}[-.\s]\d{3,4}[-.\s]?\d{3,4}\b|(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
    )
    .expect("valid phone pattern")
});

/// Asset file names that look like addresses (`logo@2x.png`)
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Email addresses in order of first appearance, without duplicates
pub fn extract_emails(text: &str) -> Vec<String> {
    dedupe(
        EMAIL_RE
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches('.').to_string())
            .filter(|email| {
                let lower = email.to_ascii_lowercase();
                !ASSET_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
            }),
    )
}

/// Phone numbers in order of first appearance, without duplicates
pub fn extract_phones(text: &str) -> Vec<String> {
    dedupe(PHONE_RE.find_iter(text).map(|m| m.as_str().trim().to_string()))
}

/// Keeps the first occurrence of each value, preserving order
pub fn dedupe(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
