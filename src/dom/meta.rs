//! Page metadata extraction (title, description, Open Graph, Twitter cards)

use crate::dom::{clean_text, Document};
use std::collections::BTreeMap;

/// Plain `<meta name>` keys kept in the metadata map
const NAMED_KEYS: &[&str] = &["description", "keywords", "author"];

/// Extracts page metadata into a deterministic map
///
/// Keys: `title`, `canonical`, `description`, `keywords`, `author`, and every
/// `og:*` / `twitter:*` tag. The first occurrence of a key wins.
pub fn extract_meta(document: &Document) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();

    if let Some(title) = document.title() {
        meta.insert("title".to_string(), title);
    }

    if let Some(canonical) = document.attr_of("link[rel=canonical]", "href") {
        meta.insert("canonical".to_string(), canonical);
    }

    for element in document.select_all("meta[content]") {
        let attrs = element.value();
        let Some(key) = attrs.attr("property").or_else(|| attrs.attr("name")) else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if !is_kept_key(&key) {
            continue;
        }

        let value = clean_text(attrs.attr("content").unwrap_or_default());
        if !value.is_empty() {
            meta.entry(key).or_insert(value);
        }
    }

    meta
}

fn is_kept_key(key: &str) -> bool {
    NAMED_KEYS.contains(&key) || key.starts_with("og:") || key.starts_with("twitter:")
}
