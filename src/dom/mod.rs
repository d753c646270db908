//! DOM query layer over parsed HTML
//!
//! Every higher component reads pages through [`Document`]. Text surfaced by
//! these helpers is already cleaned (whitespace collapsed, ends trimmed), so
//! callers never clean it a second time.

pub mod contacts;
pub mod meta;

use crate::HarvestError;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use url::Url;

/// Elements whose text never counts as page content
pub const CHROME_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Elements that separate the text around them
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Candidates for the main content root, tried in order
const CONTENT_ROOTS: &[&str] = &["main", "article", "body"];

/// A hyperlink with an absolute target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// An image with an absolute source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// All elements matching `selector`; an unparsable selector matches nothing
    pub fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                tracing::debug!("Skipping invalid selector '{}': {}", selector, e);
                Vec::new()
            }
        }
    }

    /// Cleaned text of the first match with non-empty text
    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.select_all(selector)
            .into_iter()
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    /// Cleaned text of every match, empty entries excluded
    pub fn all_text_of(&self, selector: &str) -> Vec<String> {
        self.select_all(selector)
            .into_iter()
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Trimmed value of `attr` on the first match carrying a non-empty value
    pub fn attr_of(&self, selector: &str, attr: &str) -> Option<String> {
        self.select_all(selector).into_iter().find_map(|el| {
            el.value()
                .attr(attr)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    }

    /// Text of the `<title>` element
    pub fn title(&self) -> Option<String> {
        self.text_of("title")
    }

    /// All followable links, resolved against `base_url`
    pub fn links(&self, base_url: &Url) -> Vec<Link> {
        self.select_all("a[href]")
            .into_iter()
            .filter(|el| el.value().attr("download").is_none())
            .filter_map(|el| {
                let href = el.value().attr("href")?;
                let url = resolve_link(href, base_url)?;
                Some(Link {
                    url: url.to_string(),
                    text: element_text(&el),
                })
            })
            .collect()
    }

    /// All images, resolved against `base_url`
    pub fn images(&self, base_url: &Url) -> Vec<Image> {
        self.select_all("img")
            .into_iter()
            .filter_map(|el| {
                let src = el
                    .value()
                    .attr("src")
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| el.value().attr("data-src"))?;
                let url = resolve_link(src, base_url)?;
                Some(Image {
                    url: url.to_string(),
                    alt: el.value().attr("alt").map(clean_text).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Cleaned text of the main content root with page chrome removed
    ///
    /// The root is the first of `<main>`, `<article>`, `<body>` present.
    pub fn main_content(&self) -> String {
        CONTENT_ROOTS
            .iter()
            .find_map(|root| self.select_all(root).into_iter().next())
            .map(|root| visible_text(root, CHROME_ELEMENTS))
            .unwrap_or_else(|| visible_text(self.html.root_element(), CHROME_ELEMENTS))
    }

    /// Cleaned text of the whole `<body>` with scripts and styles removed
    pub fn body_text(&self) -> String {
        self.select_all("body")
            .into_iter()
            .next()
            .map(|body| visible_text(body, &["script", "style", "noscript"]))
            .unwrap_or_default()
    }
}

/// Collapses runs of whitespace to a single space and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text content of an element
///
/// Inline markup joins without a gap (`$<b>24</b>.99` reads `$24.99`);
/// block-level children are kept apart.
pub fn element_text(element: &ElementRef) -> String {
    visible_text(*element, &[])
}

/// Cleaned text of an element, skipping the subtrees of `skip` elements
pub fn visible_text(element: ElementRef, skip: &[&str]) -> String {
    let mut raw = String::new();
    collect_text(element, skip, &mut raw);
    clean_text(&raw)
}

fn collect_text(element: ElementRef, skip: &[&str], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if !skip.contains(&el.name()) => {
                let block = BLOCK_ELEMENTS.contains(&el.name());
                if block {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, skip, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Parses a caller-supplied CSS selector, rejecting it as a validation error
pub fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| {
        HarvestError::validation(format!("Invalid CSS selector '{}': {}", selector, e))
    })
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
