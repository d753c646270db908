//! Category and search listing pages

use crate::dom::{element_text, parse_selector, resolve_link, Document};
use crate::extract::patterns::parse_rating_text;
use crate::extract::selectors::value_of;
use crate::fetch::Fetcher;
use crate::url::validate_url;
use crate::{limits, ErrorRecord, HarvestError};
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

const ITEM_NAME_SELECTORS: &[&str] = &[
    "[itemprop=\"name\"]",
    ".product-title",
    ".product-name",
    ".title",
    "h2",
    "h3",
    "h4",
];
const ITEM_PRICE_SELECTORS: &[&str] = &["[itemprop=\"price\"]", "[data-price]", ".price", ".product-price"];
const ITEM_RATING_SELECTORS: &[&str] = &["[itemprop=\"ratingValue\"]", ".rating", ".star-rating"];

/// Listing scrape parameters
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Selector matching one element per product
    pub product_selector: String,

    /// Products to collect before stopping (1..=100)
    pub max_products: usize,

    /// Selector of the next-page link
    pub pagination_selector: Option<String>,

    /// Listing pages to visit (1..=5)
    pub max_pages: usize,

    /// Pause between listing pages
    pub page_delay: Duration,
}

impl ListingOptions {
    pub fn new(product_selector: impl Into<String>) -> Self {
        Self {
            product_selector: product_selector.into(),
            max_products: 20,
            pagination_selector: None,
            max_pages: 1,
            page_delay: Duration::from_millis(500),
        }
    }

    /// Rejects missing or unparsable selectors and out-of-range bounds
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.product_selector.trim().is_empty() {
            return Err(HarvestError::validation("product selector is required"));
        }
        parse_selector(&self.product_selector)?;
        if let Some(pagination) = &self.pagination_selector {
            parse_selector(pagination)?;
        }
        if self.max_products == 0 || self.max_products > limits::MAX_LISTING_PRODUCTS {
            return Err(HarvestError::validation(format!(
                "max_products must be between 1 and {}, got {}",
                limits::MAX_LISTING_PRODUCTS,
                self.max_products
            )));
        }
        if self.max_pages == 0 || self.max_pages > limits::MAX_LISTING_PAGES {
            return Err(HarvestError::validation(format!(
                "max_pages must be between 1 and {}, got {}",
                limits::MAX_LISTING_PAGES,
                self.max_pages
            )));
        }
        Ok(())
    }
}

/// One product card on a listing page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingItem {
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResult {
    pub products: Vec<ListingItem>,
    pub pages_scraped: usize,
    pub errors: Vec<ErrorRecord>,
}

/// Products and the next-page link found on one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    pub next_page: Option<Url>,
}

/// Scrapes product cards across listing pages
///
/// Pages are visited one after another, following the pagination link,
/// until `max_pages` pages were read, `max_products` products were
/// collected, or no unvisited next page exists.
///
/// # Errors
///
/// Invalid options, or a failure fetching the first page. Failures on later
/// pages end pagination and are reported in `errors`.
pub async fn scrape_listing(
    fetcher: &Fetcher,
    url: &str,
    options: &ListingOptions,
) -> Result<ListingResult, HarvestError> {
    options.validate()?;
    let start = validate_url(url)?;

    let mut result = ListingResult::default();
    let mut visited = HashSet::new();
    let mut next = Some(start);

    while let Some(page_url) = next.take() {
        if result.pages_scraped >= options.max_pages {
            break;
        }
        if !visited.insert(page_url.to_string()) {
            tracing::debug!("Pagination loops back to {}, stopping", page_url);
            break;
        }
        if result.pages_scraped > 0 {
            tokio::time::sleep(options.page_delay).await;
        }

        let fetched = match fetcher
            .fetch(page_url.as_str())
            .await
            .into_html(page_url.as_str())
        {
            Ok(fetched) => fetched,
            Err(e) if result.pages_scraped == 0 => return Err(e),
            Err(e) => {
                tracing::warn!("Listing page {} failed: {}", page_url, e);
                result.errors.push(ErrorRecord::new(page_url.as_str(), &e));
                break;
            }
        };

        let base_url = Url::parse(&fetched.final_url).unwrap_or(page_url);
        let page = parse_listing_page(&fetched.html, &base_url, options);
        result.pages_scraped += 1;

        let remaining = options.max_products - result.products.len();
        tracing::info!(
            "Listing page {} ({}): {} products",
            result.pages_scraped,
            base_url,
            page.items.len()
        );
        result.products.extend(page.items.into_iter().take(remaining));

        if result.products.len() >= options.max_products {
            break;
        }
        next = page.next_page;
    }

    Ok(result)
}

/// Reads product cards and the next-page link from one listing page
pub fn parse_listing_page(html: &str, base_url: &Url, options: &ListingOptions) -> ListingPage {
    let document = Document::parse(html);

    let items = document
        .select_all(&options.product_selector)
        .into_iter()
        .map(|card| listing_item(card, base_url))
        .filter(|item| item.name.is_some() || item.url.is_some())
        .collect();

    let next_page = options.pagination_selector.as_deref().and_then(|selector| {
        document.select_all(selector).into_iter().find_map(|link| {
            let href = link.value().attr("href")?;
            resolve_link(href, base_url)
        })
    });

    ListingPage { items, next_page }
}

fn listing_item(card: ElementRef, base_url: &Url) -> ListingItem {
    let link = if card.value().name() == "a" {
        Some(card)
    } else {
        select_first(card, &["a[href]"])
    };

    let name = select_first(card, ITEM_NAME_SELECTORS)
        .map(|el| value_of(&el, &["content"]))
        .filter(|name| !name.is_empty())
        .or_else(|| {
            link.and_then(|a| a.value().attr("title").map(str::to_string))
                .or_else(|| link.map(|a| element_text(&a)))
                .filter(|name| !name.is_empty())
        });

    let url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url))
        .map(|url| url.to_string());

    let price = select_first(card, ITEM_PRICE_SELECTORS)
        .map(|el| value_of(&el, &["content", "data-price"]))
        .filter(|price| price.chars().any(|c| c.is_ascii_digit()));

    let image = select_first(card, &["img"])
        .and_then(|img| {
            let attrs = img.value();
            attrs.attr("src").filter(|s| !s.trim().is_empty()).or_else(|| attrs.attr("data-src"))
        })
        .and_then(|src| resolve_link(src, base_url))
        .map(|url| url.to_string());

    let rating = select_first(card, ITEM_RATING_SELECTORS)
        .map(|el| value_of(&el, &["content", "data-rating", "aria-label"]))
        .and_then(|text| parse_rating_text(&text))
        .map(|(value, _)| value);

    ListingItem {
        name,
        url,
        price,
        image,
        rating,
    }
}

/// First descendant matching any selector, tried in order
fn select_first<'a>(card: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        card.select(&selector).next()
    })
}
