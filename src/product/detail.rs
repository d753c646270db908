//! Single product pages: schema and selector extraction merged field by field

use crate::dom::{parse_selector, resolve_link, Document};
use crate::extract::patterns::{detect_currency, parse_rating_text};
use crate::extract::schema::{parse_json_ld, schema_nodes, value_text, SchemaNode};
use crate::extract::selectors::value_of;
use crate::fetch::Fetcher;
use crate::product::amount::parse_amount;
use crate::url::validate_url;
use crate::HarvestError;
use serde::Serialize;
use serde_json::Value;
use url::Url;

const NAME_SELECTORS: &[&str] = &[
    "[itemprop=\"name\"]",
    ".product-title",
    ".product-name",
    "h1",
];
const PRICE_SELECTORS: &[&str] = &[
    "[itemprop=\"price\"]",
    "[data-price]",
    ".product-price",
    ".sale-price",
    ".price",
];
const DESCRIPTION_SELECTORS: &[&str] = &[
    "[itemprop=\"description\"]",
    ".product-description",
    "#description",
    "meta[name=\"description\"]",
];
const IMAGE_SELECTORS: &[&str] = &[
    "[itemprop=\"image\"]",
    ".product-image img",
    ".product-gallery img",
    "meta[property=\"og:image\"]",
];
const RATING_SELECTORS: &[&str] = &["[itemprop=\"ratingValue\"]", ".rating", ".star-rating"];
const REVIEW_COUNT_SELECTORS: &[&str] = &["[itemprop=\"reviewCount\"]", "[itemprop=\"ratingCount\"]", ".review-count"];
const SKU_SELECTORS: &[&str] = &["[itemprop=\"sku\"]", "[data-sku]", ".sku"];
const AVAILABILITY_SELECTORS: &[&str] = &[
    "[itemprop=\"availability\"]",
    ".availability",
    ".stock-status",
    ".stock",
];
const BRAND_SELECTORS: &[&str] = &["[itemprop=\"brand\"]", ".product-brand", ".brand"];

/// Where a product's fields came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// A schema.org Product object was found
    Schema,
    /// Only selector heuristics matched
    #[default]
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRating {
    pub value: f64,
    pub count: Option<u64>,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub url: String,
    pub name: Option<String>,
    /// Price as written by the page
    pub price: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub rating: Option<ProductRating>,
    pub sku: Option<String>,
    pub availability: Option<String>,
    pub brand: Option<String>,
    pub data_source: DataSource,
}

impl ProductRecord {
    /// Numeric value of `price`, if it has one
    pub fn price_amount(&self) -> Option<f64> {
        self.price.as_deref().and_then(parse_amount)
    }
}

/// Caller selectors replacing the defaults for individual fields
#[derive(Debug, Clone, Default)]
pub struct ProductSelectors {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub rating: Option<String>,
    pub sku: Option<String>,
    pub availability: Option<String>,
    pub brand: Option<String>,
}

impl ProductSelectors {
    /// Rejects unparsable selectors
    pub fn validate(&self) -> Result<(), HarvestError> {
        [
            &self.name,
            &self.price,
            &self.description,
            &self.image,
            &self.rating,
            &self.sku,
            &self.availability,
            &self.brand,
        ]
        .into_iter()
        .flatten()
        .try_for_each(|selector| parse_selector(selector).map(|_| ()))
    }
}

/// Field values found by one strategy
#[derive(Debug, Clone, Default)]
struct ProductFields {
    name: Option<String>,
    price: Option<String>,
    currency: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    rating: Option<ProductRating>,
    sku: Option<String>,
    availability: Option<String>,
    brand: Option<String>,
}

impl ProductFields {
    /// Keeps every value of `self` and fills the gaps from `fallback`
    fn fill_from(self, fallback: ProductFields) -> ProductFields {
        ProductFields {
            name: self.name.or(fallback.name),
            price: self.price.or(fallback.price),
            currency: self.currency.or(fallback.currency),
            description: self.description.or(fallback.description),
            images: if self.images.is_empty() {
                fallback.images
            } else {
                self.images
            },
            rating: self.rating.or(fallback.rating),
            sku: self.sku.or(fallback.sku),
            availability: self.availability.or(fallback.availability),
            brand: self.brand.or(fallback.brand),
        }
    }
}

/// Fetches a product page and extracts the product
///
/// # Errors
///
/// Invalid URL or custom selector (before fetching), or the fetch failure.
pub async fn scrape_product(
    fetcher: &Fetcher,
    url: &str,
    selectors: &ProductSelectors,
) -> Result<ProductRecord, HarvestError> {
    let requested = validate_url(url)?;
    selectors.validate()?;

    let fetched = fetcher
        .fetch(requested.as_str())
        .await
        .into_html(requested.as_str())?;
    let base_url = Url::parse(&fetched.final_url).unwrap_or(requested);

    let product = product_from_html(&fetched.html, &base_url, selectors);
    tracing::debug!(
        "Product at {}: {:?} ({:?})",
        product.url,
        product.name,
        product.data_source
    );
    Ok(product)
}

/// Extracts a product from already fetched HTML
///
/// Schema values win over selector values wherever the schema has one.
pub fn product_from_html(html: &str, base_url: &Url, selectors: &ProductSelectors) -> ProductRecord {
    let document = Document::parse(html);
    let blocks = parse_json_ld(&document);
    let nodes = schema_nodes(&blocks);

    let schema = nodes
        .iter()
        .find(|node| node.is_type("Product"))
        .map(schema_fields);
    let data_source = if schema.is_some() {
        DataSource::Schema
    } else {
        DataSource::Html
    };

    let fields = schema
        .unwrap_or_default()
        .fill_from(selector_fields(&document, selectors));

    let mut images: Vec<String> = Vec::new();
    for image in fields
        .images
        .iter()
        .filter_map(|src| resolve_link(src, base_url))
    {
        let image = image.to_string();
        if !images.contains(&image) {
            images.push(image);
        }
    }

    ProductRecord {
        url: base_url.to_string(),
        name: fields.name,
        currency: fields
            .currency
            .or_else(|| fields.price.as_deref().and_then(detect_currency)),
        price: fields.price,
        description: fields.description,
        images,
        rating: fields.rating,
        sku: fields.sku,
        availability: fields.availability,
        brand: fields.brand,
        data_source,
    }
}

fn schema_fields(product: &SchemaNode) -> ProductFields {
    let offer = match product.get("offers") {
        Some(Value::Array(offers)) => offers.iter().find_map(Value::as_object),
        Some(Value::Object(offer)) => Some(offer),
        _ => None,
    };
    let offer_text = |field: &str| offer.and_then(|o| o.get(field)).and_then(value_text);

    let rating = match product.get("aggregateRating") {
        Some(Value::Object(rating)) => {
            let number = |field: &str| {
                rating
                    .get(field)
                    .and_then(value_text)
                    .and_then(|t| t.parse::<f64>().ok())
            };
            number("ratingValue").map(|value| ProductRating {
                value,
                count: number("ratingCount")
                    .or_else(|| number("reviewCount"))
                    .map(|count| count as u64),
                max: number("bestRating").unwrap_or(5.0),
            })
        }
        _ => None,
    };

    ProductFields {
        name: product.text("name"),
        price: offer_text("price").or_else(|| offer_text("lowPrice")),
        currency: offer_text("priceCurrency"),
        description: product.text("description"),
        images: product.get("image").map(image_urls).unwrap_or_default(),
        rating,
        sku: product.text("sku"),
        availability: offer_text("availability"),
        brand: product.get("brand").and_then(named_text),
    }
}

/// Image URLs from a string, an ImageObject, or a list of either
fn image_urls(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(image_urls).collect(),
        Value::Object(image) => image.get("url").and_then(value_text).into_iter().collect(),
        other => value_text(other).into_iter().collect(),
    }
}

/// A plain string or an object's `name`
fn named_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(fields) => fields.get("name").and_then(value_text),
        other => value_text(other),
    }
}

fn selector_fields(document: &Document, custom: &ProductSelectors) -> ProductFields {
    let field = |custom: &Option<String>, defaults: &[&str], attrs: &[&str]| -> Option<String> {
        match custom {
            Some(selector) => first_value(document, &[selector.as_str()], attrs),
            None => first_value(document, defaults, attrs),
        }
    };

    let price = field(&custom.price, PRICE_SELECTORS, &["content", "data-price"])
        .filter(|price| price.chars().any(|c| c.is_ascii_digit()));

    let currency = first_value(document, &["[itemprop=\"priceCurrency\"]"], &["content"]);

    let rating = field(&custom.rating, RATING_SELECTORS, &["content", "data-rating", "aria-label"])
        .and_then(|text| parse_rating_text(&text))
        .filter(|(value, max)| value <= max)
        .map(|(value, max)| ProductRating {
            value,
            max,
            count: first_value(document, REVIEW_COUNT_SELECTORS, &["content"])
                .and_then(|text| parse_amount(&text))
                .map(|count| count as u64),
        });

    let image_selectors: Vec<&str> = match &custom.image {
        Some(selector) => vec![selector.as_str()],
        None => IMAGE_SELECTORS.to_vec(),
    };
    let images = image_selectors
        .iter()
        .flat_map(|selector| document.select_all(selector))
        .filter_map(|element| {
            let attrs = element.value();
            attrs
                .attr("src")
                .or_else(|| attrs.attr("data-src"))
                .or_else(|| attrs.attr("content"))
                .or_else(|| attrs.attr("href"))
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(str::to_string)
        })
        .collect();

    ProductFields {
        name: field(&custom.name, NAME_SELECTORS, &["content"]),
        price,
        currency,
        description: field(&custom.description, DESCRIPTION_SELECTORS, &["content"]),
        images,
        rating,
        sku: field(&custom.sku, SKU_SELECTORS, &["content", "data-sku"]),
        availability: field(&custom.availability, AVAILABILITY_SELECTORS, &["href", "content"]),
        brand: field(&custom.brand, BRAND_SELECTORS, &["content"]),
    }
}

/// First non-empty value across `selectors`, tried in order
fn first_value(document: &Document, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| document.select_all(selector))
        .map(|element| value_of(&element, attrs))
        .find(|value| !value.is_empty())
}
