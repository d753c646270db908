//! Side-by-side product comparison

use crate::fetch::Fetcher;
use crate::product::detail::{scrape_product, ProductRecord, ProductSelectors};
use crate::{limits, ErrorRecord, HarvestError};
use futures::future::join_all;
use serde::Serialize;

/// Min, max and mean of the values that could be read as numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Mean rounded to two decimals
    pub avg: Option<f64>,
    pub count: usize,
}

impl RangeStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }

        let sum: f64 = values.iter().sum();
        let avg = sum / values.len() as f64;
        Self {
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
            avg: Some((avg * 100.0).round() / 100.0),
            count: values.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySummary {
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub unknown: usize,
}

/// How a free-text availability value reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    /// Classifies schema URLs (`https://schema.org/InStock`) and page text alike
    pub fn classify(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::Unknown;
        };
        let lower = text.to_lowercase();
        // Out-of-stock forms first
        if lower.contains("outofstock") || lower.contains("out of stock") {
            Self::OutOfStock
        } else if lower.contains("instock") || lower.contains("in stock") {
            Self::InStock
        } else {
            Self::Unknown
        }
    }
}

impl AvailabilitySummary {
    pub fn from_products(products: &[ProductRecord]) -> Self {
        let mut summary = Self::default();
        for product in products {
            match Availability::classify(product.availability.as_deref()) {
                Availability::InStock => summary.in_stock += 1,
                Availability::OutOfStock => summary.out_of_stock += 1,
                Availability::Unknown => summary.unknown += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub products: Vec<ProductRecord>,
    pub price_range: RangeStats,
    pub rating_range: RangeStats,
    pub availability_summary: AvailabilitySummary,
    pub errors: Vec<ErrorRecord>,
}

impl ComparisonResult {
    /// Computes the statistics over already scraped products
    pub fn from_products(products: Vec<ProductRecord>, errors: Vec<ErrorRecord>) -> Self {
        Self {
            price_range: RangeStats::from_values(products.iter().filter_map(ProductRecord::price_amount)),
            rating_range: RangeStats::from_values(
                products.iter().filter_map(|p| p.rating.as_ref().map(|r| r.value)),
            ),
            availability_summary: AvailabilitySummary::from_products(&products),
            products,
            errors,
        }
    }
}

/// Scrapes up to ten products concurrently and compares them
///
/// A product that fails to scrape is listed in `errors`; the comparison is
/// computed over the rest. Prices or ratings that are not numeric are left
/// out of the statistics.
pub async fn compare_products(
    fetcher: &Fetcher,
    urls: &[String],
) -> Result<ComparisonResult, HarvestError> {
    if urls.len() > limits::MAX_COMPARE_URLS {
        return Err(HarvestError::validation(format!(
            "comparison accepts at most {} URLs, got {}",
            limits::MAX_COMPARE_URLS,
            urls.len()
        )));
    }

    let selectors = ProductSelectors::default();
    let outcomes = join_all(urls.iter().map(|url| scrape_product(fetcher, url, &selectors))).await;

    let mut products = Vec::new();
    let mut errors = Vec::new();
    for (url, outcome) in urls.iter().zip(outcomes) {
        match outcome {
            Ok(product) => products.push(product),
            Err(e) => {
                tracing::warn!("Failed to scrape product {}: {}", url, e);
                errors.push(ErrorRecord::new(url.as_str(), &e));
            }
        }
    }

    tracing::info!(
        "Compared {} products ({} failed)",
        products.len(),
        errors.len()
    );

    Ok(ComparisonResult::from_products(products, errors))
}
