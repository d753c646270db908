//! Markdown report generation
//!
//! Human-readable reports for crawl and comparison results.

use crate::crawler::CrawlResult;
use crate::product::{ComparisonResult, RangeStats};
use crate::ErrorRecord;

/// Formats a crawl result as markdown
///
/// # Arguments
///
/// * `result` - The crawl result
///
/// # Returns
///
/// A formatted markdown string
pub fn format_crawl_report(result: &CrawlResult) -> String {
    let mut md = String::new();

    md.push_str("# Crawl Report\n\n");

    md.push_str("## Overview\n\n");
    if let Some(start) = result.pages.first() {
        md.push_str(&format!("- **Start URL**: {}\n", start.page.url));
    }
    md.push_str(&format!("- **Pages Crawled**: {}\n", result.pages.len()));
    md.push_str(&format!(
        "- **Pages Discovered**: {}\n",
        result.pages_discovered
    ));
    md.push_str(&format!(
        "- **Max Depth Reached**: {}\n",
        result.max_depth_reached
    ));
    md.push_str(&format!("- **Errors**: {}\n\n", result.errors.len()));

    let per_depth = result.pages_per_depth();
    if !per_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in per_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !result.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Depth | URL | Title | Words |\n");
        md.push_str("|-------|-----|-------|-------|\n");
        for crawled in &result.pages {
            let title = crawled.page.meta.get("title").map(String::as_str).unwrap_or("");
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                crawled.depth,
                cell(&crawled.page.url),
                cell(title),
                crawled.page.word_count
            ));
        }
        md.push('\n');
    }

    push_errors(&mut md, &result.errors);
    md
}

/// Formats a product comparison as markdown
pub fn format_comparison_report(result: &ComparisonResult) -> String {
    let mut md = String::new();

    md.push_str("# Product Comparison\n\n");

    if !result.products.is_empty() {
        md.push_str("## Products\n\n");
        md.push_str("| Name | Price | Rating | Availability | Source |\n");
        md.push_str("|------|-------|--------|--------------|--------|\n");
        for product in &result.products {
            let rating = product
                .rating
                .as_ref()
                .map(|r| format!("{}/{}", r.value, r.max))
                .unwrap_or_default();
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:?} |\n",
                cell(product.name.as_deref().unwrap_or(&product.url)),
                cell(product.price.as_deref().unwrap_or("")),
                rating,
                cell(product.availability.as_deref().unwrap_or("")),
                product.data_source
            ));
        }
        md.push('\n');
    }

    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Min | Max | Average | Count |\n");
    md.push_str("|--------|-----|-----|---------|-------|\n");
    push_range(&mut md, "Price", &result.price_range);
    push_range(&mut md, "Rating", &result.rating_range);
    md.push('\n');

    let availability = &result.availability_summary;
    md.push_str("## Availability\n\n");
    md.push_str(&format!("- **In Stock**: {}\n", availability.in_stock));
    md.push_str(&format!("- **Out of Stock**: {}\n", availability.out_of_stock));
    md.push_str(&format!("- **Unknown**: {}\n\n", availability.unknown));

    push_errors(&mut md, &result.errors);
    md
}

fn push_range(md: &mut String, label: &str, range: &RangeStats) {
    let show = |value: Option<f64>| value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());
    md.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n",
        label,
        show(range.min),
        show(range.max),
        show(range.avg),
        range.count
    ));
}

fn push_errors(md: &mut String, errors: &[ErrorRecord]) {
    if errors.is_empty() {
        return;
    }
    md.push_str("## Errors\n\n");
    md.push_str("| URL | Kind | Error |\n");
    md.push_str("|-----|------|-------|\n");
    for error in errors {
        let kind = error.error_kind.map(|k| k.as_str()).unwrap_or("");
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&error.url),
            kind,
            cell(&error.error)
        ));
    }
    md.push('\n');
}

/// Escapes a value for use inside a table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
