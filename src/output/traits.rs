//! Report trait and output errors

use crate::crawler::CrawlResult;
use crate::extract::StructuredRecord;
use crate::output::markdown::{format_comparison_report, format_crawl_report};
use crate::product::{ComparisonResult, ListingResult, ProductRecord};
use crate::scrape::{BatchResult, PageRecord};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("{0} results have no markdown rendering")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A result that can be printed for a person to read
///
/// Every result serializes to JSON; some also have a Markdown report.
pub trait Report: Serialize {
    /// Short name used in messages
    fn kind(&self) -> &'static str;

    fn to_markdown(&self) -> Option<String> {
        None
    }
}

impl Report for PageRecord {
    fn kind(&self) -> &'static str {
        "page"
    }
}

impl Report for BatchResult {
    fn kind(&self) -> &'static str {
        "batch"
    }
}

impl Report for StructuredRecord {
    fn kind(&self) -> &'static str {
        "extract"
    }
}

impl Report for ProductRecord {
    fn kind(&self) -> &'static str {
        "product"
    }
}

impl Report for ListingResult {
    fn kind(&self) -> &'static str {
        "listing"
    }
}

impl Report for CrawlResult {
    fn kind(&self) -> &'static str {
        "crawl"
    }

    fn to_markdown(&self) -> Option<String> {
        Some(format_crawl_report(self))
    }
}

impl Report for ComparisonResult {
    fn kind(&self) -> &'static str {
        "compare"
    }

    fn to_markdown(&self) -> Option<String> {
        Some(format_comparison_report(self))
    }
}
