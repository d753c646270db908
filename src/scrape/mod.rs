//! Page scraping
//!
//! - `scrape_page` turns one URL into a [`PageRecord`]
//! - `scrape_many` runs it over many URLs with bounded concurrency

mod batch;
mod page;

pub use batch::{scrape_many, BatchOptions, BatchResult};
pub use page::{
    build_page_record, scrape_page, validate_custom_selectors, Headings, PageOptions, PageRecord,
};
