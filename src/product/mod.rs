//! Product extraction
//!
//! - `scrape_product`: one product page, schema merged over selector values
//! - `scrape_listing`: product cards across paginated listing pages
//! - `compare_products`: concurrent scrape plus price/rating/availability statistics

mod amount;
mod compare;
mod detail;
mod listing;

pub use amount::parse_amount;
pub use compare::{
    compare_products, Availability, AvailabilitySummary, ComparisonResult, RangeStats,
};
pub use detail::{
    product_from_html, scrape_product, DataSource, ProductRating, ProductRecord, ProductSelectors,
};
pub use listing::{
    parse_listing_page, scrape_listing, ListingItem, ListingOptions, ListingPage, ListingResult,
};
