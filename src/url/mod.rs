//! URL handling module for Page-Harvest
//!
//! This module provides URL validation and normalization, domain extraction,
//! same-domain checks, and the crawl frontier link filter.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, host_matches, same_domain};
pub use filter::{is_static_asset, LinkFilter, ASSET_EXTENSIONS};
pub use normalize::{normalize_url, validate_url};
