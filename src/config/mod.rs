//! Configuration module for Page-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use page_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will follow links to depth {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use validation::validate;

// Re-export types
pub use types::{BatchConfig, Config, CrawlerConfig, FetcherConfig, ListingConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
