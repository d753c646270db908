use crate::config::types::{BatchConfig, Config, CrawlerConfig, FetcherConfig, ListingConfig};
use crate::limits;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_batch_config(&config.batch)?;
    validate_crawler_config(&config.crawler)?;
    validate_listing_config(&config.listing)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if let Some(agents) = &config.user_agents {
        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "user_agents cannot be an empty list".to_string(),
            ));
        }

        if agents.iter().any(|agent| agent.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "user_agents cannot contain empty entries".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates batch configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    check_range("batch max_concurrent", config.max_concurrent, 1, limits::MAX_CONCURRENT)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    check_range("crawler max_pages", config.max_pages, 1, limits::MAX_CRAWL_PAGES)?;

    if config.max_depth > limits::MAX_CRAWL_DEPTH {
        return Err(ConfigError::Validation(format!(
            "crawler max_depth must be <= {}, got {}",
            limits::MAX_CRAWL_DEPTH,
            config.max_depth
        )));
    }

    Ok(())
}

/// Validates listing configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    check_range(
        "listing max_products",
        config.max_products,
        1,
        limits::MAX_LISTING_PRODUCTS,
    )?;
    check_range("listing max_pages", config.max_pages, 1, limits::MAX_LISTING_PAGES)
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}
