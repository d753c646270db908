//! Integration tests
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! engine end-to-end through its public API.

mod crawl_tests;
mod fetch_tests;
mod product_tests;
mod scrape_tests;

use page_harvest::config::FetcherConfig;
use page_harvest::fetch::Fetcher;
use wiremock::ResponseTemplate;

/// Fetcher config with short delays and timeouts for testing
pub fn create_test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        request_timeout_ms: 2_000,
        max_retries: 3,
        retry_delay_ms: 50,
        user_agents: None,
    }
}

pub fn create_test_fetcher() -> Fetcher {
    Fetcher::new(&create_test_fetcher_config()).expect("Failed to build test fetcher")
}

/// A 200 response carrying `body` as HTML
pub fn html_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}
