//! Fetch module for retrieving raw HTML
//!
//! This module contains:
//! - The `Fetcher`, which issues GET requests with rotating user agents
//! - Retry/backoff handling and outcome classification
//! - The built-in user-agent pool

mod fetcher;
mod user_agents;

pub use fetcher::{build_http_client, FetchOptions, FetchResult, FetchedHtml, Fetcher};
pub use user_agents::{default_user_agents, DEFAULT_USER_AGENTS};
