//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the engine, including:
//! - Building a pooled HTTP client
//! - Rotating browser user-agent strings
//! - Retry logic with backoff for transient failures
//! - Error classification

use crate::config::FetcherConfig;
use crate::fetch::user_agents::default_user_agents;
use crate::{ErrorKind, HarvestError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Outcome of one `fetch` call (all of its attempts)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    /// Whether a 2xx response body was obtained
    pub success: bool,

    /// HTTP status of the last response, if any response arrived
    pub status_code: Option<u16>,

    /// Response body on success
    #[serde(rename = "rawHTML")]
    pub raw_html: Option<String>,

    /// URL after redirects (the requested URL when no response arrived)
    #[serde(rename = "finalURL")]
    pub final_url: String,

    /// Wall time from the first attempt's start until the result was produced
    pub elapsed_ms: f64,

    /// Failure classification
    pub error_kind: Option<ErrorKind>,

    /// Human-readable failure description
    pub error: Option<String>,

    /// Number of network attempts made
    pub attempts: u32,
}

/// A successfully fetched HTML document
#[derive(Debug, Clone)]
pub struct FetchedHtml {
    /// URL after redirects; relative links resolve against it
    pub final_url: String,

    /// Raw response body
    pub html: String,
}

impl FetchResult {
    /// Converts the result into the fetched document or the matching engine error
    ///
    /// The error keeps the fetch classification verbatim so callers see the same taxonomy.
    pub fn into_html(self, requested_url: &str) -> Result<FetchedHtml, HarvestError> {
        match (self.success, self.raw_html) {
            (true, Some(html)) => Ok(FetchedHtml {
                final_url: self.final_url,
                html,
            }),
            _ => Err(HarvestError::Fetch {
                url: requested_url.to_string(),
                kind: self.error_kind.unwrap_or(ErrorKind::ConnectionError),
                status_code: self.status_code,
                message: self
                    .error
                    .unwrap_or_else(|| "request failed".to_string()),
            }),
        }
    }
}

/// Per-call fetch parameters
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Extra request headers; they override the defaults, user agent included
    pub headers: Vec<(String, String)>,

    /// Total attempts (a value of 0 still performs one attempt)
    pub max_retries: u32,

    /// Base delay between attempts
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP GET with rotating identity, timeout, and retry/backoff
///
/// One instance owns one pooled client; it is safe to share across tasks.
/// The only state carried between calls is the user-agent rotation index.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    user_agents: Vec<String>,
    next_agent: AtomicUsize,
    defaults: FetchOptions,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, HarvestError> {
        let client = build_http_client(Duration::from_millis(config.request_timeout_ms))?;
        let user_agents = config
            .user_agents
            .clone()
            .filter(|agents| !agents.is_empty())
            .unwrap_or_else(default_user_agents);

        Ok(Self {
            client,
            user_agents,
            next_agent: AtomicUsize::new(0),
            defaults: FetchOptions {
                headers: Vec::new(),
                max_retries: config.max_retries,
                retry_delay: Duration::from_millis(config.retry_delay_ms),
            },
        })
    }

    /// Fetches a URL using the configured retry settings
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with(url, &self.defaults).await
    }

    /// Fetches a URL with full error handling and retry logic
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Immediate → success |
    /// | HTTP 403 | Immediate → forbidden, no retry |
    /// | HTTP 429 | Wait `retry_delay * attempt * 2`, retry → rate_limited |
    /// | Other status | Wait `retry_delay`, retry → http_error |
    /// | Timeout | Wait `retry_delay`, retry → timeout |
    /// | Transport error | Wait `retry_delay`, retry → connection_error |
    ///
    /// No wait follows the final attempt.
    pub async fn fetch_with(&self, url: &str, options: &FetchOptions) -> FetchResult {
        let started = Instant::now();
        let max_attempts = options.max_retries.max(1);
        let headers = self.request_headers(&options.headers);

        let mut final_url = url.to_string();
        let mut last_status = None;
        let mut last_kind = ErrorKind::ConnectionError;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            tracing::debug!("Fetching {} (attempt {}/{})", url, attempt, max_attempts);

            let wait = match self.client.get(url).headers(headers.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    final_url = response.url().to_string();
                    last_status = Some(status.as_u16());

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                return FetchResult {
                                    success: true,
                                    status_code: last_status,
                                    raw_html: Some(body),
                                    final_url,
                                    elapsed_ms: elapsed_ms(started),
                                    error_kind: None,
                                    error: None,
                                    attempts: attempt,
                                };
                            }
                            Err(e) => {
                                last_kind = classify_transport_error(&e);
                                last_error = format!("Failed to read response body: {}", e);
                                options.retry_delay
                            }
                        }
                    } else if status == StatusCode::FORBIDDEN {
                        tracing::warn!("{} returned 403, host is blocking requests", url);
                        return FetchResult {
                            success: false,
                            status_code: last_status,
                            raw_html: None,
                            final_url,
                            elapsed_ms: elapsed_ms(started),
                            error_kind: Some(ErrorKind::Forbidden),
                            error: Some("HTTP 403 Forbidden".to_string()),
                            attempts: attempt,
                        };
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        last_kind = ErrorKind::RateLimited;
                        last_error = "HTTP 429 Too Many Requests".to_string();
                        options.retry_delay * (attempt * 2)
                    } else {
                        last_kind = ErrorKind::HttpError;
                        last_error = format!("HTTP {}", status.as_u16());
                        options.retry_delay
                    }
                }
                Err(e) => {
                    last_status = None;
                    last_kind = classify_transport_error(&e);
                    last_error = e.to_string();
                    options.retry_delay
                }
            };

            if attempt < max_attempts {
                tracing::debug!(
                    "Attempt {} for {} failed ({}), retrying in {:?}",
                    attempt,
                    url,
                    last_error,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
        }

        tracing::warn!(
            "Giving up on {} after {} attempts: {}",
            url,
            max_attempts,
            last_error
        );

        FetchResult {
            success: false,
            status_code: last_status,
            raw_html: None,
            final_url,
            elapsed_ms: elapsed_ms(started),
            error_kind: Some(last_kind),
            error: Some(last_error),
            attempts: max_attempts,
        }
    }

    /// Picks the next user agent in round-robin order
    pub fn next_user_agent(&self) -> &str {
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed);
        &self.user_agents[index % self.user_agents.len()]
    }

    /// Default browser-like headers merged with caller-supplied ones
    fn request_headers(&self, extra: &[(String, String)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        if let Ok(agent) = HeaderValue::from_str(self.next_user_agent()) {
            headers.insert(USER_AGENT, agent);
        }

        for (name, value) in extra {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Ignoring invalid request header {}", name),
            }
        }

        headers
    }
}

/// Maps a transport-level reqwest error onto the taxonomy
fn classify_transport_error(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::ConnectionError
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
