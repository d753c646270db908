//! Fetcher retry, backoff and error classification

use crate::{create_test_fetcher, create_test_fetcher_config, html_response};
use page_harvest::config::FetcherConfig;
use page_harvest::fetch::{FetchOptions, Fetcher};
use page_harvest::{Engine, ErrorKind};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rate_limited_then_success() {
    let mock_server = MockServer::start().await;

    // First two attempts are throttled
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(html_response("<html><body>ok</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher();
    let result = fetcher
        .fetch(&format!("{}/busy", mock_server.uri()))
        .await;

    assert!(result.success);
    assert_eq!(result.status_code, Some(200));
    assert_eq!(result.attempts, 3);
    assert!(result.raw_html.unwrap().contains("ok"));
    // 50ms * 2 after the first 429, 50ms * 4 after the second
    assert!(
        result.elapsed_ms >= 300.0,
        "expected two backoff sleeps, took {}ms",
        result.elapsed_ms
    );
}

#[tokio::test]
async fn test_rate_limited_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = create_test_fetcher().fetch(&mock_server.uri()).await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::RateLimited));
    assert_eq!(result.status_code, Some(429));
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = create_test_fetcher()
        .fetch(&format!("{}/blocked", mock_server.uri()))
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Forbidden));
    assert_eq!(result.status_code, Some(403));
    assert_eq!(result.attempts, 1);
}

#[tokio::test]
async fn test_server_error_retried_then_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = create_test_fetcher()
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::HttpError));
    assert_eq!(result.status_code, Some(500));
    assert_eq!(result.attempts, 3);
}

#[tokio::test]
async fn test_timeout_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response("<html></html>").set_delay(Duration::from_millis(1_500)))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&FetcherConfig {
        request_timeout_ms: 200,
        max_retries: 1,
        ..create_test_fetcher_config()
    })
    .unwrap();
    let result = fetcher.fetch(&mock_server.uri()).await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::Timeout));
    assert_eq!(result.status_code, None);
}

#[tokio::test]
async fn test_connection_refused() {
    let fetcher = Fetcher::new(&FetcherConfig {
        max_retries: 1,
        ..create_test_fetcher_config()
    })
    .unwrap();
    let result = fetcher.fetch("http://127.0.0.1:1/").await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::ConnectionError));
    assert_eq!(result.status_code, None);
    assert_eq!(result.final_url, "http://127.0.0.1:1/");
}

#[tokio::test]
async fn test_caller_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("x-request-id", "abc"))
        .respond_with(html_response("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = FetchOptions {
        headers: vec![
            ("User-Agent".to_string(), "HarvestTest/1.0".to_string()),
            ("X-Request-Id".to_string(), "abc".to_string()),
        ],
        max_retries: 1,
        retry_delay: Duration::from_millis(10),
    };
    let result = create_test_fetcher()
        .fetch_with(&mock_server.uri(), &options)
        .await;

    assert!(result.success);
}

#[tokio::test]
async fn test_final_url_follows_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_response("<html><body>moved</body></html>"))
        .mount(&mock_server)
        .await;

    let result = create_test_fetcher()
        .fetch(&format!("{}/old", mock_server.uri()))
        .await;

    assert!(result.success);
    assert_eq!(result.final_url, format!("{}/new", mock_server.uri()));
}

#[tokio::test]
async fn test_engine_from_config_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[fetcher]\nmax-retries = 2\nretry-delay-ms = 10\nrequest-timeout-ms = 2000"
    )
    .unwrap();

    let engine = Engine::from_path(file.path()).unwrap();
    let result = engine.fetch(&mock_server.uri()).await;

    assert_eq!(engine.config().fetcher.max_retries, 2);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.error_kind, Some(ErrorKind::HttpError));
}
