//! Breadth-first crawl bounds against a mock site

use crate::{create_test_fetcher, html_response};
use page_harvest::crawler::{crawl, CrawlOptions};
use page_harvest::ErrorKind;
use std::collections::HashSet;
use std::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><main><h1>{}</h1>{}</main></body></html>",
        title, title, anchors
    )
}

/// Mounts a small site:
///
/// ```text
/// /        -> /a, /b, /doc.pdf, external
/// /a       -> /a/deep, /
/// /b       -> /b/deep
/// /a/deep  -> /a/deeper
/// ```
async fn mount_site(mock_server: &MockServer, external: &str) {
    let pages: Vec<(&str, Vec<&str>)> = vec![
        ("/", vec!["/a", "/b", "/doc.pdf", external]),
        ("/a", vec!["/a/deep", "/"]),
        ("/b", vec!["/b/deep"]),
        ("/a/deep", vec!["/a/deeper"]),
        ("/b/deep", vec![]),
        ("/a/deeper", vec![]),
    ];

    for (page_path, links) in pages {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html_response(page_with_links(page_path, &links)))
            .mount(mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(mock_server)
        .await;
}

async fn external_server() -> MockServer {
    let external = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response(page_with_links("elsewhere", &[])))
        .expect(0)
        .mount(&external)
        .await;
    external
}

#[tokio::test]
async fn test_crawl_respects_depth_and_domain() {
    let mock_server = MockServer::start().await;
    let external = external_server().await;
    let external_url = format!("{}/landing", external.uri());
    mount_site(&mock_server, &external_url).await;

    let options = CrawlOptions {
        max_pages: 10,
        max_depth: 1,
        same_domain_only: true,
    };
    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &options)
        .await
        .unwrap();

    let visited: Vec<String> = result.pages.iter().map(|p| p.page.url.clone()).collect();
    assert_eq!(
        visited,
        vec![
            format!("{}/", mock_server.uri()),
            format!("{}/a", mock_server.uri()),
            format!("{}/b", mock_server.uri()),
        ]
    );
    assert_eq!(result.pages[0].depth, 0);
    assert!(result.pages.iter().all(|p| p.depth <= 1));
    assert_eq!(result.max_depth_reached, 1);
    assert_eq!(result.pages_discovered, 3);
    assert!(result.errors.is_empty());
    assert_eq!(result.pages_per_depth().get(&1), Some(&2));
}

#[tokio::test]
async fn test_crawl_stops_at_max_pages() {
    let mock_server = MockServer::start().await;
    let external = external_server().await;
    mount_site(&mock_server, &external.uri()).await;

    let options = CrawlOptions {
        max_pages: 2,
        max_depth: 3,
        same_domain_only: true,
    };
    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &options)
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_crawl_visits_each_url_once() {
    let mock_server = MockServer::start().await;
    let external = external_server().await;
    mount_site(&mock_server, &external.uri()).await;

    let options = CrawlOptions {
        max_pages: 50,
        max_depth: 3,
        same_domain_only: true,
    };
    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &options)
        .await
        .unwrap();

    let unique: HashSet<&str> = result.pages.iter().map(|p| p.page.url.as_str()).collect();
    assert_eq!(result.pages.len(), 6);
    assert_eq!(unique.len(), 6);
    assert_eq!(result.max_depth_reached, 3);
    assert!(result
        .pages
        .iter()
        .any(|p| p.page.url.ends_with("/a/deeper") && p.depth == 3));
}

#[tokio::test]
async fn test_crawl_records_failed_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(page_with_links("home", &["/missing", "/ok"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_response(page_with_links("ok", &[])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].url.ends_with("/missing"));
    assert_eq!(result.errors[0].error_kind, Some(ErrorKind::HttpError));
}

#[tokio::test]
async fn test_crawl_bounds_rejected_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(page_with_links("never", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let too_deep = CrawlOptions {
        max_depth: 4,
        ..CrawlOptions::default()
    };
    let err = crawl(&create_test_fetcher(), &mock_server.uri(), &too_deep)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationError);

    let too_many = CrawlOptions {
        max_pages: 51,
        ..CrawlOptions::default()
    };
    assert!(crawl(&create_test_fetcher(), &mock_server.uri(), &too_many)
        .await
        .is_err());
}

#[tokio::test]
async fn test_crawl_pauses_between_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(page_with_links("home", &["/one", "/two"])))
        .mount(&mock_server)
        .await;

    for page_path in ["/one", "/two"] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html_response(page_with_links(page_path, &[])))
            .mount(&mock_server)
            .await;
    }

    let started = Instant::now();
    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &CrawlOptions::default())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.pages.len(), 3);
    // 300ms before the second and third page
    assert!(elapsed.as_millis() >= 600, "crawl took {:?}", elapsed);
}

#[tokio::test]
async fn test_crawl_drops_pages_redirected_off_site() {
    let mock_server = MockServer::start().await;
    let external = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(page_with_links("elsewhere", &[])))
        .mount(&external)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(page_with_links("home", &["/away", "/stay"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/landing", external.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stay"))
        .respond_with(html_response(page_with_links("stay", &[])))
        .mount(&mock_server)
        .await;

    let result = crawl(&create_test_fetcher(), &mock_server.uri(), &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert!(result
        .pages
        .iter()
        .all(|p| p.page.final_url.starts_with(&mock_server.uri())));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].url.ends_with("/away"));
    assert_eq!(result.errors[0].error_kind, Some(ErrorKind::ValidationError));
}
