//! Page, batch and structured-data scraping against a mock site

use crate::{create_test_fetcher, html_response};
use page_harvest::extract::{extract, ExtractOptions, Source};
use page_harvest::scrape::{scrape_many, scrape_page, BatchOptions, PageOptions};
use page_harvest::ErrorKind;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"
<html>
<head>
    <title>Garden Tools</title>
    <meta name="description" content="Tools for every garden">
</head>
<body>
    <nav>Home Shop Contact</nav>
    <main>
        <h1>Garden Tools</h1>
        <h2>Spades</h2>
        <p class="lead">Sturdy spades for clay soil.</p>
        <a href="/spades">All spades</a>
        <img src="/img/spade.png" alt="Spade">
    </main>
    <footer>Mail orders@garden.test or call (555) 123-4567</footer>
</body>
</html>
"#;

fn page_html(title: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><main><p>{} body</p></main></body></html>",
        title, title
    )
}

#[tokio::test]
async fn test_scrape_page_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tools"))
        .respond_with(html_response(ARTICLE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/tools", mock_server.uri());
    let options = PageOptions {
        custom_selectors: BTreeMap::from([("lead".to_string(), "p.lead".to_string())]),
        ..PageOptions::default()
    };
    let page = scrape_page(&create_test_fetcher(), &url, &options)
        .await
        .unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.final_url, url);
    assert_eq!(page.headings.h1, vec!["Garden Tools"]);
    assert_eq!(page.headings.h2, vec!["Spades"]);
    assert!(page.content.contains("Sturdy spades for clay soil."));
    assert!(!page.content.contains("Home Shop Contact"));
    assert_eq!(page.meta.get("description").unwrap(), "Tools for every garden");
    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].url, format!("{}/spades", mock_server.uri()));
    assert_eq!(page.images[0].url, format!("{}/img/spade.png", mock_server.uri()));
    assert_eq!(page.emails, vec!["orders@garden.test"]);
    assert_eq!(page.phones, vec!["(555) 123-4567"]);
    assert_eq!(page.custom.get("lead").unwrap(), &vec!["Sturdy spades for clay soil.".to_string()]);
}

#[tokio::test]
async fn test_scrape_page_fetch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = scrape_page(&create_test_fetcher(), &mock_server.uri(), &PageOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_invalid_selector_rejected_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(ARTICLE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = PageOptions {
        custom_selectors: BTreeMap::from([("bad".to_string(), "div[[".to_string())]),
        ..PageOptions::default()
    };
    let err = scrape_page(&create_test_fetcher(), &mock_server.uri(), &options)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_batch_partial_failure() {
    let mock_server = MockServer::start().await;

    for name in ["one", "two"] {
        Mock::given(method("GET"))
            .and(path(format!("/{}", name)))
            .respond_with(html_response(page_html(name)))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = ["one", "broken", "two"]
        .iter()
        .map(|name| format!("{}/{}", mock_server.uri(), name))
        .collect();
    let options = BatchOptions {
        max_concurrent: 2,
        delay_between_batches: Duration::from_millis(10),
        ..BatchOptions::default()
    };

    let result = scrape_many(&create_test_fetcher(), &urls, &options)
        .await
        .unwrap();

    assert_eq!(result.results.len(), 2);
    assert_eq!(result.results[0].url, urls[0]);
    assert_eq!(result.results[1].url, urls[2]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].url, urls[1]);
    assert_eq!(result.errors[0].error_kind, Some(ErrorKind::HttpError));
}

#[tokio::test]
async fn test_batch_invalid_url_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(page_html("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let urls = vec![mock_server.uri(), "not a url".to_string()];
    let result = scrape_many(&create_test_fetcher(), &urls, &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(result.results.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].url, "not a url");
}

#[tokio::test]
async fn test_batch_over_limit_rejected_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(page_html("never")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..101)
        .map(|i| format!("{}/page/{}", mock_server.uri(), i))
        .collect();
    let err = scrape_many(&create_test_fetcher(), &urls, &BatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_extract_structured_data() {
    let mock_server = MockServer::start().await;

    let html = r#"
    <html><head>
        <script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "LocalBusiness",
         "address": {"@type": "PostalAddress", "streetAddress": "1 Main St",
                     "addressLocality": "Springfield", "postalCode": "12345"},
         "aggregateRating": {"@type": "AggregateRating", "ratingValue": "4.5", "reviewCount": "120"},
         "openingHours": "Mo-Fr 09:00-17:00"}
        </script>
    </head><body>
        <p>Lunch special $12.50</p>
        <a href="https://twitter.com/springfield">Twitter</a>
        <a href="mailto:hello@springfield.test">Email us</a>
    </body></html>
    "#;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(html_response(html))
        .mount(&mock_server)
        .await;

    let url = format!("{}/shop", mock_server.uri());
    let record = extract(&create_test_fetcher(), &url, &ExtractOptions::default())
        .await
        .unwrap();

    assert_eq!(record.json_ld.len(), 1);
    let rating = record.best_rating().unwrap();
    assert_eq!(rating.value, 4.5);
    assert_eq!(rating.count, Some(120));
    assert_eq!(rating.source, Source::Schema);
    assert_eq!(record.best_address().unwrap().locality.as_deref(), Some("Springfield"));
    assert!(record.prices.iter().any(|p| p.value == "$12.50" && p.source == Source::Regex));
    assert_eq!(record.contacts.emails, vec!["hello@springfield.test"]);
    assert_eq!(
        record.social_links.get("twitter").map(String::as_str),
        Some("https://twitter.com/springfield")
    );
    assert_eq!(record.business_hours.unwrap().hours, vec!["Mo-Fr 09:00-17:00"]);
}

async fn mount_pages(mock_server: &MockServer, names: &[&str]) -> Vec<String> {
    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/{}", name)))
            .respond_with(html_response(page_html(name)))
            .expect(1)
            .mount(mock_server)
            .await;
    }
    names
        .iter()
        .map(|name| format!("{}/{}", mock_server.uri(), name))
        .collect()
}

#[tokio::test]
async fn test_batch_pauses_between_batches() {
    let mock_server = MockServer::start().await;
    let urls = mount_pages(&mock_server, &["one", "two", "three"]).await;

    let options = BatchOptions {
        max_concurrent: 2,
        delay_between_batches: Duration::from_millis(400),
        ..BatchOptions::default()
    };

    let started = Instant::now();
    let result = scrape_many(&create_test_fetcher(), &urls, &options)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    // Two batches: [one, two] then [three]
    assert_eq!(result.results.len(), 3);
    assert!(elapsed >= Duration::from_millis(400), "batch took {:?}", elapsed);
}

#[tokio::test]
async fn test_single_batch_has_no_trailing_pause() {
    let mock_server = MockServer::start().await;
    let urls = mount_pages(&mock_server, &["one", "two"]).await;

    let options = BatchOptions {
        max_concurrent: 2,
        delay_between_batches: Duration::from_millis(400),
        ..BatchOptions::default()
    };

    let started = Instant::now();
    let result = scrape_many(&create_test_fetcher(), &urls, &options)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.results.len(), 2);
    assert!(elapsed < Duration::from_millis(400), "batch took {:?}", elapsed);
}
