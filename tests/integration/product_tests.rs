//! Product detail, listing pagination and comparison

use crate::{create_test_fetcher, html_response};
use page_harvest::product::{
    compare_products, scrape_listing, scrape_product, DataSource, ListingOptions, ProductSelectors,
};
use page_harvest::ErrorKind;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_page(name: &str, price: &str, availability: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">
        {{"@context": "https://schema.org", "@type": "Product", "name": "{}",
          "offers": {{"@type": "Offer", "price": "{}", "priceCurrency": "USD",
                      "availability": "{}"}}}}
        </script>
        </head><body><h1>{}</h1></body></html>"#,
        name, price, availability, name
    )
}

fn listing_page(items: &[(&str, &str)], next: Option<&str>) -> String {
    let cards: String = items
        .iter()
        .map(|(name, price)| {
            format!(
                r#"<div class="product"><a href="/item/{}"><h3>{}</h3></a><span class="price">{}</span></div>"#,
                name, name, price
            )
        })
        .collect();
    let pager = next
        .map(|href| format!(r#"<a class="next" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!("<html><body>{}{}</body></html>", cards, pager)
}

#[tokio::test]
async fn test_schema_price_wins_over_html() {
    let mock_server = MockServer::start().await;

    let html = r#"
    <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "name": "Trail Shoe",
         "offers": {"@type": "Offer", "price": "19.99", "priceCurrency": "USD"}}
        </script>
    </head><body>
        <h1 class="product-title">Trail Shoe (HTML)</h1>
        <span class="price">$24.99</span>
    </body></html>
    "#;

    Mock::given(method("GET"))
        .and(path("/shoe"))
        .respond_with(html_response(html))
        .mount(&mock_server)
        .await;

    let product = scrape_product(
        &create_test_fetcher(),
        &format!("{}/shoe", mock_server.uri()),
        &ProductSelectors::default(),
    )
    .await
    .unwrap();

    assert_eq!(product.price.as_deref(), Some("19.99"));
    assert_eq!(product.currency.as_deref(), Some("USD"));
    assert_eq!(product.name.as_deref(), Some("Trail Shoe"));
    assert_eq!(product.data_source, DataSource::Schema);
}

#[tokio::test]
async fn test_listing_follows_pagination() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(html_response(listing_page(
            &[("alpha", "$10.00"), ("beta", "$12.00")],
            Some("/shop/2"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/2"))
        .respond_with(html_response(listing_page(
            &[("gamma", "$14.00")],
            Some("/shop/3"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/3"))
        .respond_with(html_response(listing_page(&[("delta", "$16.00")], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = ListingOptions {
        pagination_selector: Some("a.next".to_string()),
        max_pages: 2,
        page_delay: Duration::from_millis(10),
        ..ListingOptions::new("div.product")
    };
    let result = scrape_listing(
        &create_test_fetcher(),
        &format!("{}/shop", mock_server.uri()),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(result.pages_scraped, 2);
    let names: Vec<&str> = result
        .products
        .iter()
        .filter_map(|item| item.name.as_deref())
        .collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert_eq!(result.products[0].price.as_deref(), Some("$10.00"));
    assert_eq!(
        result.products[0].url.as_deref(),
        Some(format!("{}/item/alpha", mock_server.uri()).as_str())
    );
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_listing_stops_at_max_products() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(html_response(listing_page(
            &[("alpha", "$1"), ("beta", "$2"), ("gamma", "$3")],
            Some("/shop/2"),
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/2"))
        .respond_with(html_response(listing_page(&[("delta", "$4")], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = ListingOptions {
        pagination_selector: Some("a.next".to_string()),
        max_products: 2,
        max_pages: 5,
        page_delay: Duration::from_millis(10),
        ..ListingOptions::new("div.product")
    };
    let result = scrape_listing(
        &create_test_fetcher(),
        &format!("{}/shop", mock_server.uri()),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(result.products.len(), 2);
    assert_eq!(result.pages_scraped, 1);
}

#[tokio::test]
async fn test_listing_first_page_failure_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let err = scrape_listing(
        &create_test_fetcher(),
        &mock_server.uri(),
        &ListingOptions::new("div.product"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_listing_later_page_failure_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(html_response(listing_page(&[("alpha", "$1")], Some("/shop/2"))))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shop/2"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let options = ListingOptions {
        pagination_selector: Some("a.next".to_string()),
        max_pages: 3,
        page_delay: Duration::from_millis(10),
        ..ListingOptions::new("div.product")
    };
    let result = scrape_listing(
        &create_test_fetcher(),
        &format!("{}/shop", mock_server.uri()),
        &options,
    )
    .await
    .unwrap();

    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].error_kind, Some(ErrorKind::Forbidden));
}

#[tokio::test]
async fn test_compare_products_statistics() {
    let mock_server = MockServer::start().await;

    let pages = [
        ("/p1", product_page("Basic", "10.00", "https://schema.org/InStock")),
        ("/p2", product_page("Plus", "20.00", "https://schema.org/OutOfStock")),
        ("/p3", product_page("Mystery", "n/a", "")),
    ];
    for (page_path, html) in pages {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html_response(html))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = ["/p1", "/p2", "/p3", "/gone"]
        .iter()
        .map(|p| format!("{}{}", mock_server.uri(), p))
        .collect();
    let comparison = compare_products(&create_test_fetcher(), &urls)
        .await
        .unwrap();

    assert_eq!(comparison.products.len(), 3);
    assert_eq!(comparison.errors.len(), 1);
    assert_eq!(comparison.errors[0].url, urls[3]);

    let prices = &comparison.price_range;
    assert_eq!(prices.min, Some(10.0));
    assert_eq!(prices.max, Some(20.0));
    assert_eq!(prices.avg, Some(15.0));
    assert_eq!(prices.count, 2);

    let availability = &comparison.availability_summary;
    assert_eq!(availability.in_stock, 1);
    assert_eq!(availability.out_of_stock, 1);
    assert_eq!(availability.unknown, 1);
}

#[tokio::test]
async fn test_compare_over_limit_rejected_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_response(product_page("x", "1", "")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..11)
        .map(|i| format!("{}/p{}", mock_server.uri(), i))
        .collect();
    let err = compare_products(&create_test_fetcher(), &urls)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationError);
}
