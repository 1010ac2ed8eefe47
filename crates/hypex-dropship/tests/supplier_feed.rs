//! Supplier feed fetching through the adapters, against a `wiremock` server.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hypex_core::{SupplierConfig, SupplierTag};
use hypex_dropship::adapters::{AlibabaAdapter, TemuAdapter};
use hypex_dropship::{AdapterError, SupplierAdapter};
use hypex_scraper::{FetchConfig, PageFetcher};

fn fetcher() -> PageFetcher {
    PageFetcher::new(&FetchConfig {
        timeout_secs: 5,
        user_agent: "hypex-test/0.1".to_owned(),
        max_retries: 1,
        backoff_base_secs: 0,
    })
    .expect("failed to build test PageFetcher")
}

fn config(supplier: SupplierTag, feed_url: String) -> SupplierConfig {
    SupplierConfig {
        feed_url: Some(feed_url),
        ..SupplierConfig::unconfigured(supplier)
    }
}

#[tokio::test]
async fn bare_array_feed_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"supplier_sku": "601099512345678", "name": "Mus", "price": "6.20", "in_stock": true},
            {"supplier_sku": "601099512345679", "name": "Kabel", "price": 2.5, "in_stock": false,
             "images": ["https://img.example.com/k.jpg"], "attributes": {"length": "1m"}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = TemuAdapter::new(
        config(SupplierTag::Temu, format!("{}/feed.json", server.uri())),
        fetcher(),
    );
    let products = adapter.fetch_products().await.expect("feed should load");

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].supplier_sku, "601099512345678");
    assert!(products[0].in_stock);
    assert!(!products[1].in_stock);
    assert_eq!(products[1].attributes.get("length").map(String::as_str), Some("1m"));
}

#[tokio::test]
async fn wrapped_feed_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {"supplier_sku": "1600123456789", "name": "Lader", "price": "3.10", "in_stock": true}
            ]
        })))
        .mount(&server)
        .await;

    let adapter = AlibabaAdapter::new(
        config(SupplierTag::Alibaba, format!("{}/products", server.uri())),
        fetcher(),
    );
    let products = adapter.fetch_products().await.expect("feed should load");

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Lader");
}

#[tokio::test]
async fn broken_feed_surfaces_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let adapter = TemuAdapter::new(
        config(SupplierTag::Temu, format!("{}/feed.json", server.uri())),
        fetcher(),
    );
    let err = adapter.fetch_products().await.unwrap_err();

    assert!(matches!(err, AdapterError::Fetch(_)), "got {err:?}");
}
