use hypex_core::SupplierConfig;
use hypex_scraper::FetchConfig;

use super::*;

fn fetcher() -> PageFetcher {
    PageFetcher::new(&FetchConfig {
        timeout_secs: 5,
        user_agent: "hypex-test".to_string(),
        max_retries: 0,
        backoff_base_secs: 0,
    })
    .unwrap()
}

fn config(supplier: SupplierTag) -> SupplierConfig {
    SupplierConfig {
        tracking_url_template: Some("https://track.example/{tracking}".to_string()),
        ..SupplierConfig::unconfigured(supplier)
    }
}

fn order(order_ref: &str) -> DropshipOrder {
    DropshipOrder {
        order_ref: order_ref.to_string(),
        lines: vec![OrderLine {
            supplier_sku: "601099512345678".to_string(),
            quantity: 2,
        }],
        shipping: ShippingAddress {
            name: "Kari Nordmann".to_string(),
            address_line: "Storgata 1".to_string(),
            postal_code: "0155".to_string(),
            city: "Oslo".to_string(),
            country: "NO".to_string(),
        },
    }
}

#[tokio::test]
async fn order_ids_are_deterministic_per_reference() {
    let temu = TemuAdapter::new(config(SupplierTag::Temu), fetcher());

    let first = temu.create_order(&order("HX-1001")).await.unwrap();
    let again = temu.create_order(&order("HX-1001")).await.unwrap();
    let other = temu.create_order(&order("HX-1002")).await.unwrap();

    assert_eq!(first, again);
    assert_ne!(first.supplier_order_id, other.supplier_order_id);
    assert!(first.supplier_order_id.starts_with("TEMU-"));
    assert_eq!(first.supplier_order_id.len(), "TEMU-".len() + 12);
    assert_eq!(first.status, "pending");
}

#[tokio::test]
async fn each_supplier_uses_its_own_prefix() {
    let alibaba = AlibabaAdapter::new(config(SupplierTag::Alibaba), fetcher());
    let ebay = EbayAdapter::new(config(SupplierTag::Ebay), fetcher());

    let ali_ref = alibaba.create_order(&order("HX-1")).await.unwrap();
    let ebay_ref = ebay.create_order(&order("HX-1")).await.unwrap();

    assert!(ali_ref.supplier_order_id.starts_with("ALI-"));
    assert!(ebay_ref.supplier_order_id.starts_with("EBAY-"));
}

#[tokio::test]
async fn status_is_shipped_with_templated_tracking_url() {
    let alibaba = AlibabaAdapter::new(config(SupplierTag::Alibaba), fetcher());
    let placed = alibaba.create_order(&order("HX-1001")).await.unwrap();

    let status = alibaba
        .get_order_status(&placed.supplier_order_id)
        .await
        .unwrap();

    assert_eq!(status.status, "shipped");
    let tracking = status.tracking_number.unwrap();
    assert!(tracking.starts_with("LP"));
    assert_eq!(tracking.len(), 16);
    assert!(tracking[2..].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(
        status.tracking_url.as_deref(),
        Some(format!("https://track.example/{tracking}").as_str())
    );
}

#[tokio::test]
async fn foreign_order_id_is_rejected() {
    let ebay = EbayAdapter::new(config(SupplierTag::Ebay), fetcher());

    let err = ebay.get_order_status("TEMU-ABCDEF").await.unwrap_err();

    assert!(matches!(err, AdapterError::Rejected { .. }));
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let temu = TemuAdapter::new(config(SupplierTag::Temu), fetcher());
    let mut empty = order("HX-9");
    empty.lines.clear();

    let err = temu.create_order(&empty).await.unwrap_err();

    assert!(err.to_string().contains("has no lines"), "got: {err}");
}

#[tokio::test]
async fn feed_without_url_is_unsupported() {
    let ebay = EbayAdapter::new(config(SupplierTag::Ebay), fetcher());

    let err = ebay.fetch_products().await.unwrap_err();

    assert!(matches!(err, AdapterError::FeedUnsupported(SupplierTag::Ebay)));
}

#[test]
fn adapter_without_api_key_is_not_configured() {
    let temu = TemuAdapter::new(config(SupplierTag::Temu), fetcher());
    assert!(!temu.is_configured());
}

#[test]
fn registry_falls_back_to_default_supplier() {
    let registry =
        AdapterRegistry::from_config(&SuppliersFile::default(), &fetcher(), SupplierTag::Alibaba);

    let default = registry.get_supplier_adapter(None).unwrap();
    let ebay = registry.get_supplier_adapter(Some(SupplierTag::Ebay)).unwrap();

    assert_eq!(default.supplier(), SupplierTag::Alibaba);
    assert_eq!(ebay.supplier(), SupplierTag::Ebay);
}

#[test]
fn empty_registry_reports_unknown_supplier() {
    let registry = AdapterRegistry::new(SupplierTag::Temu);

    let err = registry.get_supplier_adapter(None).err().unwrap();

    assert!(matches!(err, AdapterError::UnknownSupplier(SupplierTag::Temu)));
}
