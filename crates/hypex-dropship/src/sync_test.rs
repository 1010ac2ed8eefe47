use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use hypex_core::{
    PricingConfig, ProductDraft, SupplierProduct, SupplierTag, SyncPricing,
};
use rust_decimal::Decimal;

use super::*;
use crate::adapters::{DropshipOrder, SupplierOrderRef, SupplierOrderStatus};
use crate::catalog::memory::MemoryCatalog;
use crate::error::AdapterError;

struct FeedAdapter(Vec<SupplierProduct>);

#[async_trait]
impl SupplierAdapter for FeedAdapter {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Temu
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn create_order(&self, _order: &DropshipOrder) -> Result<SupplierOrderRef, AdapterError> {
        unreachable!("sync never places orders")
    }

    async fn get_order_status(&self, _id: &str) -> Result<SupplierOrderStatus, AdapterError> {
        unreachable!("sync never reads orders")
    }

    async fn fetch_products(&self) -> Result<Vec<SupplierProduct>, AdapterError> {
        Ok(self.0.clone())
    }
}

/// Uses the trait's default feed.
struct NoFeedAdapter;

#[async_trait]
impl SupplierAdapter for NoFeedAdapter {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Ebay
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn create_order(&self, _order: &DropshipOrder) -> Result<SupplierOrderRef, AdapterError> {
        unreachable!()
    }

    async fn get_order_status(&self, _id: &str) -> Result<SupplierOrderStatus, AdapterError> {
        unreachable!()
    }
}

fn dec(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

fn feed_item(sku: &str, price: i64, in_stock: bool) -> SupplierProduct {
    SupplierProduct {
        supplier_sku: sku.to_string(),
        name: format!("Feed {sku}"),
        price: dec(price),
        images: vec![],
        in_stock,
        attributes: BTreeMap::new(),
    }
}

fn draft(slug: &str, stock: i32) -> ProductDraft {
    ProductDraft {
        store_id: 1,
        name: format!("Produkt {slug}"),
        slug: slug.to_string(),
        description: String::new(),
        price: dec(199),
        compare_at_price: dec(259),
        supplier_price: dec(80),
        images: vec![],
        category: "Elektronikk".to_string(),
        supplier: SupplierTag::Temu,
        supplier_url: format!("https://www.temu.com/goods/{slug}.html"),
        supplier_product_id: None,
        sku: format!("TEMU-{slug}"),
        stock,
        is_active: true,
        variants: vec![],
    }
}

/// Three catalog rows (A low stock, B well stocked, C no supplier SKU) and a
/// feed with A in stock, B sold out, and one unknown SKU.
fn fixture() -> (Arc<MemoryCatalog>, SupplierSyncRunner) {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.seed(&draft("a", 2), Some("SKU-A"));
    catalog.seed(&draft("b", 100), Some("SKU-B"));
    catalog.seed(&draft("c", 7), None);

    let adapter = FeedAdapter(vec![
        feed_item("SKU-A", 10, true),
        feed_item("SKU-B", 20, false),
        feed_item("SKU-UNKNOWN", 5, true),
    ]);
    let runner = SupplierSyncRunner::new(
        Arc::new(adapter),
        Arc::clone(&catalog) as Arc<dyn CatalogStore>,
        PricingConfig::default(),
        SyncPricing::default(),
        "USD",
    );
    (catalog, runner)
}

#[tokio::test]
async fn dry_run_reports_but_never_writes() {
    let (catalog, runner) = fixture();

    let report = runner.run(1, true).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.supplier_products, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.updated, 0);
    assert_eq!(report.changes.len(), 2);
    assert_eq!(catalog.write_counts(), (0, 0, 0));
    assert_eq!(catalog.product(1).product.supplier_price, dec(80));
}

#[tokio::test]
async fn suggested_price_uses_target_margin() {
    let (_catalog, runner) = fixture();

    let report = runner.run(1, true).await.unwrap();
    let a = &report.changes[0];

    // 10 USD = 105 NOK; 105 / (1 - 0.55) beats 105 × 1.5.
    assert_eq!(a.new_supplier_price, dec(105));
    assert_eq!(a.suggested_price, Decimal::new(23333, 2));
    assert_eq!(a.current_price, dec(199));
}

#[tokio::test]
async fn apply_writes_supplier_price_and_stock_floor() {
    let (catalog, runner) = fixture();

    let report = runner.run(1, false).await.unwrap();

    assert!(!report.dry_run);
    assert_eq!(report.updated, 2);
    assert_eq!(catalog.write_counts(), (0, 0, 2));

    let a = catalog.product(1).product;
    assert_eq!(a.supplier_price, dec(105));
    assert_eq!(a.stock, 5);
    assert_eq!(a.price, dec(199), "sale price is left for a human");

    let b = catalog.product(2).product;
    assert_eq!(b.supplier_price, dec(210));
    assert_eq!(b.stock, 0);

    assert_eq!(catalog.product(3).product.stock, 7);
}

#[tokio::test]
async fn well_stocked_product_keeps_its_stock() {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.seed(&draft("b", 100), Some("SKU-B"));
    let runner = SupplierSyncRunner::new(
        Arc::new(FeedAdapter(vec![feed_item("SKU-B", 20, true)])),
        Arc::clone(&catalog) as Arc<dyn CatalogStore>,
        PricingConfig::default(),
        SyncPricing::default(),
        "USD",
    );

    runner.run(1, false).await.unwrap();

    assert_eq!(catalog.product(1).product.stock, 100);
}

#[tokio::test]
async fn other_stores_are_not_matched() {
    let (_catalog, runner) = fixture();

    let report = runner.run(2, false).await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(report.updated, 0);
}

#[tokio::test]
async fn every_row_sharing_a_sku_is_synced_but_other_suppliers_are_not() {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.seed(&draft("a", 2), Some("SKU-A"));
    catalog.seed(&draft("a-kopi", 1), Some("SKU-A"));
    catalog.seed(
        &ProductDraft {
            supplier: SupplierTag::Alibaba,
            ..draft("ali", 3)
        },
        Some("SKU-A"),
    );
    let runner = SupplierSyncRunner::new(
        Arc::new(FeedAdapter(vec![feed_item("SKU-A", 10, true)])),
        Arc::clone(&catalog) as Arc<dyn CatalogStore>,
        PricingConfig::default(),
        SyncPricing::default(),
        "USD",
    );

    let report = runner.run(1, false).await.unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.updated, 2);
    assert_eq!(catalog.product(1).product.supplier_price, dec(105));
    assert_eq!(catalog.product(2).product.supplier_price, dec(105));
    assert_eq!(catalog.product(2).product.stock, 5);
    assert_eq!(catalog.product(3).product.supplier_price, dec(80));
    assert_eq!(catalog.product(3).product.stock, 3);
}

#[tokio::test]
async fn missing_feed_is_an_error() {
    let runner = SupplierSyncRunner::new(
        Arc::new(NoFeedAdapter),
        Arc::new(MemoryCatalog::new()),
        PricingConfig::default(),
        SyncPricing::default(),
        "USD",
    );

    let err = runner.run(1, true).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Feed(AdapterError::FeedUnsupported(SupplierTag::Ebay))
    ));
}
