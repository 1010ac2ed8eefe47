//! Reconciles catalog prices and stock against a supplier's product feed.
//!
//! Runs read-only unless the caller passes `dry_run = false`.

use std::collections::HashMap;
use std::sync::Arc;

use hypex_core::{round_nok, suggested_price, Money, PricingConfig, SyncPricing};
use hypex_db::ProductRow;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::SupplierAdapter;
use crate::catalog::CatalogStore;
use crate::error::SyncError;

/// Stock set on a matched product that the supplier has in stock but the
/// catalog lists with fewer units.
const IN_STOCK_FLOOR: i32 = 5;

/// One matched catalog product and what the sync would do to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncChange {
    pub product_id: i64,
    pub supplier_sku: String,
    pub name: String,
    pub old_supplier_price: Decimal,
    pub new_supplier_price: Decimal,
    pub current_price: Decimal,
    pub suggested_price: Decimal,
    pub old_stock: i32,
    pub new_stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries in the supplier feed.
    pub supplier_products: usize,
    pub matched: usize,
    /// Catalog rows written; always `0` on a dry run.
    pub updated: usize,
    pub dry_run: bool,
    pub changes: Vec<SyncChange>,
}

pub struct SupplierSyncRunner {
    adapter: Arc<dyn SupplierAdapter>,
    catalog: Arc<dyn CatalogStore>,
    pricing: PricingConfig,
    sync_pricing: SyncPricing,
    feed_currency: String,
}

impl SupplierSyncRunner {
    pub fn new(
        adapter: Arc<dyn SupplierAdapter>,
        catalog: Arc<dyn CatalogStore>,
        pricing: PricingConfig,
        sync_pricing: SyncPricing,
        feed_currency: &str,
    ) -> Self {
        Self {
            adapter,
            catalog,
            pricing,
            sync_pricing,
            feed_currency: feed_currency.to_owned(),
        }
    }

    /// Fetches the supplier feed and matches it to the store's products from
    /// the same supplier by exact `supplier_sku`.
    ///
    /// Every match gets a suggested price. Supplier price and stock are
    /// written only when `dry_run` is `false`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Feed`] if the feed cannot be fetched.
    /// - [`SyncError::Pricing`] if the feed currency is not convertible.
    /// - [`SyncError::Db`] if the catalog cannot be read or written.
    pub async fn run(&self, store_id: i64, dry_run: bool) -> Result<SyncReport, SyncError> {
        let supplier = self.adapter.supplier();
        let feed = self.adapter.fetch_products().await?;
        let products = self.catalog.list_store_products(store_id).await?;

        // Several rows may share a SKU; every one of them is reconciled.
        let mut by_sku: HashMap<&str, Vec<&ProductRow>> = HashMap::new();
        for product in products
            .iter()
            .filter(|p| p.supplier_name == supplier.as_str())
        {
            if let Some(sku) = product.supplier_sku.as_deref() {
                by_sku.entry(sku).or_default().push(product);
            }
        }

        let mut report = SyncReport {
            supplier_products: feed.len(),
            matched: 0,
            updated: 0,
            dry_run,
            changes: Vec::new(),
        };

        for item in &feed {
            let Some(rows) = by_sku.get(item.supplier_sku.as_str()) else {
                continue;
            };
            let cost = round_nok(
                self.pricing
                    .to_nok(&Money::new(item.price, &self.feed_currency))?,
            );

            for product in rows {
                report.matched += 1;
                let new_stock = if item.in_stock {
                    product.stock.max(IN_STOCK_FLOOR)
                } else {
                    0
                };
                let change = SyncChange {
                    product_id: product.id,
                    supplier_sku: item.supplier_sku.clone(),
                    name: product.name.clone(),
                    old_supplier_price: product.supplier_price,
                    new_supplier_price: cost,
                    current_price: product.price,
                    suggested_price: suggested_price(cost, &self.sync_pricing),
                    old_stock: product.stock,
                    new_stock,
                };

                if dry_run {
                    tracing::info!(
                        supplier = %supplier,
                        product_id = change.product_id,
                        supplier_sku = %change.supplier_sku,
                        new_supplier_price = %change.new_supplier_price,
                        suggested_price = %change.suggested_price,
                        new_stock = change.new_stock,
                        "dry run: would update product"
                    );
                } else {
                    self.catalog
                        .update_supplier_price_and_stock(product.id, cost, new_stock)
                        .await?;
                    report.updated += 1;
                    tracing::debug!(
                        supplier = %supplier,
                        product_id = change.product_id,
                        new_supplier_price = %change.new_supplier_price,
                        new_stock = change.new_stock,
                        "product synced"
                    );
                }
                report.changes.push(change);
            }
        }

        tracing::info!(
            supplier = %supplier,
            store_id,
            supplier_products = report.supplier_products,
            matched = report.matched,
            updated = report.updated,
            dry_run,
            "supplier sync finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
