//! Behaviour shared by the placeholder supplier integrations.
//!
//! No marketplace exposes an ordering API to us yet, so orders are
//! acknowledged locally with ids derived from the order reference. The
//! product feed is real when the supplier has a `feed_url`.

use hypex_core::{SupplierConfig, SupplierProduct, SupplierTag};
use hypex_scraper::PageFetcher;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{DropshipOrder, SupplierOrderRef, SupplierOrderStatus};
use crate::error::AdapterError;

const ORDER_ID_HEX_LEN: usize = 12;

/// Feeds come either as a bare array or wrapped in `{"products": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeedBody {
    Bare(Vec<SupplierProduct>),
    Wrapped { products: Vec<SupplierProduct> },
}

pub(super) struct StubBackend {
    config: SupplierConfig,
    fetcher: PageFetcher,
}

impl StubBackend {
    pub(super) fn new(config: SupplierConfig, fetcher: PageFetcher) -> Self {
        Self { config, fetcher }
    }

    fn supplier(&self) -> SupplierTag {
        self.config.supplier
    }

    pub(super) fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }

    pub(super) fn create_order(
        &self,
        order: &DropshipOrder,
    ) -> Result<SupplierOrderRef, AdapterError> {
        let supplier = self.supplier();
        if order.lines.is_empty() {
            return Err(AdapterError::Rejected {
                supplier,
                message: format!("order {} has no lines", order.order_ref),
            });
        }
        if let Some(line) = order.lines.iter().find(|line| line.quantity == 0) {
            return Err(AdapterError::Rejected {
                supplier,
                message: format!("line {} has zero quantity", line.supplier_sku),
            });
        }

        let supplier_order_id = format!(
            "{}-{}",
            supplier.sku_prefix(),
            hex_digest(&order.order_ref, ORDER_ID_HEX_LEN)
        );
        tracing::info!(
            supplier = %supplier,
            order_ref = %order.order_ref,
            supplier_order_id = %supplier_order_id,
            lines = order.lines.len(),
            "supplier order acknowledged"
        );
        Ok(SupplierOrderRef {
            supplier_order_id,
            status: "pending".to_string(),
        })
    }

    /// Rejects ids this supplier could not have issued.
    pub(super) fn check_order_id(&self, supplier_order_id: &str) -> Result<(), AdapterError> {
        let prefix = format!("{}-", self.supplier().sku_prefix());
        if supplier_order_id.starts_with(&prefix) {
            Ok(())
        } else {
            Err(AdapterError::Rejected {
                supplier: self.supplier(),
                message: format!("unknown order id {supplier_order_id}"),
            })
        }
    }

    pub(super) fn shipped(&self, tracking_number: String) -> SupplierOrderStatus {
        SupplierOrderStatus {
            status: "shipped".to_string(),
            tracking_url: self.config.tracking_url(&tracking_number),
            tracking_number: Some(tracking_number),
        }
    }

    pub(super) async fn fetch_feed(&self) -> Result<Vec<SupplierProduct>, AdapterError> {
        let Some(feed_url) = self.config.feed_url.as_deref() else {
            return Err(AdapterError::FeedUnsupported(self.supplier()));
        };
        let body: FeedBody = self.fetcher.fetch_json(feed_url).await?;
        let products = match body {
            FeedBody::Bare(products) | FeedBody::Wrapped { products } => products,
        };
        tracing::info!(
            supplier = %self.supplier(),
            count = products.len(),
            "fetched supplier feed"
        );
        Ok(products)
    }
}

/// First `len` upper-case hex characters of `SHA-256(input)`.
pub(super) fn hex_digest(input: &str, len: usize) -> String {
    let hex: String = Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect();
    hex.chars().take(len).collect()
}

/// Decimal digits derived from `SHA-256(input)`, `len` long.
pub(super) fn digit_digest(input: &str, len: usize) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .cycle()
        .take(len)
        .map(|b| char::from(b'0' + b % 10))
        .collect()
}
