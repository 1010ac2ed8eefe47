use async_trait::async_trait;
use hypex_core::{SupplierConfig, SupplierProduct, SupplierTag};
use hypex_scraper::PageFetcher;

use super::stub::{digit_digest, StubBackend};
use super::{DropshipOrder, SupplierAdapter, SupplierOrderRef, SupplierOrderStatus};
use crate::error::AdapterError;

/// eBay sellers ship with whatever carrier they like; tracking is a bare
/// 12 digit number.
pub struct EbayAdapter {
    backend: StubBackend,
}

impl EbayAdapter {
    #[must_use]
    pub fn new(config: SupplierConfig, fetcher: PageFetcher) -> Self {
        Self {
            backend: StubBackend::new(config, fetcher),
        }
    }
}

#[async_trait]
impl SupplierAdapter for EbayAdapter {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Ebay
    }

    fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    async fn create_order(&self, order: &DropshipOrder) -> Result<SupplierOrderRef, AdapterError> {
        self.backend.create_order(order)
    }

    async fn get_order_status(
        &self,
        supplier_order_id: &str,
    ) -> Result<SupplierOrderStatus, AdapterError> {
        self.backend.check_order_id(supplier_order_id)?;
        Ok(self.backend.shipped(digit_digest(supplier_order_id, 12)))
    }

    async fn fetch_products(&self) -> Result<Vec<SupplierProduct>, AdapterError> {
        self.backend.fetch_feed().await
    }
}
