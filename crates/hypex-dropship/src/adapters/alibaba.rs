use async_trait::async_trait;
use hypex_core::{SupplierConfig, SupplierProduct, SupplierTag};
use hypex_scraper::PageFetcher;

use super::stub::{digit_digest, StubBackend};
use super::{DropshipOrder, SupplierAdapter, SupplierOrderRef, SupplierOrderStatus};
use crate::error::AdapterError;

/// Alibaba orders ship via Cainiao, which issues `LP` + 14 digit numbers.
pub struct AlibabaAdapter {
    backend: StubBackend,
}

impl AlibabaAdapter {
    #[must_use]
    pub fn new(config: SupplierConfig, fetcher: PageFetcher) -> Self {
        Self {
            backend: StubBackend::new(config, fetcher),
        }
    }
}

#[async_trait]
impl SupplierAdapter for AlibabaAdapter {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Alibaba
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
        let tracking = format!("LP{}", digit_digest(supplier_order_id, 14));
        Ok(self.backend.shipped(tracking))
    }

    async fn fetch_products(&self) -> Result<Vec<SupplierProduct>, AdapterError> {
        self.backend.fetch_feed().await
    }
}
