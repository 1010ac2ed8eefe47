//! Supplier adapters: the only place that knows how to talk to a given
//! marketplace. Callers go through [`AdapterRegistry`] and never branch on
//! the supplier themselves.

mod alibaba;
mod ebay;
mod stub;
mod temu;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use hypex_core::{SupplierProduct, SuppliersFile, SupplierTag};
use hypex_scraper::PageFetcher;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

pub use alibaba::AlibabaAdapter;
pub use ebay::EbayAdapter;
pub use temu::TemuAdapter;

/// A shop order forwarded to a supplier for fulfilment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropshipOrder {
    /// The shop's own order number, e.g. `HX-10023`.
    pub order_ref: String,
    pub lines: Vec<OrderLine>,
    pub shipping: ShippingAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub supplier_sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address_line: String,
    pub postal_code: String,
    pub city: String,
    /// ISO 3166-1 alpha-2.
    pub country: String,
}

/// The supplier's acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierOrderRef {
    pub supplier_order_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierOrderStatus {
    pub status: String,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
}

#[async_trait]
pub trait SupplierAdapter: Send + Sync {
    fn supplier(&self) -> SupplierTag;

    /// `true` when credentials for the supplier are present.
    fn is_configured(&self) -> bool;

    async fn create_order(&self, order: &DropshipOrder) -> Result<SupplierOrderRef, AdapterError>;

    async fn get_order_status(
        &self,
        supplier_order_id: &str,
    ) -> Result<SupplierOrderStatus, AdapterError>;

    /// The supplier's full product feed. Suppliers without a feed keep the
    /// default.
    async fn fetch_products(&self) -> Result<Vec<SupplierProduct>, AdapterError> {
        Err(AdapterError::FeedUnsupported(self.supplier()))
    }
}

/// Lookup table from supplier tag to adapter.
pub struct AdapterRegistry {
    adapters: HashMap<SupplierTag, Arc<dyn SupplierAdapter>>,
    default_supplier: SupplierTag,
}

impl AdapterRegistry {
    /// An empty registry; add adapters with [`AdapterRegistry::with_adapter`].
    #[must_use]
    pub fn new(default_supplier: SupplierTag) -> Self {
        Self {
            adapters: HashMap::new(),
            default_supplier,
        }
    }

    /// Registers the adapter of every supported supplier.
    #[must_use]
    pub fn from_config(
        suppliers: &SuppliersFile,
        fetcher: &PageFetcher,
        default_supplier: SupplierTag,
    ) -> Self {
        Self::new(default_supplier)
            .with_adapter(Arc::new(TemuAdapter::new(
                suppliers.get(SupplierTag::Temu),
                fetcher.clone(),
            )))
            .with_adapter(Arc::new(AlibabaAdapter::new(
                suppliers.get(SupplierTag::Alibaba),
                fetcher.clone(),
            )))
            .with_adapter(Arc::new(EbayAdapter::new(
                suppliers.get(SupplierTag::Ebay),
                fetcher.clone(),
            )))
    }

    /// Adds or replaces the adapter for `adapter.supplier()`.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn SupplierAdapter>) -> Self {
        self.adapters.insert(adapter.supplier(), adapter);
        self
    }

    #[must_use]
    pub fn default_supplier(&self) -> SupplierTag {
        self.default_supplier
    }

    /// Returns the adapter for `supplier`, or for the default supplier when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownSupplier`] when nothing is registered
    /// for the tag.
    pub fn get_supplier_adapter(
        &self,
        supplier: Option<SupplierTag>,
    ) -> Result<Arc<dyn SupplierAdapter>, AdapterError> {
        let tag = supplier.unwrap_or(self.default_supplier);
        self.adapters
            .get(&tag)
            .cloned()
            .ok_or(AdapterError::UnknownSupplier(tag))
    }
}

#[cfg(test)]
#[path = "adapters_test.rs"]
mod tests;
