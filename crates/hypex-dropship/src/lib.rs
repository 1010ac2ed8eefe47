//! Dropshipping workflows on top of the scrapers and the catalog database:
//! product import, supplier adapters with order placement, and feed sync.

pub mod adapters;
pub mod catalog;
pub mod error;
pub mod importer;
pub mod orders;
pub mod sync;

pub use adapters::{
    AdapterRegistry, DropshipOrder, OrderLine, ShippingAddress, SupplierAdapter,
    SupplierOrderRef, SupplierOrderStatus,
};
pub use catalog::{CatalogStore, ImportRunLog, PgCatalog};
pub use error::{AdapterError, ImportError, SyncError};
pub use importer::{BulkImportResult, DuplicatePolicy, ImportSettings, ProductImporter};
pub use orders::{
    place_order, poll_order_statuses, OrderLog, PlacedOrder, PollSummary, RetryPolicy,
};
pub use sync::{SupplierSyncRunner, SyncChange, SyncReport};
