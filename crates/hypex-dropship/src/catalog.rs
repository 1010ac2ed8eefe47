//! The seam between dropship workflows and catalog persistence.
//!
//! [`PgCatalog`] forwards to `hypex-db`. Workflow tests use an in-memory
//! implementation instead.

use async_trait::async_trait;
use hypex_core::ProductDraft;
use hypex_db::{DbError, ProductRow, StoredProduct};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Product reads and writes needed by the importer and the sync runner.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_supplier_url(&self, url: &str) -> Result<Option<ProductRow>, DbError>;

    /// Matches on supplier URL first, then on supplier product id.
    async fn find_by_supplier_ref(
        &self,
        url: &str,
        supplier_product_id: Option<&str>,
    ) -> Result<Option<ProductRow>, DbError>;

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DbError>;

    /// Writes the product and its variants atomically; returns the new id.
    async fn insert_product(&self, draft: &ProductDraft) -> Result<i64, DbError>;

    /// Overwrites product `id` and replaces its variants atomically.
    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<(), DbError>;

    async fn get_product(&self, id: i64) -> Result<StoredProduct, DbError>;

    async fn list_store_products(&self, store_id: i64) -> Result<Vec<ProductRow>, DbError>;

    async fn update_supplier_price_and_stock(
        &self,
        id: i64,
        supplier_price: Decimal,
        stock: i32,
    ) -> Result<(), DbError>;
}

/// Bookkeeping for bulk imports.
#[async_trait]
pub trait ImportRunLog: Send + Sync {
    /// Creates and starts a run; returns its id.
    async fn begin_run(&self, urls_total: usize) -> Result<i64, DbError>;

    async fn record_item(
        &self,
        run_id: i64,
        url: &str,
        product_id: Option<i64>,
        error: Option<&str>,
    ) -> Result<(), DbError>;

    async fn finish_run(&self, run_id: i64, urls_succeeded: usize) -> Result<(), DbError>;
}

/// Postgres-backed catalog.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
    trigger_source: &'static str,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            trigger_source: "cli",
        }
    }

    /// Sets the `trigger_source` recorded on import runs.
    #[must_use]
    pub fn with_trigger_source(mut self, trigger_source: &'static str) -> Self {
        self.trigger_source = trigger_source;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn find_by_supplier_url(&self, url: &str) -> Result<Option<ProductRow>, DbError> {
        hypex_db::find_product_by_supplier_url(&self.pool, url).await
    }

    async fn find_by_supplier_ref(
        &self,
        url: &str,
        supplier_product_id: Option<&str>,
    ) -> Result<Option<ProductRow>, DbError> {
        hypex_db::find_product_by_supplier_ref(&self.pool, url, supplier_product_id).await
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DbError> {
        hypex_db::slug_exists(&self.pool, slug, exclude_id).await
    }

    async fn insert_product(&self, draft: &ProductDraft) -> Result<i64, DbError> {
        hypex_db::insert_product_with_variants(&self.pool, draft).await
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<(), DbError> {
        hypex_db::update_product_with_variants(&self.pool, id, draft).await
    }

    async fn get_product(&self, id: i64) -> Result<StoredProduct, DbError> {
        hypex_db::get_product(&self.pool, id).await
    }

    async fn list_store_products(&self, store_id: i64) -> Result<Vec<ProductRow>, DbError> {
        hypex_db::list_store_products(&self.pool, store_id).await
    }

    async fn update_supplier_price_and_stock(
        &self,
        id: i64,
        supplier_price: Decimal,
        stock: i32,
    ) -> Result<(), DbError> {
        hypex_db::update_supplier_price_and_stock(&self.pool, id, supplier_price, stock).await
    }
}

#[async_trait]
impl ImportRunLog for PgCatalog {
    async fn begin_run(&self, urls_total: usize) -> Result<i64, DbError> {
        let total = i32::try_from(urls_total).unwrap_or(i32::MAX);
        let run = hypex_db::create_import_run(&self.pool, self.trigger_source, total).await?;
        hypex_db::start_import_run(&self.pool, run.id).await?;
        Ok(run.id)
    }

    async fn record_item(
        &self,
        run_id: i64,
        url: &str,
        product_id: Option<i64>,
        error: Option<&str>,
    ) -> Result<(), DbError> {
        hypex_db::record_import_run_item(&self.pool, run_id, url, product_id, error).await
    }

    async fn finish_run(&self, run_id: i64, urls_succeeded: usize) -> Result<(), DbError> {
        let succeeded = i32::try_from(urls_succeeded).unwrap_or(i32::MAX);
        hypex_db::complete_import_run(&self.pool, run_id, succeeded).await
    }
}

#[cfg(test)]
pub(crate) mod memory;
