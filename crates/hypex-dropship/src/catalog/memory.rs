//! In-memory [`CatalogStore`] and [`ImportRunLog`] for workflow tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use hypex_core::ProductDraft;
use hypex_db::{DbError, ProductRow, StoredProduct, VariantRow};
use rust_decimal::Decimal;
use sqlx::types::Json;

use super::{CatalogStore, ImportRunLog};

#[derive(Debug, Default)]
struct State {
    products: Vec<StoredProduct>,
    inserts: usize,
    updates: usize,
    sync_writes: usize,
    runs: Vec<RecordedRun>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordedRun {
    pub total: usize,
    pub items: Vec<(String, Option<i64>, Option<String>)>,
    pub succeeded: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds a row as if it had been imported earlier.
    pub(crate) fn seed(&self, draft: &ProductDraft, supplier_sku: Option<&str>) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = i64::try_from(state.products.len()).unwrap() + 1;
        let mut stored = to_stored(id, draft);
        stored.product.supplier_sku = supplier_sku.map(str::to_owned);
        state.products.push(stored);
        id
    }

    pub(crate) fn product(&self, id: i64) -> StoredProduct {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| p.product.id == id)
            .cloned()
            .unwrap()
    }

    pub(crate) fn product_count(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }

    /// Inserts, full updates, and sync writes, in that order.
    pub(crate) fn write_counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock().unwrap();
        (state.inserts, state.updates, state.sync_writes)
    }

    pub(crate) fn runs(&self) -> Vec<RecordedRun> {
        self.state.lock().unwrap().runs.clone()
    }
}

fn to_stored(id: i64, draft: &ProductDraft) -> StoredProduct {
    let now = Utc::now();
    let product = ProductRow {
        id,
        store_id: draft.store_id,
        name: draft.name.clone(),
        slug: draft.slug.clone(),
        description: draft.description.clone(),
        price: draft.price,
        compare_at_price: Some(draft.compare_at_price),
        supplier_price: draft.supplier_price,
        images: Json(draft.images.clone()),
        category: draft.category.clone(),
        supplier_name: draft.supplier.as_str().to_owned(),
        supplier_url: draft.supplier_url.clone(),
        supplier_product_id: draft.supplier_product_id.clone(),
        sku: draft.sku.clone(),
        supplier_sku: draft.supplier_product_id.clone(),
        stock: draft.stock,
        is_active: draft.is_active,
        created_at: now,
        updated_at: now,
    };
    let variants = draft
        .variants
        .iter()
        .enumerate()
        .map(|(position, v)| VariantRow {
            id: id * 1000 + i64::try_from(position).unwrap(),
            product_id: id,
            position: i32::try_from(position).unwrap(),
            name: v.name.clone(),
            sku: v.sku.clone(),
            price: v.price,
            compare_at_price: v.compare_at_price,
            supplier_price: v.supplier_price,
            image: v.image.clone(),
            attributes: Json(v.attributes.clone()),
            stock: v.stock,
            created_at: now,
            updated_at: now,
        })
        .collect();
    StoredProduct { product, variants }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_by_supplier_url(&self, url: &str) -> Result<Option<ProductRow>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .find(|p| p.product.supplier_url == url)
            .map(|p| p.product.clone()))
    }

    async fn find_by_supplier_ref(
        &self,
        url: &str,
        supplier_product_id: Option<&str>,
    ) -> Result<Option<ProductRow>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .find(|p| {
                p.product.supplier_url == url
                    || (supplier_product_id.is_some()
                        && p.product.supplier_product_id.as_deref() == supplier_product_id)
            })
            .map(|p| p.product.clone()))
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .any(|p| p.product.slug == slug && Some(p.product.id) != exclude_id))
    }

    async fn insert_product(&self, draft: &ProductDraft) -> Result<i64, DbError> {
        let mut state = self.state.lock().unwrap();
        let id = i64::try_from(state.products.len()).unwrap() + 1;
        state.products.push(to_stored(id, draft));
        state.inserts += 1;
        Ok(id)
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.product.id == id)
            .ok_or(DbError::NotFound)?;
        *slot = to_stored(id, draft);
        state.updates += 1;
        Ok(())
    }

    async fn get_product(&self, id: i64) -> Result<StoredProduct, DbError> {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| p.product.id == id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn list_store_products(&self, store_id: i64) -> Result<Vec<ProductRow>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .filter(|p| p.product.store_id == store_id)
            .map(|p| p.product.clone())
            .collect())
    }

    async fn update_supplier_price_and_stock(
        &self,
        id: i64,
        supplier_price: Decimal,
        stock: i32,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.product.id == id)
            .ok_or(DbError::NotFound)?;
        slot.product.supplier_price = supplier_price;
        slot.product.stock = stock;
        state.sync_writes += 1;
        Ok(())
    }
}

#[async_trait]
impl ImportRunLog for MemoryCatalog {
    async fn begin_run(&self, urls_total: usize) -> Result<i64, DbError> {
        let mut state = self.state.lock().unwrap();
        state.runs.push(RecordedRun {
            total: urls_total,
            ..RecordedRun::default()
        });
        Ok(i64::try_from(state.runs.len()).unwrap())
    }

    async fn record_item(
        &self,
        run_id: i64,
        url: &str,
        product_id: Option<i64>,
        error: Option<&str>,
    ) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        let run = &mut state.runs[usize::try_from(run_id - 1).unwrap()];
        run.items
            .push((url.to_owned(), product_id, error.map(str::to_owned)));
        Ok(())
    }

    async fn finish_run(&self, run_id: i64, urls_succeeded: usize) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.runs[usize::try_from(run_id - 1).unwrap()].succeeded = Some(urls_succeeded);
        Ok(())
    }
}
