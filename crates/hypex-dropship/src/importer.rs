//! Turns supplier product URLs into catalog products.
//!
//! Single imports update a matching catalog row in place. The bulk route
//! defaults to rejecting URLs that are already in the catalog; callers pick
//! the policy explicitly through [`DuplicatePolicy`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use hypex_core::{
    category_for, identify_supplier, slugify, supplier_product_id_from_url, Money, PricingConfig,
    ProductDraft, ProfitMargin, ScrapedProductData, SupplierTag, VariantDraft,
};
use hypex_db::{ProductRow, StoredProduct};
use hypex_scraper::{classify_product, improve_title, ResolveScraper};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::catalog::{CatalogStore, ImportRunLog};
use crate::error::ImportError;

/// Stock assumed when the supplier page does not expose any.
const DEFAULT_IMPORT_STOCK: i32 = 10;
/// Used when the improved title slugifies to nothing.
const FALLBACK_SLUG: &str = "produkt";
const SKU_ID_MAX_LEN: usize = 20;

/// What to do when an imported URL is already in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Match on URL or supplier product id and overwrite that row.
    UpdateExisting,
    /// Match on URL only and fail with [`ImportError::AlreadyExists`].
    Reject,
}

/// Settings shared by every import.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub store_id: i64,
    pub pricing: PricingConfig,
    /// Random pause between bulk URLs, inclusive bounds.
    pub bulk_delay_min_ms: u64,
    pub bulk_delay_max_ms: u64,
}

impl ImportSettings {
    #[must_use]
    pub fn from_app_config(config: &hypex_core::AppConfig) -> Self {
        Self {
            store_id: config.store_id,
            pricing: config.pricing.clone(),
            bulk_delay_min_ms: config.bulk_delay_min_ms,
            bulk_delay_max_ms: config.bulk_delay_max_ms,
        }
    }
}

/// Outcome of one URL in a bulk import.
#[derive(Debug, Clone, Serialize)]
pub struct BulkImportResult {
    pub url: String,
    pub success: bool,
    pub product_id: Option<i64>,
    pub error: Option<String>,
}

pub struct ProductImporter {
    scrapers: Arc<dyn ResolveScraper>,
    catalog: Arc<dyn CatalogStore>,
    settings: ImportSettings,
}

impl ProductImporter {
    pub fn new(
        scrapers: Arc<dyn ResolveScraper>,
        catalog: Arc<dyn CatalogStore>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            scrapers,
            catalog,
            settings,
        }
    }

    /// Imports one product page, updating the catalog row in place when the
    /// URL or supplier product id is already known.
    ///
    /// Nothing is written unless the scrape and pricing both succeed.
    ///
    /// # Errors
    ///
    /// - [`ImportError::UnsupportedSupplier`] for URLs outside Temu, Alibaba
    ///   and eBay.
    /// - [`ImportError::ScrapeFailed`] with the scraper's message.
    /// - [`ImportError::Pricing`] when the scraped currency is unknown.
    /// - [`ImportError::Db`] when a catalog read or write fails.
    pub async fn import_product_from_url(
        &self,
        url: &str,
        margin: &ProfitMargin,
    ) -> Result<StoredProduct, ImportError> {
        self.import(url, margin, DuplicatePolicy::UpdateExisting)
            .await
    }

    /// Imports a product that must not be in the catalog yet.
    ///
    /// # Errors
    ///
    /// Same as [`ProductImporter::import_product_from_url`], plus
    /// [`ImportError::AlreadyExists`] when the URL is already imported. The
    /// existing row is left untouched.
    pub async fn import_new_product(
        &self,
        url: &str,
        margin: &ProfitMargin,
    ) -> Result<StoredProduct, ImportError> {
        self.import(url, margin, DuplicatePolicy::Reject).await
    }

    /// Imports `urls` one after another with a random pause in between.
    ///
    /// A failing URL never stops the batch; each URL gets a result entry in
    /// input order. When `run_log` is given the batch is recorded as an
    /// import run. Bookkeeping failures are logged and do not affect the
    /// import itself.
    pub async fn bulk_import_products(
        &self,
        urls: &[String],
        margin: &ProfitMargin,
        policy: DuplicatePolicy,
        run_log: Option<&dyn ImportRunLog>,
    ) -> Vec<BulkImportResult> {
        let run_id = match run_log {
            Some(log) => match log.begin_run(urls.len()).await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "could not record import run; continuing without");
                    None
                }
            },
            None => None,
        };

        let mut results = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            if index > 0 {
                self.pause_between_urls().await;
            }

            let result = match self.import(url, margin, policy).await {
                Ok(stored) => {
                    tracing::info!(
                        url = %url,
                        product_id = stored.product.id,
                        "bulk import: product imported"
                    );
                    BulkImportResult {
                        url: url.clone(),
                        success: true,
                        product_id: Some(stored.product.id),
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "bulk import: product failed");
                    BulkImportResult {
                        url: url.clone(),
                        success: false,
                        product_id: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            if let (Some(log), Some(run_id)) = (run_log, run_id) {
                if let Err(e) = log
                    .record_item(run_id, url, result.product_id, result.error.as_deref())
                    .await
                {
                    tracing::warn!(run_id, url = %url, error = %e, "could not record import item");
                }
            }
            results.push(result);
        }

        if let (Some(log), Some(run_id)) = (run_log, run_id) {
            let succeeded = results.iter().filter(|r| r.success).count();
            if let Err(e) = log.finish_run(run_id, succeeded).await {
                tracing::warn!(run_id, error = %e, "could not complete import run");
            }
        }

        results
    }

    async fn pause_between_urls(&self) {
        let min = self.settings.bulk_delay_min_ms;
        let max = self.settings.bulk_delay_max_ms.max(min);
        if max == 0 {
            return;
        }
        let delay_ms = rand::rng().random_range(min..=max);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    async fn import(
        &self,
        url: &str,
        margin: &ProfitMargin,
        policy: DuplicatePolicy,
    ) -> Result<StoredProduct, ImportError> {
        let url = url.trim();
        let supplier =
            identify_supplier(url).ok_or_else(|| ImportError::UnsupportedSupplier {
                url: url.to_owned(),
                supported: SupplierTag::supported_list(),
            })?;

        if policy == DuplicatePolicy::Reject {
            if let Some(row) = self.catalog.find_by_supplier_url(url).await? {
                return Err(ImportError::AlreadyExists { product_id: row.id });
            }
        }

        let scraper = self
            .scrapers
            .resolve(supplier)
            .map_err(|e| ImportError::ScrapeFailed(e.to_string()))?;
        let data = scraper
            .scrape_product(url)
            .await
            .into_result()
            .map_err(ImportError::ScrapeFailed)?;

        let supplier_product_id = supplier_product_id_from_url(url);
        let existing = self
            .find_existing(url, supplier_product_id.as_deref(), policy)
            .await?;

        let existing_id = existing.as_ref().map(|row| row.id);
        let draft = self
            .build_draft(supplier, url, supplier_product_id, &data, margin, existing_id)
            .await?;

        let id = match existing_id {
            Some(id) => {
                self.catalog.update_product(id, &draft).await?;
                tracing::info!(product_id = id, supplier = %supplier, url, "updated existing product");
                id
            }
            None => {
                let id = self.catalog.insert_product(&draft).await?;
                tracing::info!(product_id = id, supplier = %supplier, url, "created product");
                id
            }
        };

        Ok(self.catalog.get_product(id).await?)
    }

    async fn find_existing(
        &self,
        url: &str,
        supplier_product_id: Option<&str>,
        policy: DuplicatePolicy,
    ) -> Result<Option<ProductRow>, ImportError> {
        match policy {
            DuplicatePolicy::UpdateExisting => Ok(self
                .catalog
                .find_by_supplier_ref(url, supplier_product_id)
                .await?),
            DuplicatePolicy::Reject => match self.catalog.find_by_supplier_url(url).await? {
                Some(row) => Err(ImportError::AlreadyExists { product_id: row.id }),
                None => Ok(None),
            },
        }
    }

    async fn build_draft(
        &self,
        supplier: SupplierTag,
        url: &str,
        supplier_product_id: Option<String>,
        data: &ScrapedProductData,
        margin: &ProfitMargin,
        existing_id: Option<i64>,
    ) -> Result<ProductDraft, ImportError> {
        let pricing = &self.settings.pricing;
        let prices = pricing.nok_prices(&data.price, margin)?;

        let mut name = improve_title(&data.title);
        if name.is_empty() {
            name = data.title.trim().to_owned();
        }
        let category = category_for(classify_product(&name)).to_owned();
        let slug = self.unique_slug(&name, existing_id).await?;
        let sku = parent_sku(supplier, supplier_product_id.as_deref(), url);

        let mut variants = Vec::new();
        if data.has_variants() {
            for (index, variant) in data.variants.iter().enumerate() {
                let cost = Money::new(variant.price, &data.price.currency);
                let variant_prices = pricing.nok_prices(&cost, margin)?;
                variants.push(VariantDraft {
                    name: variant.name.clone(),
                    sku: format!("{sku}-V{index}"),
                    price: variant_prices.price,
                    compare_at_price: Some(variant_prices.compare_at_price),
                    supplier_price: variant_prices.supplier_price,
                    image: variant.image.clone(),
                    attributes: variant.attributes.clone(),
                    stock: variant.stock.max(0),
                });
            }
        }

        let variant_stock = variants
            .iter()
            .fold(0_i32, |total, v| total.saturating_add(v.stock));
        let stock = if variant_stock > 0 {
            variant_stock
        } else {
            DEFAULT_IMPORT_STOCK
        };

        Ok(ProductDraft {
            store_id: self.settings.store_id,
            name,
            slug,
            description: describe(data),
            price: prices.price,
            compare_at_price: prices.compare_at_price,
            supplier_price: prices.supplier_price,
            images: gallery(data, &variants),
            category,
            supplier,
            supplier_url: url.to_owned(),
            supplier_product_id,
            sku,
            stock,
            is_active: true,
            variants,
        })
    }

    /// First free slug among `base`, `base-2`, `base-3`, ...
    async fn unique_slug(&self, name: &str, exclude_id: Option<i64>) -> Result<String, ImportError> {
        let mut base = slugify(name);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_owned();
        }

        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while self.catalog.slug_taken(&candidate, exclude_id).await? {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        Ok(candidate)
    }
}

/// `{PREFIX}-{id}` where `id` is the supplier product id reduced to
/// alphanumerics, or a URL hash when the URL carries no usable id.
fn parent_sku(supplier: SupplierTag, supplier_product_id: Option<&str>, url: &str) -> String {
    let mut id: String = supplier_product_id
        .unwrap_or_default()
        .trim_end_matches(".html")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if id.is_empty() {
        let digest = Sha256::digest(url.as_bytes());
        id = digest[..5].iter().map(|b| format!("{b:02X}")).collect();
    } else if id.len() > SKU_ID_MAX_LEN {
        // Marketplace ids are numeric tails; keep the distinguishing end.
        id = id.split_off(id.len() - SKU_ID_MAX_LEN);
    }
    format!("{}-{id}", supplier.sku_prefix())
}

/// Variant images first, then the product gallery, without duplicates.
fn gallery(data: &ScrapedProductData, variants: &[VariantDraft]) -> Vec<String> {
    let mut seen = HashSet::new();
    variants
        .iter()
        .filter_map(|v| v.image.as_deref())
        .chain(data.images.iter().map(String::as_str))
        .filter(|image| !image.is_empty() && seen.insert(*image))
        .map(str::to_owned)
        .collect()
}

/// The scraped description, or a list of the product specs when the page had none.
fn describe(data: &ScrapedProductData) -> String {
    let description = data.description.trim();
    if !description.is_empty() || data.specs.is_empty() {
        return description.to_owned();
    }
    data.specs
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "importer_test.rs"]
mod tests;
