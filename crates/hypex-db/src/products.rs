//! Database operations for `products` and `product_variants`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hypex_core::{ProductDraft, VariantDraft};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool, Postgres, Transaction};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub supplier_price: Decimal,
    pub images: Json<Vec<String>>,
    pub category: String,
    /// One of `temu`, `alibaba`, `ebay` (enforced by a CHECK constraint).
    pub supplier_name: String,
    pub supplier_url: String,
    pub supplier_product_id: Option<String>,
    pub sku: String,
    /// Identifier used to match supplier feed entries during sync.
    pub supplier_sku: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `product_variants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    /// Zero-based order in which the supplier listed the option.
    pub position: i32,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub supplier_price: Decimal,
    pub image: Option<String>,
    pub attributes: Json<BTreeMap<String, String>>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product together with its variants, in `position` order.
#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub product: ProductRow,
    pub variants: Vec<VariantRow>,
}

const PRODUCT_COLUMNS: &str = "id, store_id, name, slug, description, price, compare_at_price, \
     supplier_price, images, category, supplier_name, supplier_url, supplier_product_id, sku, \
     supplier_sku, stock, is_active, created_at, updated_at";

const VARIANT_COLUMNS: &str = "id, product_id, position, name, sku, price, compare_at_price, \
     supplier_price, image, attributes, stock, created_at, updated_at";

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Finds a product by its exact supplier page URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_supplier_url(
    pool: &PgPool,
    supplier_url: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE supplier_url = $1"
    ))
    .bind(supplier_url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Finds a product by supplier URL, or failing that by supplier product id.
///
/// The id fallback catches the same listing reached through a different URL
/// (tracking parameters, regional domains).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn find_product_by_supplier_ref(
    pool: &PgPool,
    supplier_url: &str,
    supplier_product_id: Option<&str>,
) -> Result<Option<ProductRow>, DbError> {
    if let Some(row) = find_product_by_supplier_url(pool, supplier_url).await? {
        return Ok(Some(row));
    }
    let Some(product_id) = supplier_product_id else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE supplier_product_id = $1 \
         ORDER BY id \
         LIMIT 1"
    ))
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns `true` when another product already uses `slug`.
///
/// `exclude_id` skips the product being updated so it does not collide with
/// its own slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn slug_exists(
    pool: &PgPool,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM products \
             WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2) \
         )",
    )
    .bind(slug)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Fetches a product and its variants by internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product exists with the given `id`,
/// or [`DbError::Sqlx`] if a query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<StoredProduct, DbError> {
    let product = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let variants = list_variants(pool, id).await?;
    Ok(StoredProduct { product, variants })
}

/// Returns the variants of a product ordered by `position`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_variants(pool: &PgPool, product_id: i64) -> Result<Vec<VariantRow>, DbError> {
    let rows = sqlx::query_as::<_, VariantRow>(&format!(
        "SELECT {VARIANT_COLUMNS} FROM product_variants \
         WHERE product_id = $1 \
         ORDER BY position"
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all products of a store, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_store_products(
    pool: &PgPool,
    store_id: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE store_id = $1 \
         ORDER BY id"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product and all of its variants in one transaction.
///
/// `supplier_sku` is set from the draft's supplier product id. Returns the
/// new product `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; nothing is written in
/// that case.
pub async fn insert_product_with_variants(
    pool: &PgPool,
    draft: &ProductDraft,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let product_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (store_id, name, slug, description, price, compare_at_price, supplier_price, \
              images, category, supplier_name, supplier_url, supplier_product_id, sku, \
              supplier_sku, stock, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $12, $14, $15) \
         RETURNING id",
    )
    .bind(draft.store_id)
    .bind(&draft.name)
    .bind(&draft.slug)
    .bind(&draft.description)
    .bind(draft.price)
    .bind(draft.compare_at_price)
    .bind(draft.supplier_price)
    .bind(Json(&draft.images))
    .bind(&draft.category)
    .bind(draft.supplier.as_str())
    .bind(&draft.supplier_url)
    .bind(draft.supplier_product_id.as_deref())
    .bind(&draft.sku)
    .bind(draft.stock)
    .bind(draft.is_active)
    .fetch_one(&mut *tx)
    .await?;

    insert_variants(&mut tx, product_id, &draft.variants).await?;

    tx.commit().await?;
    Ok(product_id)
}

/// Overwrites an existing product from a fresh draft and replaces its
/// variants wholesale.
///
/// `created_at` is kept; `updated_at` is bumped.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist, or
/// [`DbError::Sqlx`] if any statement fails. The transaction is rolled back
/// on error.
pub async fn update_product_with_variants(
    pool: &PgPool,
    id: i64,
    draft: &ProductDraft,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE products SET \
             name = $1, slug = $2, description = $3, price = $4, compare_at_price = $5, \
             supplier_price = $6, images = $7, category = $8, supplier_url = $9, \
             supplier_product_id = $10, supplier_sku = $10, sku = $11, stock = $12, \
             is_active = $13, updated_at = NOW() \
         WHERE id = $14",
    )
    .bind(&draft.name)
    .bind(&draft.slug)
    .bind(&draft.description)
    .bind(draft.price)
    .bind(draft.compare_at_price)
    .bind(draft.supplier_price)
    .bind(Json(&draft.images))
    .bind(&draft.category)
    .bind(&draft.supplier_url)
    .bind(draft.supplier_product_id.as_deref())
    .bind(&draft.sku)
    .bind(draft.stock)
    .bind(draft.is_active)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_variants(&mut tx, id, &draft.variants).await?;

    tx.commit().await?;
    Ok(())
}

async fn insert_variants(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    variants: &[VariantDraft],
) -> Result<(), DbError> {
    for (position, variant) in variants.iter().enumerate() {
        let position = i32::try_from(position).unwrap_or(i32::MAX);
        sqlx::query(
            "INSERT INTO product_variants \
                 (product_id, position, name, sku, price, compare_at_price, supplier_price, \
                  image, attributes, stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product_id)
        .bind(position)
        .bind(&variant.name)
        .bind(&variant.sku)
        .bind(variant.price)
        .bind(variant.compare_at_price)
        .bind(variant.supplier_price)
        .bind(variant.image.as_deref())
        .bind(Json(&variant.attributes))
        .bind(variant.stock)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Applies a sync result: new supplier cost and stock.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_supplier_price_and_stock(
    pool: &PgPool,
    id: i64,
    supplier_price: Decimal,
    stock: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE products \
         SET supplier_price = $1, stock = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(supplier_price)
    .bind(stock)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
