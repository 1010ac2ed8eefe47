//! Database operations for `supplier_orders`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// Statuses after which an order is no longer polled.
pub const TERMINAL_STATUSES: &[&str] = &["delivered", "cancelled", "failed"];

/// A row from the `supplier_orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierOrderRow {
    pub id: i64,
    /// The shop's own order number.
    pub order_ref: String,
    pub supplier_name: String,
    /// `NULL` until the supplier accepts the order.
    pub supplier_order_id: Option<String>,
    pub status: String,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, order_ref, supplier_name, supplier_order_id, status, \
     tracking_number, tracking_url, attempts, last_error, created_at, updated_at";

/// Records a successfully placed order.
///
/// Re-placing the same `(order_ref, supplier)` pair overwrites the earlier
/// attempt and clears its error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_order_placed(
    pool: &PgPool,
    order_ref: &str,
    supplier_name: &str,
    supplier_order_id: &str,
    status: &str,
    attempts: i32,
) -> Result<SupplierOrderRow, DbError> {
    let row = sqlx::query_as::<_, SupplierOrderRow>(&format!(
        "INSERT INTO supplier_orders \
             (order_ref, supplier_name, supplier_order_id, status, attempts) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (order_ref, supplier_name) DO UPDATE SET \
             supplier_order_id = EXCLUDED.supplier_order_id, \
             status            = EXCLUDED.status, \
             attempts          = EXCLUDED.attempts, \
             last_error        = NULL, \
             updated_at        = NOW() \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_ref)
    .bind(supplier_name)
    .bind(supplier_order_id)
    .bind(status)
    .bind(attempts)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Records an order that could not be placed after all retries.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_order_failed(
    pool: &PgPool,
    order_ref: &str,
    supplier_name: &str,
    attempts: i32,
    error_message: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO supplier_orders \
             (order_ref, supplier_name, status, attempts, last_error) \
         VALUES ($1, $2, 'failed', $3, $4) \
         ON CONFLICT (order_ref, supplier_name) DO UPDATE SET \
             status     = 'failed', \
             attempts   = EXCLUDED.attempts, \
             last_error = EXCLUDED.last_error, \
             updated_at = NOW()",
    )
    .bind(order_ref)
    .bind(supplier_name)
    .bind(attempts)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Stores the latest status and tracking details reported by the supplier.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `id` does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_order_status(
    pool: &PgPool,
    id: i64,
    status: &str,
    tracking_number: Option<&str>,
    tracking_url: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE supplier_orders \
         SET status = $1, \
             tracking_number = COALESCE($2, tracking_number), \
             tracking_url = COALESCE($3, tracking_url), \
             updated_at = NOW() \
         WHERE id = $4",
    )
    .bind(status)
    .bind(tracking_number)
    .bind(tracking_url)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns placed orders that have not reached a terminal status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_open_orders(pool: &PgPool) -> Result<Vec<SupplierOrderRow>, DbError> {
    let terminal: Vec<String> = TERMINAL_STATUSES.iter().map(|s| (*s).to_owned()).collect();
    let rows = sqlx::query_as::<_, SupplierOrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM supplier_orders \
         WHERE supplier_order_id IS NOT NULL AND NOT (status = ANY($1)) \
         ORDER BY id"
    ))
    .bind(&terminal)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks up the order placed with `supplier_name` for a shop order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_supplier_order(
    pool: &PgPool,
    order_ref: &str,
    supplier_name: &str,
) -> Result<Option<SupplierOrderRow>, DbError> {
    let row = sqlx::query_as::<_, SupplierOrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM supplier_orders \
         WHERE order_ref = $1 AND supplier_name = $2"
    ))
    .bind(order_ref)
    .bind(supplier_name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
