//! Database operations for `import_runs` and `import_run_items`.
//!
//! A run moves `queued` → `running` → `succeeded` | `failed`. Each transition
//! is guarded in SQL so an out-of-order call fails instead of silently
//! rewriting a finished run.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `import_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `cli` or `api`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub urls_total: i32,
    pub urls_succeeded: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `import_run_items` table; one per URL in the batch.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunItemRow {
    pub id: i64,
    pub import_run_id: i64,
    pub url: String,
    pub status: String,
    pub product_id: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
     urls_total, urls_succeeded, error_message, created_at";

// ---------------------------------------------------------------------------
// import_runs operations
// ---------------------------------------------------------------------------

/// Creates a new import run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_import_run(
    pool: &PgPool,
    trigger_source: &str,
    urls_total: i32,
) -> Result<ImportRunRow, DbError> {
    let row = sqlx::query_as::<_, ImportRunRow>(&format!(
        "INSERT INTO import_runs (public_id, trigger_source, status, urls_total) \
         VALUES ($1, $2, 'queued', $3) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(trigger_source)
    .bind(urls_total)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_import_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "queued",
        });
    }
    Ok(())
}

/// Marks a run as `succeeded` and records how many URLs imported cleanly.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_import_run(
    pool: &PgPool,
    id: i64,
    urls_succeeded: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'succeeded', completed_at = NOW(), urls_succeeded = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(urls_succeeded)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Marks a run as `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_import_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_import_run(pool: &PgPool, id: i64) -> Result<ImportRunRow, DbError> {
    sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_runs(pool: &PgPool, limit: i64) -> Result<Vec<ImportRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// import_run_items operations
// ---------------------------------------------------------------------------

/// Records the outcome of one URL in a run.
///
/// A repeated URL within the same run overwrites the earlier outcome.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_import_run_item(
    pool: &PgPool,
    run_id: i64,
    url: &str,
    product_id: Option<i64>,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let status = if error_message.is_some() {
        "failed"
    } else {
        "succeeded"
    };

    sqlx::query(
        "INSERT INTO import_run_items (import_run_id, url, status, product_id, error_message) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (import_run_id, url) DO UPDATE SET \
             status        = EXCLUDED.status, \
             product_id    = EXCLUDED.product_id, \
             error_message = EXCLUDED.error_message",
    )
    .bind(run_id)
    .bind(url)
    .bind(status)
    .bind(product_id)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns all item rows of a run in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_run_items(
    pool: &PgPool,
    run_id: i64,
) -> Result<Vec<ImportRunItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunItemRow>(
        "SELECT id, import_run_id, url, status, product_id, error_message, created_at \
         FROM import_run_items \
         WHERE import_run_id = $1 \
         ORDER BY id",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
