//! Placing dropship orders with suppliers and following them until they
//! arrive.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use hypex_core::SupplierTag;
use hypex_db::{DbError, SupplierOrderRow};
use hypex_scraper::retry_with_backoff;
use serde::Serialize;

use crate::adapters::{
    AdapterRegistry, DropshipOrder, SupplierAdapter, SupplierOrderRef, SupplierOrderStatus,
};
use crate::catalog::PgCatalog;
use crate::error::AdapterError;

const DEFAULT_POLL_CONCURRENCY: usize = 4;

/// Retry settings for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_app_config(config: &hypex_core::AppConfig) -> Self {
        Self {
            max_retries: config.order_max_retries,
            backoff_base_secs: config.order_retry_backoff_base_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub supplier: SupplierTag,
    pub reference: SupplierOrderRef,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Persistence for supplier orders.
#[async_trait]
pub trait OrderLog: Send + Sync {
    async fn order_placed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        reference: &SupplierOrderRef,
        attempts: u32,
    ) -> Result<(), DbError>;

    async fn order_failed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        attempts: u32,
        error: &str,
    ) -> Result<(), DbError>;

    async fn open_orders(&self) -> Result<Vec<SupplierOrderRow>, DbError>;

    async fn status_changed(&self, id: i64, status: &SupplierOrderStatus) -> Result<(), DbError>;
}

/// Places `order` with a supplier, retrying upstream outages with
/// exponential backoff, and records the outcome.
///
/// # Errors
///
/// - [`AdapterError::UnknownSupplier`] if no adapter is registered.
/// - [`AdapterError::NotConfigured`] if the supplier has no credentials.
/// - The adapter's last error once retries are exhausted.
/// - [`AdapterError::Db`] if a successful placement cannot be recorded.
pub async fn place_order(
    registry: &AdapterRegistry,
    supplier: Option<SupplierTag>,
    order: &DropshipOrder,
    policy: RetryPolicy,
    log: &dyn OrderLog,
) -> Result<PlacedOrder, AdapterError> {
    let adapter = registry.get_supplier_adapter(supplier)?;
    let supplier = adapter.supplier();
    if !adapter.is_configured() {
        return Err(AdapterError::NotConfigured(supplier));
    }

    let adapter_ref: &dyn SupplierAdapter = adapter.as_ref();
    let counter = AtomicU32::new(0);
    let attempts = &counter;
    let result = retry_with_backoff(
        "create_order",
        policy.max_retries,
        policy.backoff_base_secs,
        move || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!(
                supplier = %supplier,
                order_ref = %order.order_ref,
                attempt,
                "placing supplier order"
            );
            adapter_ref.create_order(order)
        },
    )
    .await;
    let attempts = counter.load(Ordering::Relaxed);

    match result {
        Ok(reference) => {
            log.order_placed(&order.order_ref, supplier, &reference, attempts)
                .await?;
            tracing::info!(
                supplier = %supplier,
                order_ref = %order.order_ref,
                supplier_order_id = %reference.supplier_order_id,
                attempts,
                "supplier order placed"
            );
            Ok(PlacedOrder {
                supplier,
                reference,
                attempts,
            })
        }
        Err(err) => {
            tracing::error!(
                supplier = %supplier,
                order_ref = %order.order_ref,
                attempts,
                error = %err,
                "supplier order failed"
            );
            if let Err(log_err) = log
                .order_failed(&order.order_ref, supplier, attempts, &err.to_string())
                .await
            {
                tracing::warn!(error = %log_err, "could not record failed supplier order");
            }
            Err(err)
        }
    }
}

/// Reads the current status of every open order and stores changes.
///
/// Status reads run concurrently, at most `concurrency` at a time. An order
/// whose status cannot be read is counted as failed and left as it was.
///
/// # Errors
///
/// Returns [`AdapterError::Db`] if open orders cannot be listed or a status
/// change cannot be written.
pub async fn poll_order_statuses(
    registry: &AdapterRegistry,
    log: &dyn OrderLog,
    concurrency: Option<usize>,
) -> Result<PollSummary, AdapterError> {
    let open = log.open_orders().await?;
    let concurrency = concurrency.unwrap_or(DEFAULT_POLL_CONCURRENCY).max(1);

    let results: Vec<(SupplierOrderRow, Result<SupplierOrderStatus, AdapterError>)> =
        stream::iter(open.into_iter().map(|row| async move {
            let status = read_status(registry, &row).await;
            (row, status)
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut summary = PollSummary {
        checked: results.len(),
        ..PollSummary::default()
    };
    for (row, status) in results {
        match status {
            Ok(status) if is_change(&row, &status) => {
                log.status_changed(row.id, &status).await?;
                tracing::info!(
                    order_ref = %row.order_ref,
                    supplier = %row.supplier_name,
                    from = %row.status,
                    to = %status.status,
                    "supplier order status changed"
                );
                summary.updated += 1;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    order_ref = %row.order_ref,
                    supplier = %row.supplier_name,
                    error = %err,
                    "could not read supplier order status"
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn read_status(
    registry: &AdapterRegistry,
    row: &SupplierOrderRow,
) -> Result<SupplierOrderStatus, AdapterError> {
    let Some(supplier_order_id) = row.supplier_order_id.as_deref() else {
        return Err(AdapterError::Rejected {
            supplier: registry.default_supplier(),
            message: format!("order {} was never accepted", row.order_ref),
        });
    };
    let supplier = row
        .supplier_name
        .parse::<SupplierTag>()
        .map_err(|message| AdapterError::Rejected {
            supplier: registry.default_supplier(),
            message,
        })?;
    registry
        .get_supplier_adapter(Some(supplier))?
        .get_order_status(supplier_order_id)
        .await
}

fn is_change(row: &SupplierOrderRow, status: &SupplierOrderStatus) -> bool {
    row.status != status.status
        || (status.tracking_number.is_some() && row.tracking_number != status.tracking_number)
}

#[async_trait]
impl OrderLog for PgCatalog {
    async fn order_placed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        reference: &SupplierOrderRef,
        attempts: u32,
    ) -> Result<(), DbError> {
        hypex_db::record_order_placed(
            self.pool(),
            order_ref,
            supplier.as_str(),
            &reference.supplier_order_id,
            &reference.status,
            i32::try_from(attempts).unwrap_or(i32::MAX),
        )
        .await?;
        Ok(())
    }

    async fn order_failed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        attempts: u32,
        error: &str,
    ) -> Result<(), DbError> {
        hypex_db::record_order_failed(
            self.pool(),
            order_ref,
            supplier.as_str(),
            i32::try_from(attempts).unwrap_or(i32::MAX),
            error,
        )
        .await
    }

    async fn open_orders(&self) -> Result<Vec<SupplierOrderRow>, DbError> {
        hypex_db::list_open_orders(self.pool()).await
    }

    async fn status_changed(&self, id: i64, status: &SupplierOrderStatus) -> Result<(), DbError> {
        hypex_db::update_order_status(
            self.pool(),
            id,
            &status.status,
            status.tracking_number.as_deref(),
            status.tracking_url.as_deref(),
        )
        .await
    }
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
