use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use hypex_core::SupplierTag;
use hypex_db::{DbError, SupplierOrderRow};

use super::*;
use crate::adapters::{OrderLine, ShippingAddress};

const NO_WAIT: RetryPolicy = RetryPolicy {
    max_retries: 3,
    backoff_base_secs: 0,
};

/// Fails with an outage for the first `outages` calls, then accepts.
struct FlakyAdapter {
    supplier: SupplierTag,
    configured: bool,
    outages: u32,
    calls: AtomicU32,
    rejects: bool,
}

impl FlakyAdapter {
    fn new(supplier: SupplierTag, outages: u32) -> Self {
        Self {
            supplier,
            configured: true,
            outages,
            calls: AtomicU32::new(0),
            rejects: false,
        }
    }
}

#[async_trait]
impl SupplierAdapter for FlakyAdapter {
    fn supplier(&self) -> SupplierTag {
        self.supplier
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_order(&self, order: &DropshipOrder) -> Result<SupplierOrderRef, AdapterError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rejects {
            return Err(AdapterError::Rejected {
                supplier: self.supplier,
                message: "sku discontinued".to_string(),
            });
        }
        if call < self.outages {
            return Err(AdapterError::Unavailable {
                supplier: self.supplier,
                message: "503".to_string(),
            });
        }
        Ok(SupplierOrderRef {
            supplier_order_id: format!("X-{}", order.order_ref),
            status: "pending".to_string(),
        })
    }

    async fn get_order_status(
        &self,
        supplier_order_id: &str,
    ) -> Result<SupplierOrderStatus, AdapterError> {
        if supplier_order_id == "X-broken" {
            return Err(AdapterError::Unavailable {
                supplier: self.supplier,
                message: "timeout".to_string(),
            });
        }
        Ok(SupplierOrderStatus {
            status: "shipped".to_string(),
            tracking_number: Some(format!("T{supplier_order_id}")),
            tracking_url: None,
        })
    }
}

#[derive(Default)]
struct MemoryOrderLog {
    rows: Mutex<Vec<SupplierOrderRow>>,
}

impl MemoryOrderLog {
    fn seed(&self, order_ref: &str, supplier: &str, supplier_order_id: Option<&str>, status: &str) {
        let mut rows = self.rows.lock().unwrap();
        let id = i64::try_from(rows.len()).unwrap() + 1;
        rows.push(SupplierOrderRow {
            id,
            order_ref: order_ref.to_string(),
            supplier_name: supplier.to_string(),
            supplier_order_id: supplier_order_id.map(str::to_owned),
            status: status.to_string(),
            tracking_number: None,
            tracking_url: None,
            attempts: 1,
            last_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    fn row(&self, order_ref: &str) -> SupplierOrderRow {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.order_ref == order_ref)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl OrderLog for MemoryOrderLog {
    async fn order_placed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        reference: &SupplierOrderRef,
        attempts: u32,
    ) -> Result<(), DbError> {
        self.seed(
            order_ref,
            supplier.as_str(),
            Some(&reference.supplier_order_id),
            &reference.status,
        );
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.last_mut() {
            row.attempts = i32::try_from(attempts).unwrap();
        }
        Ok(())
    }

    async fn order_failed(
        &self,
        order_ref: &str,
        supplier: SupplierTag,
        attempts: u32,
        error: &str,
    ) -> Result<(), DbError> {
        self.seed(order_ref, supplier.as_str(), None, "failed");
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.last_mut() {
            row.attempts = i32::try_from(attempts).unwrap();
            row.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn open_orders(&self) -> Result<Vec<SupplierOrderRow>, DbError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.supplier_order_id.is_some() && r.status != "delivered")
            .cloned()
            .collect())
    }

    async fn status_changed(&self, id: i64, status: &SupplierOrderStatus) -> Result<(), DbError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|r| r.id == id).ok_or(DbError::NotFound)?;
        row.status.clone_from(&status.status);
        row.tracking_number.clone_from(&status.tracking_number);
        Ok(())
    }
}

fn order(order_ref: &str) -> DropshipOrder {
    DropshipOrder {
        order_ref: order_ref.to_string(),
        lines: vec![OrderLine {
            supplier_sku: "601099512345678".to_string(),
            quantity: 1,
        }],
        shipping: ShippingAddress {
            name: "Ola Nordmann".to_string(),
            address_line: "Kongens gate 2".to_string(),
            postal_code: "7011".to_string(),
            city: "Trondheim".to_string(),
            country: "NO".to_string(),
        },
    }
}

fn registry(adapter: FlakyAdapter) -> AdapterRegistry {
    AdapterRegistry::new(adapter.supplier).with_adapter(Arc::new(adapter))
}

#[tokio::test]
async fn outages_are_retried_until_accepted() {
    let registry = registry(FlakyAdapter::new(SupplierTag::Temu, 2));
    let log = MemoryOrderLog::default();

    let placed = place_order(&registry, None, &order("HX-1"), NO_WAIT, &log)
        .await
        .unwrap();

    assert_eq!(placed.attempts, 3);
    assert_eq!(placed.reference.supplier_order_id, "X-HX-1");
    let row = log.row("HX-1");
    assert_eq!(row.status, "pending");
    assert_eq!(row.attempts, 3);
}

#[tokio::test]
async fn exhausted_retries_are_recorded_as_failed() {
    let registry = registry(FlakyAdapter::new(SupplierTag::Ebay, 10));
    let log = MemoryOrderLog::default();

    let err = place_order(&registry, None, &order("HX-2"), NO_WAIT, &log)
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::Unavailable { .. }));
    let row = log.row("HX-2");
    assert_eq!(row.status, "failed");
    assert_eq!(row.attempts, 4);
    assert!(row.last_error.unwrap().contains("503"));
}

#[tokio::test]
async fn rejection_is_not_retried() {
    let mut adapter = FlakyAdapter::new(SupplierTag::Alibaba, 0);
    adapter.rejects = true;
    let registry = registry(adapter);
    let log = MemoryOrderLog::default();

    place_order(&registry, None, &order("HX-3"), NO_WAIT, &log)
        .await
        .unwrap_err();

    assert_eq!(log.row("HX-3").attempts, 1);
}

#[tokio::test]
async fn unconfigured_adapter_is_refused_without_calling_it() {
    let mut adapter = FlakyAdapter::new(SupplierTag::Temu, 0);
    adapter.configured = false;
    let registry = registry(adapter);
    let log = MemoryOrderLog::default();

    let err = place_order(&registry, Some(SupplierTag::Temu), &order("HX-4"), NO_WAIT, &log)
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::NotConfigured(SupplierTag::Temu)));
    assert!(log.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn polling_updates_changed_orders_and_counts_failures() {
    let registry = registry(FlakyAdapter::new(SupplierTag::Temu, 0));
    let log = MemoryOrderLog::default();
    log.seed("HX-10", "temu", Some("X-HX-10"), "pending");
    log.seed("HX-11", "temu", Some("X-broken"), "pending");
    log.seed("HX-12", "temu", None, "failed");
    log.seed("HX-13", "temu", Some("X-HX-13"), "delivered");

    let summary = poll_order_statuses(&registry, &log, Some(2)).await.unwrap();

    assert_eq!(
        summary,
        PollSummary {
            checked: 2,
            updated: 1,
            failed: 1,
        }
    );
    let row = log.row("HX-10");
    assert_eq!(row.status, "shipped");
    assert_eq!(row.tracking_number.as_deref(), Some("TX-HX-10"));
    assert_eq!(log.row("HX-11").status, "pending");
}

#[tokio::test]
async fn polling_twice_writes_nothing_new() {
    let registry = registry(FlakyAdapter::new(SupplierTag::Temu, 0));
    let log = MemoryOrderLog::default();
    log.seed("HX-20", "temu", Some("X-HX-20"), "pending");

    poll_order_statuses(&registry, &log, None).await.unwrap();
    let second = poll_order_statuses(&registry, &log, None).await.unwrap();

    assert_eq!(second.updated, 0);
    assert_eq!(second.checked, 1);
}
