//! `sync` command handler.

use std::sync::Arc;

use hypex_core::AppConfig;
use hypex_dropship::{PgCatalog, SupplierSyncRunner};

/// Runs the supplier sync and prints the report as JSON.
///
/// Without `apply` the run is a dry run and nothing is written.
///
/// # Errors
///
/// Returns an error if the supplier is unknown, the supplier file cannot be
/// loaded, or the sync itself fails.
pub(crate) async fn run_sync(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    store_id: Option<i64>,
    supplier: Option<&str>,
    apply: bool,
) -> anyhow::Result<()> {
    let supplier = crate::parse_supplier(supplier)?;
    let (suppliers, registry) = crate::build_registry(config)?;
    let adapter = registry.get_supplier_adapter(supplier)?;
    let feed_currency = suppliers.get(adapter.supplier()).feed_currency;

    let runner = SupplierSyncRunner::new(
        adapter,
        Arc::new(PgCatalog::new(pool.clone())),
        config.pricing.clone(),
        config.sync_pricing,
        &feed_currency,
    );
    let report = runner
        .run(store_id.unwrap_or(config.store_id), !apply)
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.dry_run && report.matched > 0 {
        println!("dry run: re-run with --apply to write {} change(s)", report.matched);
    }
    Ok(())
}
