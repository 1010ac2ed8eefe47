//! `orders` command handlers.

use std::path::PathBuf;

use clap::Subcommand;
use hypex_core::AppConfig;
use hypex_dropship::{place_order, poll_order_statuses, DropshipOrder, PgCatalog, RetryPolicy};

/// Sub-commands available under `orders`.
#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// Place an order with a supplier from a JSON order file
    Place {
        /// JSON file with `order_ref`, `lines` and `shipping`
        #[arg(long)]
        file: PathBuf,
        /// Supplier to order from (defaults to HYPEX_DEFAULT_SUPPLIER)
        #[arg(long)]
        supplier: Option<String>,
    },
    /// Refresh status and tracking of all open supplier orders
    Poll {
        /// Maximum number of status requests in flight
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
    /// Show what is recorded for one shop order
    Status {
        /// Shop order reference
        order_ref: String,
        #[arg(long)]
        supplier: Option<String>,
    },
}

/// # Errors
///
/// Returns an error if the order file is unreadable, the supplier is
/// unknown or unconfigured, or the supplier keeps failing after retries.
pub(crate) async fn run_orders(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: OrdersCommands,
) -> anyhow::Result<()> {
    let log = PgCatalog::new(pool.clone());

    match command {
        OrdersCommands::Place { file, supplier } => {
            let raw = std::fs::read_to_string(&file).map_err(|e| {
                anyhow::anyhow!("failed to read order file {}: {e}", file.display())
            })?;
            let order: DropshipOrder = serde_json::from_str(&raw)?;
            let supplier = crate::parse_supplier(supplier.as_deref())?;
            let (_, registry) = crate::build_registry(config)?;

            let placed = place_order(
                &registry,
                supplier,
                &order,
                RetryPolicy::from_app_config(config),
                &log,
            )
            .await?;
            println!(
                "{} accepted {} as {} ({}) after {} attempt(s)",
                placed.supplier.display_name(),
                order.order_ref,
                placed.reference.supplier_order_id,
                placed.reference.status,
                placed.attempts
            );
        }
        OrdersCommands::Poll { concurrency } => {
            let (_, registry) = crate::build_registry(config)?;
            let summary = poll_order_statuses(&registry, &log, Some(concurrency)).await?;
            println!(
                "checked {}, updated {}, failed {}",
                summary.checked, summary.updated, summary.failed
            );
        }
        OrdersCommands::Status {
            order_ref,
            supplier,
        } => {
            let supplier =
                crate::parse_supplier(supplier.as_deref())?.unwrap_or(config.default_supplier);
            let row = hypex_db::find_supplier_order(pool, &order_ref, supplier.as_str())
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!("no {supplier} order recorded for '{order_ref}'")
                })?;
            println!(
                "{} {}: {} (supplier id {}, tracking {}, attempts {})",
                row.supplier_name,
                row.order_ref,
                row.status,
                row.supplier_order_id.as_deref().unwrap_or("-"),
                row.tracking_url
                    .as_deref()
                    .or(row.tracking_number.as_deref())
                    .unwrap_or("-"),
                row.attempts
            );
            if let Some(error) = &row.last_error {
                println!("last error: {error}");
            }
        }
    }

    Ok(())
}
