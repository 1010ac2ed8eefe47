mod import;
mod orders;
mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::orders::OrdersCommands;

#[derive(Debug, Parser)]
#[command(name = "hypex")]
#[command(about = "ElectroHypeX dropshipping command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Import one supplier product page, updating it if already imported
    Import {
        /// Temu, Alibaba or eBay product URL
        url: String,
        /// Margin: "50%", "+100" (NOK) or a fraction such as 0.5
        #[arg(long)]
        margin: Option<String>,
        /// Fail instead of updating when the URL is already in the catalog
        #[arg(long)]
        reject_duplicates: bool,
    },
    /// Import many product pages one after another
    BulkImport {
        /// Product URLs
        urls: Vec<String>,
        /// File with one URL per line; blank lines and `#` comments are skipped
        #[arg(long)]
        file: Option<PathBuf>,
        /// Margin: "50%", "+100" (NOK) or a fraction such as 0.5
        #[arg(long)]
        margin: Option<String>,
        /// Update products that are already imported instead of rejecting them
        #[arg(long)]
        update_existing: bool,
    },
    /// Print the catalog title produced for a raw supplier title
    Title {
        /// Raw supplier title
        title: String,
    },
    /// Reconcile supplier price and stock from the supplier feed
    Sync {
        /// Store to sync (defaults to HYPEX_STORE_ID)
        #[arg(long)]
        store_id: Option<i64>,
        /// Supplier feed to use (defaults to HYPEX_DEFAULT_SUPPLIER)
        #[arg(long)]
        supplier: Option<String>,
        /// Write changes; without this flag the run is a dry run
        #[arg(long)]
        apply: bool,
    },
    /// Place and track supplier orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Pure text transform; runs without a config or database.
    if let Some(Commands::Title { title }) = &cli.command {
        println!("{}", hypex_scraper::improve_title(title));
        return Ok(());
    }

    let config = Arc::new(hypex_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("hypex: run with --help to list commands");
        return Ok(());
    };

    let pool_config = hypex_db::PoolConfig::from_app_config(&config);
    let pool = hypex_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                hypex_db::ping(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = hypex_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Import {
            url,
            margin,
            reject_duplicates,
        } => {
            import::run_import(&pool, &config, &url, margin.as_deref(), reject_duplicates).await?;
        }
        Commands::BulkImport {
            urls,
            file,
            margin,
            update_existing,
        } => {
            import::run_bulk_import(
                &pool,
                &config,
                urls,
                file.as_deref(),
                margin.as_deref(),
                update_existing,
            )
            .await?;
        }
        Commands::Sync {
            store_id,
            supplier,
            apply,
        } => {
            sync::run_sync(&pool, &config, store_id, supplier.as_deref(), apply).await?;
        }
        Commands::Orders { command } => orders::run_orders(&pool, &config, command).await?,
        // Printed before the config was loaded.
        Commands::Title { .. } => {}
    }

    Ok(())
}

/// Builds the page fetcher shared by scrapers and supplier feeds.
pub(crate) fn build_fetcher(
    config: &hypex_core::AppConfig,
) -> anyhow::Result<hypex_scraper::PageFetcher> {
    hypex_scraper::PageFetcher::new(&hypex_scraper::FetchConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build page fetcher: {e}"))
}

/// Parses `--supplier`, falling back to `None` so the registry default applies.
pub(crate) fn parse_supplier(raw: Option<&str>) -> anyhow::Result<Option<hypex_core::SupplierTag>> {
    raw.map(str::parse::<hypex_core::SupplierTag>)
        .transpose()
        .map_err(anyhow::Error::msg)
}

/// Loads supplier adapter settings and builds the adapter registry.
pub(crate) fn build_registry(
    config: &hypex_core::AppConfig,
) -> anyhow::Result<(hypex_core::SuppliersFile, hypex_dropship::AdapterRegistry)> {
    let suppliers = hypex_core::load_suppliers(&config.suppliers_path)?;
    let fetcher = build_fetcher(config)?;
    let registry = hypex_dropship::AdapterRegistry::from_config(
        &suppliers,
        &fetcher,
        config.default_supplier,
    );
    Ok((suppliers, registry))
}
