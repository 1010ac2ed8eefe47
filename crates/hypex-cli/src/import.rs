//! `import` and `bulk-import` command handlers.

use std::path::Path;
use std::sync::Arc;

use hypex_core::{AppConfig, ProfitMargin};
use hypex_dropship::{DuplicatePolicy, ImportSettings, PgCatalog, ProductImporter};
use hypex_scraper::ScraperRegistry;

fn build_importer(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<ProductImporter> {
    let scrapers = ScraperRegistry::new(crate::build_fetcher(config)?);
    Ok(ProductImporter::new(
        Arc::new(scrapers),
        Arc::new(PgCatalog::new(pool.clone())),
        ImportSettings::from_app_config(config),
    ))
}

fn resolve_margin(config: &AppConfig, raw: Option<&str>) -> ProfitMargin {
    raw.map_or(config.pricing.default_margin, ProfitMargin::parse)
}

/// Imports a single product and prints where it landed.
///
/// # Errors
///
/// Returns an error if the import fails; the message is the importer's,
/// including the scraper's text for scrape failures.
pub(crate) async fn run_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    url: &str,
    margin: Option<&str>,
    reject_duplicates: bool,
) -> anyhow::Result<()> {
    let importer = build_importer(pool, config)?;
    let margin = resolve_margin(config, margin);

    let stored = if reject_duplicates {
        importer.import_new_product(url, &margin).await?
    } else {
        importer.import_product_from_url(url, &margin).await?
    };

    let product = &stored.product;
    println!(
        "#{} {} ({}) {} NOK, cost {} NOK, {} variant(s)",
        product.id,
        product.name,
        product.slug,
        product.price,
        product.supplier_price,
        stored.variants.len()
    );
    Ok(())
}

/// Collects URLs from arguments and an optional file, in that order.
pub(crate) fn collect_urls(args: Vec<String>, file_contents: Option<&str>) -> Vec<String> {
    let from_file = file_contents
        .into_iter()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned);
    args.into_iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .chain(from_file)
        .collect()
}

/// Imports every URL sequentially and prints a per-URL summary. The batch is
/// recorded as an import run.
///
/// # Errors
///
/// Returns an error if the URL file cannot be read, no URLs were given, or
/// the importer cannot be built. Per-URL failures are reported, not
/// propagated.
pub(crate) async fn run_bulk_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    urls: Vec<String>,
    file: Option<&Path>,
    margin: Option<&str>,
    update_existing: bool,
) -> anyhow::Result<()> {
    let contents = match file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read URL file {}: {e}", path.display())
        })?),
        None => None,
    };
    let urls = collect_urls(urls, contents.as_deref());
    if urls.is_empty() {
        anyhow::bail!("no URLs given; pass them as arguments or with --file");
    }

    let importer = build_importer(pool, config)?;
    let margin = resolve_margin(config, margin);
    let policy = if update_existing {
        DuplicatePolicy::UpdateExisting
    } else {
        DuplicatePolicy::Reject
    };
    let run_log = PgCatalog::new(pool.clone());

    tracing::info!(urls = urls.len(), ?policy, "starting bulk import");
    let results = importer
        .bulk_import_products(&urls, &margin, policy, Some(&run_log))
        .await;

    let succeeded = results.iter().filter(|r| r.success).count();
    for result in &results {
        match (&result.product_id, &result.error) {
            (Some(id), _) => println!("ok    #{id} {}", result.url),
            (None, Some(error)) => println!("fail  {} {error}", result.url),
            (None, None) => println!("fail  {}", result.url),
        }
    }
    println!("{succeeded}/{} imported", results.len());
    Ok(())
}
