use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment};
use crate::pricing::{PricingConfig, ProfitMargin, SyncPricing};
use crate::supplier::SupplierTag;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parses `raw` with `FromStr`, mapping failures to [`ConfigError::InvalidEnvVar`].
fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };
    let parse_decimal = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("HYPEX_ENV", "development"));
    let log_level = or_default("HYPEX_LOG_LEVEL", "info");
    let store_id: i64 = parse_value("HYPEX_STORE_ID", &or_default("HYPEX_STORE_ID", "1"))?;
    let suppliers_path = PathBuf::from(or_default(
        "HYPEX_SUPPLIERS_PATH",
        "./config/suppliers.yaml",
    ));
    let default_supplier: SupplierTag = parse_value(
        "HYPEX_DEFAULT_SUPPLIER",
        &or_default("HYPEX_DEFAULT_SUPPLIER", "temu"),
    )?;

    let db_max_connections = parse_u32("HYPEX_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HYPEX_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HYPEX_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("HYPEX_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "HYPEX_SCRAPER_USER_AGENT",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    );
    let scraper_max_retries = parse_u32("HYPEX_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs = parse_u64("HYPEX_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let pricing = PricingConfig {
        usd_to_nok_rate: parse_decimal("HYPEX_USD_TO_NOK_RATE", "10.5")?,
        eur_to_nok_rate: parse_decimal("HYPEX_EUR_TO_NOK_RATE", "11.5")?,
        default_margin: ProfitMargin::parse(&or_default("HYPEX_PROFIT_MARGIN", "50%")),
        compare_at_multiplier: parse_decimal("HYPEX_COMPARE_AT_MULTIPLIER", "1.3")?,
    };
    let sync_pricing = SyncPricing {
        min_markup: parse_decimal("HYPEX_SYNC_MIN_MARKUP", "1.5")?,
        target_margin_pct: parse_decimal("HYPEX_SYNC_TARGET_MARGIN_PCT", "55")?,
    };

    let bulk_delay_min_ms = parse_u64("HYPEX_BULK_DELAY_MIN_MS", "1000")?;
    let bulk_delay_max_ms = parse_u64("HYPEX_BULK_DELAY_MAX_MS", "2000")?;
    if bulk_delay_max_ms < bulk_delay_min_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "HYPEX_BULK_DELAY_MAX_MS".to_string(),
            reason: format!("must be >= HYPEX_BULK_DELAY_MIN_MS ({bulk_delay_min_ms})"),
        });
    }

    let order_max_retries = parse_u32("HYPEX_ORDER_MAX_RETRIES", "3")?;
    let order_retry_backoff_base_secs = parse_u64("HYPEX_ORDER_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        store_id,
        suppliers_path,
        default_supplier,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        pricing,
        sync_pricing,
        bulk_delay_min_ms,
        bulk_delay_max_ms,
        order_max_retries,
        order_retry_backoff_base_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
