use std::path::PathBuf;

use crate::pricing::{PricingConfig, SyncPricing};
use crate::supplier::SupplierTag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub store_id: i64,
    pub suppliers_path: PathBuf,
    pub default_supplier: SupplierTag,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub pricing: PricingConfig,
    pub sync_pricing: SyncPricing,
    pub bulk_delay_min_ms: u64,
    pub bulk_delay_max_ms: u64,
    pub order_max_retries: u32,
    pub order_retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("store_id", &self.store_id)
            .field("suppliers_path", &self.suppliers_path)
            .field("default_supplier", &self.default_supplier)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("pricing", &self.pricing)
            .field("sync_pricing", &self.sync_pricing)
            .field("bulk_delay_min_ms", &self.bulk_delay_min_ms)
            .field("bulk_delay_max_ms", &self.bulk_delay_max_ms)
            .field("order_max_retries", &self.order_max_retries)
            .field(
                "order_retry_backoff_base_secs",
                &self.order_retry_backoff_base_secs,
            )
            .finish()
    }
}
