//! Shared domain types, pricing math, and configuration for the ElectroHypeX
//! dropship engine.
//!
//! Nothing in this crate performs I/O beyond reading env vars and the
//! supplier config file.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod pricing;
pub mod products;
pub mod supplier;
pub mod suppliers;

pub use app_config::{AppConfig, Environment};
pub use catalog::{category_for, slugify, ProductDraft, ProductKind, VariantDraft};
pub use config::{load_app_config, load_app_config_from_env};
pub use pricing::{
    calculate_sale_price, round_nok, suggested_price, NokPrices, PricingConfig, PricingError,
    ProfitMargin, SyncPricing,
};
pub use products::{Money, ScrapeOutcome, ScrapedProductData, ScrapedVariant, SupplierProduct};
pub use supplier::{identify_supplier, supplier_product_id_from_url, SupplierTag};
pub use suppliers::{load_suppliers, SupplierConfig, SuppliersFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read suppliers file {path}: {source}")]
    SuppliersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse suppliers file: {0}")]
    SuppliersFileParse(#[from] serde_yaml::Error),

    #[error("supplier config validation failed: {0}")]
    Validation(String),
}
