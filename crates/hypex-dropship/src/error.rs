use hypex_core::{PricingError, SupplierTag};
use hypex_db::DbError;
use hypex_scraper::{ScraperError, Transient};
use thiserror::Error;

/// Message returned when the bulk route meets a URL that is already in the
/// catalog. Shown to shop admins as-is.
pub const ALREADY_EXISTS_MESSAGE: &str = "Produktet eksisterer allerede";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported supplier for {url}; supported suppliers: {supported}")]
    UnsupportedSupplier { url: String, supported: String },

    /// Carries the scraper's message unchanged.
    #[error("{0}")]
    ScrapeFailed(String),

    #[error("{ALREADY_EXISTS_MESSAGE}")]
    AlreadyExists { product_id: i64 },

    #[error("pricing failed: {0}")]
    Pricing(#[from] PricingError),

    #[error("catalog write failed: {0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no adapter registered for supplier {0}")]
    UnknownSupplier(SupplierTag),

    #[error("{0} adapter is not configured (missing API key)")]
    NotConfigured(SupplierTag),

    #[error("{0} does not provide a product feed")]
    FeedUnsupported(SupplierTag),

    #[error("{supplier} rejected the request: {message}")]
    Rejected {
        supplier: SupplierTag,
        message: String,
    },

    #[error("{supplier} is temporarily unavailable: {message}")]
    Unavailable {
        supplier: SupplierTag,
        message: String,
    },

    #[error(transparent)]
    Fetch(#[from] ScraperError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Only upstream outages are retried; a rejected order or missing
/// configuration fails the same way on every attempt.
impl Transient for AdapterError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Fetch(err) => err.is_transient(),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not fetch supplier feed: {0}")]
    Feed(#[from] AdapterError),

    #[error("could not convert feed price: {0}")]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Db(#[from] DbError),
}
