use thiserror::Error;

use hypex_core::SupplierTag;

use crate::retry::Transient;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("product page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("could not parse {supplier} page {url}: {reason}")]
    Parse {
        supplier: SupplierTag,
        url: String,
        reason: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{supplier} scraping is not available in this build")]
    SupplierUnavailable { supplier: SupplierTag },
}

impl ScraperError {
    pub(crate) fn parse(supplier: SupplierTag, url: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            supplier,
            url: url.to_owned(),
            reason: reason.into(),
        }
    }
}

/// 429 and network failures are worth another attempt. A 404, another
/// status, or a page we cannot parse will not change on retry.
impl Transient for ScraperError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            ScraperError::RateLimited { .. } | ScraperError::Http(_)
        )
    }
}
