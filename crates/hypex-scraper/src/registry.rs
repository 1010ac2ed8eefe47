//! Scraper trait and the lazy per-supplier registry.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use hypex_core::{ScrapeOutcome, ScrapedProductData, SupplierTag};

use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::temu::TemuScraper;

/// Fetches one supplier product page and extracts canonical product data.
///
/// Implementations never return an error or panic across this boundary;
/// every failure is reported through [`ScrapeOutcome::failed`].
#[async_trait]
pub trait ProductScraper: Send + Sync {
    fn supplier(&self) -> SupplierTag;

    async fn scrape_product(&self, url: &str) -> ScrapeOutcome;
}

/// Looks up the scraper for a supplier.
///
/// Implemented by [`ScraperRegistry`]; importer tests substitute canned
/// scrapers through it.
pub trait ResolveScraper: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ScraperError::SupplierUnavailable`] when this build cannot
    /// scrape `supplier`.
    fn resolve(&self, supplier: SupplierTag) -> Result<Arc<dyn ProductScraper>, ScraperError>;
}

/// Folds a scrape result into an outcome and logs it.
pub(crate) fn into_outcome(
    supplier: SupplierTag,
    url: &str,
    result: Result<ScrapedProductData, ScraperError>,
) -> ScrapeOutcome {
    match result {
        Ok(data) => {
            tracing::info!(
                supplier = %supplier,
                url,
                images = data.images.len(),
                variants = data.variants.len(),
                "scraped product page"
            );
            ScrapeOutcome::ok(data)
        }
        Err(e) => {
            tracing::warn!(supplier = %supplier, url, error = %e, "scrape failed");
            ScrapeOutcome::failed(e.to_string())
        }
    }
}

/// Builds each supplier's scraper the first time it is asked for.
///
/// The DOM-based scrapers (Alibaba, eBay) only exist when the `dom` feature
/// is enabled; Temu never needs them.
pub struct ScraperRegistry {
    fetcher: PageFetcher,
    temu: OnceLock<Arc<dyn ProductScraper>>,
    alibaba: OnceLock<Arc<dyn ProductScraper>>,
    ebay: OnceLock<Arc<dyn ProductScraper>>,
}

impl ScraperRegistry {
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            temu: OnceLock::new(),
            alibaba: OnceLock::new(),
            ebay: OnceLock::new(),
        }
    }

    /// Whether `supplier` has already been built. Mainly for diagnostics.
    #[must_use]
    pub fn is_loaded(&self, supplier: SupplierTag) -> bool {
        self.slot(supplier).get().is_some()
    }

    fn slot(&self, supplier: SupplierTag) -> &OnceLock<Arc<dyn ProductScraper>> {
        match supplier {
            SupplierTag::Temu => &self.temu,
            SupplierTag::Alibaba => &self.alibaba,
            SupplierTag::Ebay => &self.ebay,
        }
    }

    fn build(&self, supplier: SupplierTag) -> Result<Arc<dyn ProductScraper>, ScraperError> {
        tracing::debug!(supplier = %supplier, "loading scraper");
        match supplier {
            SupplierTag::Temu => Ok(Arc::new(TemuScraper::new(self.fetcher.clone()))),
            #[cfg(feature = "dom")]
            SupplierTag::Alibaba => Ok(Arc::new(crate::alibaba::AlibabaScraper::new(
                self.fetcher.clone(),
            ))),
            #[cfg(feature = "dom")]
            SupplierTag::Ebay => Ok(Arc::new(crate::ebay::EbayScraper::new(
                self.fetcher.clone(),
            ))),
            #[cfg(not(feature = "dom"))]
            SupplierTag::Alibaba | SupplierTag::Ebay => {
                Err(ScraperError::SupplierUnavailable { supplier })
            }
        }
    }
}

impl ResolveScraper for ScraperRegistry {
    fn resolve(&self, supplier: SupplierTag) -> Result<Arc<dyn ProductScraper>, ScraperError> {
        let slot = self.slot(supplier);
        if let Some(scraper) = slot.get() {
            return Ok(Arc::clone(scraper));
        }
        let built = self.build(supplier)?;
        // A concurrent caller may have won the race; either instance is fine.
        Ok(Arc::clone(slot.get_or_init(|| built)))
    }
}
