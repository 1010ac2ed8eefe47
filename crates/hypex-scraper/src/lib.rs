//! Supplier product-page scraping for the ElectroHypeX dropship engine.
//!
//! Temu is parsed with regex over the raw page; Alibaba and eBay need a DOM
//! and live behind the default `dom` feature. [`ScraperRegistry`] builds a
//! scraper the first time its supplier is requested.

#[cfg(feature = "dom")]
pub mod alibaba;
#[cfg(feature = "dom")]
mod dom;
#[cfg(feature = "dom")]
pub mod ebay;
pub mod error;
pub mod fetch;
pub mod html;
pub mod normalize;
pub mod registry;
pub mod retry;
pub mod temu;
pub mod title;

pub use error::ScraperError;
pub use fetch::{FetchConfig, PageFetcher};
pub use normalize::finalize_product;
pub use registry::{ProductScraper, ResolveScraper, ScraperRegistry};
pub use retry::{retry_with_backoff, Transient};
pub use title::{classify_product, improve_title};
