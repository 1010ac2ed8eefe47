//! Alibaba product-detail pages parsed with the `scraper` DOM.
//!
//! Alibaba quotes tiered wholesale prices (`$2.10 - $3.50`); the first
//! amount is used as the product price.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use hypex_core::{Money, ScrapeOutcome, ScrapedProductData, ScrapedVariant, SupplierTag};
use scraper::{Html, Selector};
use serde_json::Value;

use crate::dom::{attr_any, element_text, first_text, image_urls};
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::html;
use crate::normalize::finalize_product;
use crate::registry::{into_outcome, ProductScraper};

mod selectors {
    use super::{LazyLock, Selector};

    fn sel(css: &str) -> Selector {
        Selector::parse(css).expect("valid Alibaba selector")
    }

    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| sel(".product-title h1, .module-pdp-title h1"));
    pub static PRICE: LazyLock<Selector> =
        LazyLock::new(|| sel(".product-price .price, .price-list .price"));
    pub static GALLERY_IMG: LazyLock<Selector> =
        LazyLock::new(|| sel(".main-image img, .image-list img"));
    pub static ATTR_ROW: LazyLock<Selector> = LazyLock::new(|| sel(".attribute-item"));
    pub static ATTR_NAME: LazyLock<Selector> = LazyLock::new(|| sel(".left"));
    pub static ATTR_VALUE: LazyLock<Selector> = LazyLock::new(|| sel(".right"));
    pub static SKU_GROUP: LazyLock<Selector> = LazyLock::new(|| sel(".sku-attr"));
    pub static SKU_GROUP_NAME: LazyLock<Selector> = LazyLock::new(|| sel(".sku-attr-name"));
    pub static SKU_ITEM: LazyLock<Selector> = LazyLock::new(|| sel(".sku-attr-val-item"));
    pub static IMG: LazyLock<Selector> = LazyLock::new(|| sel("img"));
}

pub struct AlibabaScraper {
    fetcher: PageFetcher,
}

impl AlibabaScraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ProductScraper for AlibabaScraper {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Alibaba
    }

    async fn scrape_product(&self, url: &str) -> ScrapeOutcome {
        let result = match self.fetcher.fetch_html(url).await {
            Ok(page) => parse_alibaba_page(&page, url),
            Err(e) => Err(e),
        };
        into_outcome(SupplierTag::Alibaba, url, result)
    }
}

/// Extracts product data from an Alibaba product-detail page.
///
/// Each value of the first SKU attribute group (usually colour) becomes one
/// variant. JSON-LD is consulted when the DOM carries no price.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when no title or price can be found.
pub fn parse_alibaba_page(page: &str, url: &str) -> Result<ScrapedProductData, ScraperError> {
    let doc = Html::parse_document(page);
    let json_ld = html::json_ld_product(page);

    let title = first_text(&doc, &[&selectors::TITLE])
        .or_else(|| {
            json_ld
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .or_else(|| html::meta_content(page, "og:title"))
        .ok_or_else(|| ScraperError::parse(SupplierTag::Alibaba, url, "no product title found"))?;

    let (amount, currency) = first_text(&doc, &[&selectors::PRICE])
        .and_then(|t| html::parse_price_text(&t))
        .or_else(|| json_ld.as_ref().and_then(html::json_ld_offer))
        .ok_or_else(|| ScraperError::parse(SupplierTag::Alibaba, url, "no product price found"))?;
    let currency = currency.unwrap_or_else(|| "USD".to_owned());

    let mut images: Vec<String> = image_urls(
        &doc,
        &selectors::GALLERY_IMG,
        &["data-src", "src"],
    )
    .iter()
    .filter_map(|u| html::absolutize(u, url))
    .collect();
    if let Some(ld) = &json_ld {
        images.extend(
            html::json_ld_images(ld)
                .iter()
                .filter_map(|u| html::absolutize(u, url)),
        );
    }

    let specs: BTreeMap<String, String> = doc
        .select(&selectors::ATTR_ROW)
        .filter_map(|row| {
            let name = row.select(&selectors::ATTR_NAME).next().map(|e| element_text(&e))?;
            let value = row.select(&selectors::ATTR_VALUE).next().map(|e| element_text(&e))?;
            Some((name.trim_end_matches(':').trim().to_owned(), value))
        })
        .collect();

    let variants = doc
        .select(&selectors::SKU_GROUP)
        .next()
        .map(|group| {
            let key = group
                .select(&selectors::SKU_GROUP_NAME)
                .next()
                .map(|e| element_text(&e))
                .unwrap_or_else(|| "option".to_owned())
                .trim_end_matches(':')
                .trim()
                .to_lowercase();
            group
                .select(&selectors::SKU_ITEM)
                .filter_map(|item| {
                    let name = attr_any(&item, &["title", "data-value"])
                        .or_else(|| Some(element_text(&item)).filter(|t| !t.is_empty()))?;
                    let image = item
                        .select(&selectors::IMG)
                        .next()
                        .and_then(|img| attr_any(&img, &["data-src", "src"]))
                        .and_then(|u| html::absolutize(&u, url));
                    Some(ScrapedVariant {
                        attributes: BTreeMap::from([(key.clone(), name.clone())]),
                        name,
                        price: amount,
                        compare_at_price: None,
                        image,
                        stock: 0,
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let data = ScrapedProductData {
        title,
        description: html::meta_content(page, "description").unwrap_or_default(),
        price: Money::new(amount, &currency),
        images,
        variants,
        specs,
    };
    finalize_product(SupplierTag::Alibaba, url, data)
}
