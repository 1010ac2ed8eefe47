//! eBay item pages (`/itm/{id}`) parsed with the `scraper` DOM.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use hypex_core::{Money, ScrapeOutcome, ScrapedProductData, ScrapedVariant, SupplierTag};
use regex::Regex;
use scraper::{Html, Selector};

use crate::dom::{attr_any, element_text, first_text, image_urls};
use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::html;
use crate::normalize::finalize_product;
use crate::registry::{into_outcome, ProductScraper};

mod selectors {
    use super::{LazyLock, Selector};

    fn sel(css: &str) -> Selector {
        Selector::parse(css).expect("valid eBay selector")
    }

    pub static TITLE: LazyLock<Selector> = LazyLock::new(|| sel("h1.x-item-title__mainTitle"));
    pub static TITLE_LEGACY: LazyLock<Selector> = LazyLock::new(|| sel("h1#itemTitle"));
    pub static PRICE: LazyLock<Selector> = LazyLock::new(|| sel(".x-price-primary"));
    pub static PRICE_LEGACY: LazyLock<Selector> = LazyLock::new(|| sel("#prcIsum"));
    pub static COMPARE_AT: LazyLock<Selector> =
        LazyLock::new(|| sel(".x-additional-info__textual-display .ux-textspans--STRIKETHROUGH"));
    pub static CAROUSEL_IMG: LazyLock<Selector> =
        LazyLock::new(|| sel(".ux-image-carousel-item img"));
    pub static SPEC_ROW: LazyLock<Selector> = LazyLock::new(|| sel(".ux-labels-values"));
    pub static SPEC_LABEL: LazyLock<Selector> =
        LazyLock::new(|| sel(".ux-labels-values__labels"));
    pub static SPEC_VALUE: LazyLock<Selector> =
        LazyLock::new(|| sel(".ux-labels-values__values"));
    pub static CONDITION: LazyLock<Selector> = LazyLock::new(|| sel(".x-item-condition-text"));
    pub static AVAILABILITY: LazyLock<Selector> =
        LazyLock::new(|| sel(".x-quantity__availability"));
    pub static MSKU_SELECT: LazyLock<Selector> = LazyLock::new(|| sel("select.x-msku__select-box"));
    pub static OPTION: LazyLock<Selector> = LazyLock::new(|| sel("option"));
}

static AVAILABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+available").expect("valid regex"));

pub struct EbayScraper {
    fetcher: PageFetcher,
}

impl EbayScraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ProductScraper for EbayScraper {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Ebay
    }

    async fn scrape_product(&self, url: &str) -> ScrapeOutcome {
        let result = match self.fetcher.fetch_html(url).await {
            Ok(page) => parse_ebay_page(&page, url),
            Err(e) => Err(e),
        };
        into_outcome(SupplierTag::Ebay, url, result)
    }
}

/// Extracts product data from an eBay item page.
///
/// Variants come from the first multi-SKU drop-down only; the placeholder
/// option (`value="-1"`) and out-of-stock options are skipped.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when the page has no title or no price.
pub fn parse_ebay_page(page: &str, url: &str) -> Result<ScrapedProductData, ScraperError> {
    let doc = Html::parse_document(page);

    let title = first_text(&doc, &[&selectors::TITLE, &selectors::TITLE_LEGACY])
        .or_else(|| html::meta_content(page, "og:title"))
        .ok_or_else(|| ScraperError::parse(SupplierTag::Ebay, url, "no item title found"))?;

    let price_text = first_text(&doc, &[&selectors::PRICE, &selectors::PRICE_LEGACY])
        .ok_or_else(|| ScraperError::parse(SupplierTag::Ebay, url, "no item price found"))?;
    let (amount, currency) = html::parse_price_text(&price_text).ok_or_else(|| {
        ScraperError::parse(
            SupplierTag::Ebay,
            url,
            format!("unreadable price \"{price_text}\""),
        )
    })?;
    let currency = currency.unwrap_or_else(|| "USD".to_owned());
    let compare_at = first_text(&doc, &[&selectors::COMPARE_AT])
        .and_then(|t| html::parse_price_text(&t))
        .map(|(p, _)| p);

    let mut images: Vec<String> = image_urls(
        &doc,
        &selectors::CAROUSEL_IMG,
        &["data-zoom-src", "data-src", "src"],
    )
    .iter()
    .filter_map(|u| html::absolutize(u, url))
    .collect();
    if images.is_empty() {
        images.extend(
            html::meta_content(page, "og:image").and_then(|u| html::absolutize(&u, url)),
        );
    }

    let mut specs = BTreeMap::new();
    for row in doc.select(&selectors::SPEC_ROW) {
        let label = row.select(&selectors::SPEC_LABEL).next().map(|e| element_text(&e));
        let value = row.select(&selectors::SPEC_VALUE).next().map(|e| element_text(&e));
        if let (Some(label), Some(value)) = (label, value) {
            specs.insert(label.trim_end_matches(':').trim().to_owned(), value);
        }
    }
    if let Some(condition) = first_text(&doc, &[&selectors::CONDITION]) {
        specs.entry("Condition".to_owned()).or_insert(condition);
    }

    let stock = first_text(&doc, &[&selectors::AVAILABILITY])
        .and_then(|t| AVAILABLE_RE.captures(&t)?.get(1)?.as_str().parse::<i32>().ok())
        .unwrap_or(0);

    let variants = doc
        .select(&selectors::MSKU_SELECT)
        .next()
        .map(|select| {
            let key = attr_any(&select, &["selectboxlabel", "aria-label", "name"])
                .unwrap_or_else(|| "option".to_owned())
                .to_lowercase();
            select
                .select(&selectors::OPTION)
                .filter(|opt| opt.value().attr("value").is_some_and(|v| v != "-1"))
                .filter(|opt| opt.value().attr("disabled").is_none())
                .map(|opt| {
                    let name = element_text(&opt);
                    ScrapedVariant {
                        attributes: BTreeMap::from([(key.clone(), name.clone())]),
                        name,
                        price: amount,
                        compare_at_price: compare_at,
                        image: None,
                        stock,
                    }
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let data = ScrapedProductData {
        title,
        description: html::meta_content(page, "og:description")
            .or_else(|| html::meta_content(page, "description"))
            .unwrap_or_default(),
        price: Money::new(amount, &currency),
        images,
        variants,
        specs,
    };
    finalize_product(SupplierTag::Ebay, url, data)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const URL: &str = "https://www.ebay.com/itm/256123456789";

    const ITEM_PAGE: &str = r#"<!DOCTYPE html><html><head>
<meta property="og:description" content="Fast shipping from US warehouse">
</head><body>
<h1 class="x-item-title__mainTitle"><span class="ux-textspans">USB C Cable 2m 100W Fast Charging Nylon</span></h1>
<div class="x-price-primary"><span class="ux-textspans">US $8.49</span></div>
<div class="x-additional-info__textual-display"><span class="ux-textspans ux-textspans--STRIKETHROUGH">US $12.99</span></div>
<div class="x-item-condition-text"><span>New</span></div>
<div class="ux-image-carousel-item"><img src="https://i.ebayimg.com/thumbs/1.jpg" data-zoom-src="https://i.ebayimg.com/images/1.jpg"></div>
<div class="ux-image-carousel-item"><img data-src="https://i.ebayimg.com/images/2.jpg"></div>
<select class="x-msku__select-box" selectboxlabel="Color">
  <option value="-1">- Select -</option>
  <option value="0">Black</option>
  <option value="1">White</option>
  <option value="2" disabled>Red [out of stock]</option>
</select>
<span class="x-quantity__availability">More than 10 available / 57 sold</span>
<span class="x-quantity__availability">25 available</span>
<div class="ux-labels-values"><div class="ux-labels-values__labels">Brand:</div><div class="ux-labels-values__values">Unbranded</div></div>
<div class="ux-labels-values"><div class="ux-labels-values__labels">Cable Length</div><div class="ux-labels-values__values">2 m</div></div>
</body></html>"#;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_item_page() {
        let data = parse_ebay_page(ITEM_PAGE, URL).unwrap();
        assert_eq!(data.title, "USB C Cable 2m 100W Fast Charging Nylon");
        assert_eq!(data.price, Money::new(dec("8.49"), "USD"));
        assert_eq!(data.description, "Fast shipping from US warehouse");
        assert_eq!(
            data.images,
            vec![
                "https://i.ebayimg.com/images/1.jpg".to_string(),
                "https://i.ebayimg.com/images/2.jpg".to_string(),
            ]
        );
        assert_eq!(data.specs["Brand"], "Unbranded");
        assert_eq!(data.specs["Cable Length"], "2 m");
        assert_eq!(data.specs["Condition"], "New");
    }

    #[test]
    fn variants_from_msku_select() {
        let data = parse_ebay_page(ITEM_PAGE, URL).unwrap();
        let names: Vec<&str> = data.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Black", "White"]);
        let black = &data.variants[0];
        assert_eq!(black.attributes["color"], "Black");
        assert_eq!(black.compare_at_price, Some(dec("12.99")));
        assert_eq!(
            black.image.as_deref(),
            Some("https://i.ebayimg.com/images/1.jpg")
        );
    }

    #[test]
    fn missing_price_is_a_parse_error() {
        let page = r#"<h1 class="x-item-title__mainTitle">Mus</h1>"#;
        let err = parse_ebay_page(page, URL).unwrap_err();
        assert!(err.to_string().contains("no item price"), "got: {err}");
    }

    #[test]
    fn legacy_layout_and_og_image() {
        let page = r#"<html><head><meta property="og:image" content="https://i.ebayimg.com/og.jpg"></head>
            <body><h1 id="itemTitle">Laptop stativ aluminium</h1><span id="prcIsum">EUR 19,90</span></body></html>"#;
        let data = parse_ebay_page(page, "https://www.ebay.de/itm/1").unwrap();
        assert_eq!(data.title, "Laptop stativ aluminium");
        assert_eq!(data.price, Money::new(dec("19.90"), "EUR"));
        assert_eq!(data.images, vec!["https://i.ebayimg.com/og.jpg".to_string()]);
        assert!(data.variants.is_empty());
    }
}
