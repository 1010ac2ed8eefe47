//! Temu product pages.
//!
//! Temu renders client-side but ships the full goods record in a
//! `window.rawData = {...};` script, so a plain GET plus regex is enough and
//! no DOM parser is pulled in. Fallbacks: JSON-LD `Product`, then `og:` tags.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use hypex_core::{Money, ScrapeOutcome, ScrapedProductData, ScrapedVariant, SupplierTag};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::html;
use crate::normalize::finalize_product;
use crate::registry::{into_outcome, ProductScraper};

const DEFAULT_CURRENCY: &str = "USD";

static RAW_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)window\.rawData\s*=\s*(\{.*?\})\s*;\s*(?:</script>|window\.)")
        .expect("valid rawData regex")
});

pub struct TemuScraper {
    fetcher: PageFetcher,
}

impl TemuScraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ProductScraper for TemuScraper {
    fn supplier(&self) -> SupplierTag {
        SupplierTag::Temu
    }

    async fn scrape_product(&self, url: &str) -> ScrapeOutcome {
        let result = match self.fetcher.fetch_html(url).await {
            Ok(page) => parse_temu_page(&page, url),
            Err(e) => Err(e),
        };
        into_outcome(SupplierTag::Temu, url, result)
    }
}

/// Extracts product data from a Temu page body.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] when none of the embedded sources yields a
/// title and a positive price.
pub fn parse_temu_page(page: &str, url: &str) -> Result<ScrapedProductData, ScraperError> {
    let data = from_raw_data(page, url)
        .or_else(|| from_json_ld(page, url))
        .or_else(|| from_meta_tags(page, url))
        .ok_or_else(|| {
            ScraperError::parse(
                SupplierTag::Temu,
                url,
                "no rawData, JSON-LD product, or og: tags on page",
            )
        })?;
    finalize_product(SupplierTag::Temu, url, data)
}

// ---------------------------------------------------------------------------
// window.rawData
// ---------------------------------------------------------------------------

fn from_raw_data(page: &str, url: &str) -> Option<ScrapedProductData> {
    let raw = RAW_DATA_RE.captures(page)?.get(1)?.as_str();
    let root: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(url, error = %e, "temu rawData is not valid JSON");
            return None;
        }
    };
    let goods = find_key(&root, "goods")?;

    let title = str_field(goods, &["goodsName", "title", "name"])?;
    let (price, price_currency) = price_field(goods)?;
    let currency = price_currency
        .or_else(|| {
            find_key(&root, "currency")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

    let mut images: Vec<String> = goods
        .get("gallery")
        .or_else(|| goods.get("images"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => str_field(other, &["url", "imgUrl"]),
                })
                .filter_map(|u| html::absolutize(&u, url))
                .collect()
        })
        .unwrap_or_default();
    if let Some(hero) = str_field(goods, &["hdThumbUrl", "thumbUrl"])
        .and_then(|u| html::absolutize(&u, url))
    {
        images.insert(0, hero);
    }

    let variants = find_key(&root, "skuList")
        .or_else(|| find_key(&root, "sku"))
        .and_then(Value::as_array)
        .map(|skus| skus.iter().filter_map(|s| variant(s, url)).collect())
        .unwrap_or_default();

    let specs = goods
        .get("goodsProperty")
        .and_then(Value::as_array)
        .map(|props| {
            props
                .iter()
                .filter_map(|p| {
                    let key = str_field(p, &["key"])?;
                    let values = p.get("values").and_then(Value::as_array)?;
                    let joined = values
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    Some((key, joined))
                })
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    Some(ScrapedProductData {
        title,
        description: str_field(goods, &["goodsDesc", "description"]).unwrap_or_default(),
        price: Money::new(price, &currency),
        images,
        variants,
        specs,
    })
}

fn variant(sku: &Value, page_url: &str) -> Option<ScrapedVariant> {
    let attributes: BTreeMap<String, String> = sku
        .get("specs")
        .and_then(Value::as_array)
        .map(|specs| {
            specs
                .iter()
                .filter_map(|s| {
                    let key = str_field(s, &["specKey", "key"])?.to_lowercase();
                    let value = str_field(s, &["specValue", "value"])?;
                    Some((key, value))
                })
                .collect()
        })
        .unwrap_or_default();

    let name = if attributes.is_empty() {
        str_field(sku, &["skuName", "name"])?
    } else {
        attributes.values().cloned().collect::<Vec<_>>().join(" / ")
    };

    Some(ScrapedVariant {
        name,
        price: price_field(sku).map_or(Decimal::ZERO, |(amount, _)| amount),
        compare_at_price: str_field(sku, &["normalPriceStr", "marketPriceStr"])
            .and_then(|s| html::parse_price_text(&s))
            .map(|(p, _)| p),
        image: str_field(sku, &["thumbUrl", "image"]).and_then(|u| html::absolutize(&u, page_url)),
        attributes,
        stock: sku
            .get("stockQuantity")
            .or_else(|| sku.get("stock"))
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
    })
}

/// Price strings (`"$7.49"`, `"79,00 kr"`) are preferred and carry their
/// currency when it is printed; the numeric `price` fields are in minor units.
fn price_field(node: &Value) -> Option<(Decimal, Option<String>)> {
    if let Some(text) = str_field(node, &["priceStr", "salePriceStr", "minPriceStr"]) {
        if let Some(parsed) = html::parse_price_text(&text) {
            return Some(parsed);
        }
    }
    node.get("price")
        .or_else(|| node.get("minPrice"))
        .and_then(Value::as_i64)
        .filter(|cents| *cents > 0)
        .map(|cents| (Decimal::new(cents, 2), None))
}

fn str_field(node: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| node.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Depth-first search for the first object member named `key`.
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

fn from_json_ld(page: &str, url: &str) -> Option<ScrapedProductData> {
    let product = html::json_ld_product(page)?;
    let title = product.get("name").and_then(Value::as_str)?.to_owned();
    let (price, currency) = html::json_ld_offer(&product)?;
    Some(ScrapedProductData {
        title,
        description: product
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        price: Money::new(price, currency.as_deref().unwrap_or(DEFAULT_CURRENCY)),
        images: html::json_ld_images(&product)
            .iter()
            .filter_map(|u| html::absolutize(u, url))
            .collect(),
        variants: Vec::new(),
        specs: BTreeMap::new(),
    })
}

fn from_meta_tags(page: &str, url: &str) -> Option<ScrapedProductData> {
    let title = html::meta_content(page, "og:title")?;
    let price = html::meta_content(page, "product:price:amount")
        .or_else(|| html::meta_content(page, "og:price:amount"))
        .and_then(|p| html::parse_price_text(&p))?
        .0;
    let currency = html::meta_content(page, "product:price:currency")
        .or_else(|| html::meta_content(page, "og:price:currency"))
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
    Some(ScrapedProductData {
        title,
        description: html::meta_content(page, "og:description").unwrap_or_default(),
        price: Money::new(price, &currency),
        images: html::meta_content(page, "og:image")
            .and_then(|u| html::absolutize(&u, url))
            .into_iter()
            .collect(),
        variants: Vec::new(),
        specs: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.temu.com/no/goods-601099512345678.html";

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    const RAW_DATA_PAGE: &str = r#"<html><head><title>Temu</title></head><body>
<script>window.rawData = {"store":{"currency":"USD","goods":{
  "goodsName":"108-key Mechanical Gaming Keyboard RGB",
  "priceStr":"$24.99",
  "hdThumbUrl":"//img.kwcdn.com/product/hero.jpg",
  "gallery":[{"url":"https://img.kwcdn.com/product/hero.jpg"},{"url":"https://img.kwcdn.com/product/side.jpg"}],
  "goodsProperty":[{"key":"Switch","values":["Red"]},{"key":"Layout","values":["Full","ANSI"]}]
},
"skuList":[
  {"skuId":1,"specs":[{"specKey":"Color","specValue":"Black"}],"priceStr":"$24.99","normalPriceStr":"$39.99","stockQuantity":120},
  {"skuId":2,"specs":[{"specKey":"Color","specValue":"White"}],"priceStr":"$26.49","thumbUrl":"https://img.kwcdn.com/product/white.jpg","stockQuantity":40}
]}};</script>
</body></html>"#;

    #[test]
    fn parses_embedded_raw_data() {
        let data = parse_temu_page(RAW_DATA_PAGE, URL).unwrap();
        assert_eq!(data.title, "108-key Mechanical Gaming Keyboard RGB");
        assert_eq!(data.price, Money::new(dec("24.99"), "USD"));
        assert_eq!(
            data.images,
            vec![
                "https://img.kwcdn.com/product/hero.jpg".to_string(),
                "https://img.kwcdn.com/product/side.jpg".to_string(),
            ]
        );
        assert_eq!(data.specs["Layout"], "Full, ANSI");
        assert!(data.has_variants());

        let black = &data.variants[0];
        assert_eq!(black.name, "Black");
        assert_eq!(black.attributes["color"], "Black");
        assert_eq!(black.compare_at_price, Some(dec("39.99")));
        assert_eq!(black.stock, 120);
        assert_eq!(
            black.image.as_deref(),
            Some("https://img.kwcdn.com/product/hero.jpg"),
            "inherits the hero image"
        );
        assert_eq!(data.variants[1].price, dec("26.49"));
    }

    #[test]
    fn numeric_price_is_minor_units() {
        let page = r#"<script>window.rawData = {"goods":{"goodsName":"USB-C kabel","price":499}};</script>"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.price.amount, dec("4.99"));
        assert_eq!(data.price.currency, "USD");
        assert!(!data.has_variants());
    }

    #[test]
    fn kroner_price_string_is_nok() {
        let page = r#"<script>window.rawData = {"goods":{"goodsName":"USB-C kabel 2m","priceStr":"79,00 kr"}};</script>"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.price, Money::new(dec("79.00"), "NOK"));
    }

    #[test]
    fn printed_currency_wins_over_raw_data_currency_key() {
        let page = r#"<script>window.rawData = {"currency":"USD","goods":{"goodsName":"USB-C lader 65W","priceStr":"kr 249,00"}};</script>"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.price.currency, "NOK");
        assert_eq!(data.price.amount, dec("249"));
    }

    #[test]
    fn falls_back_to_json_ld() {
        let page = r#"<script type="application/ld+json">
            {"@type":"Product","name":"LED skrivebordslampe","image":"https://img.kwcdn.com/lamp.jpg",
             "offers":{"@type":"Offer","price":"12.50","priceCurrency":"EUR"}}
        </script>"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.title, "LED skrivebordslampe");
        assert_eq!(data.price, Money::new(dec("12.50"), "EUR"));
        assert_eq!(data.images, vec!["https://img.kwcdn.com/lamp.jpg".to_string()]);
    }

    #[test]
    fn falls_back_to_meta_tags() {
        let page = r#"<head>
            <meta property="og:title" content="65W GaN lader">
            <meta property="og:image" content="//img.kwcdn.com/charger.jpg">
            <meta property="product:price:amount" content="9.99">
        </head>"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.title, "65W GaN lader");
        assert_eq!(data.price.amount, dec("9.99"));
        assert_eq!(data.images, vec!["https://img.kwcdn.com/charger.jpg".to_string()]);
    }

    #[test]
    fn page_without_product_data_is_a_parse_error() {
        let err = parse_temu_page("<html><body>Captcha</body></html>", URL).unwrap_err();
        assert!(matches!(
            err,
            ScraperError::Parse {
                supplier: SupplierTag::Temu,
                ..
            }
        ));
    }

    #[test]
    fn malformed_raw_data_uses_later_sources() {
        let page = r#"<script>window.rawData = {"goods": broken};</script>
            <meta property="og:title" content="Mus">
            <meta property="product:price:amount" content="3.10">"#;
        let data = parse_temu_page(page, URL).unwrap();
        assert_eq!(data.title, "Mus");
    }
}
