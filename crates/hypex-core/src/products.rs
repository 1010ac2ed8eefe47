use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in a supplier's native currency, exactly as scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    /// ISO 4217 code, upper-case (e.g. `"USD"`).
    pub currency: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.trim().to_ascii_uppercase(),
        }
    }
}

/// A product page scraped from a supplier, normalized across marketplaces.
///
/// Transient: produced per scrape call and turned into a catalog draft by the
/// importer. Prices stay in the supplier's currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedProductData {
    pub title: String,
    pub description: String,
    pub price: Money,
    /// Ordered gallery URLs; the first entry is the hero image.
    pub images: Vec<String>,
    pub variants: Vec<ScrapedVariant>,
    pub specs: BTreeMap<String, String>,
}

impl ScrapedProductData {
    /// A product with zero or one variant has no meaningful variants.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        self.variants.len() > 1
    }

    /// Gives every variant without an image the first product image.
    pub fn inherit_variant_images(&mut self) {
        let Some(first) = self.images.first() else {
            return;
        };
        for variant in &mut self.variants {
            if variant.image.as_deref().is_none_or(str::is_empty) {
                variant.image = Some(first.clone());
            }
        }
    }
}

/// One purchasable option of a scraped product (colour, size, bundle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedVariant {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    /// `color` / `size` style keys as exposed by the marketplace.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub stock: i32,
}

/// Result of a scrape call. Scrapers never fail across their boundary; every
/// failure is folded into `success = false` with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub data: Option<ScrapedProductData>,
    pub error: Option<String>,
}

impl ScrapeOutcome {
    #[must_use]
    pub fn ok(data: ScrapedProductData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Collapses the outcome into a `Result`, keeping the error text verbatim.
    ///
    /// # Errors
    ///
    /// Returns the scraper's message when the scrape did not succeed.
    pub fn into_result(self) -> Result<ScrapedProductData, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .error
                .unwrap_or_else(|| "scraper returned no product data".to_string())),
        }
    }
}

/// A row from a supplier's product feed, used by the sync runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierProduct {
    pub supplier_sku: String,
    pub name: String,
    /// Price in the supplier's currency.
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    pub in_stock: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_variant(name: &str, image: Option<&str>) -> ScrapedVariant {
        ScrapedVariant {
            name: name.to_string(),
            price: Decimal::new(999, 2),
            compare_at_price: None,
            image: image.map(str::to_string),
            attributes: BTreeMap::new(),
            stock: 10,
        }
    }

    fn make_product(variants: Vec<ScrapedVariant>) -> ScrapedProductData {
        ScrapedProductData {
            title: "Trådløs mus".to_string(),
            description: String::new(),
            price: Money::new(Decimal::new(999, 2), "usd"),
            images: vec![
                "https://img.example/hero.jpg".to_string(),
                "https://img.example/side.jpg".to_string(),
            ],
            variants,
            specs: BTreeMap::new(),
        }
    }

    #[test]
    fn money_uppercases_currency() {
        assert_eq!(Money::new(Decimal::ONE, " usd ").currency, "USD");
    }

    #[test]
    fn single_variant_is_not_meaningful() {
        assert!(!make_product(vec![]).has_variants());
        assert!(!make_product(vec![make_variant("Svart", None)]).has_variants());
        assert!(make_product(vec![make_variant("Svart", None), make_variant("Hvit", None)])
            .has_variants());
    }

    #[test]
    fn variants_without_image_inherit_first_product_image() {
        let mut product = make_product(vec![
            make_variant("Svart", None),
            make_variant("Hvit", Some("https://img.example/white.jpg")),
            make_variant("Rosa", Some("")),
        ]);
        product.inherit_variant_images();
        assert_eq!(
            product.variants[0].image.as_deref(),
            Some("https://img.example/hero.jpg")
        );
        assert_eq!(
            product.variants[1].image.as_deref(),
            Some("https://img.example/white.jpg")
        );
        assert_eq!(
            product.variants[2].image.as_deref(),
            Some("https://img.example/hero.jpg")
        );
    }

    #[test]
    fn failed_outcome_keeps_message_verbatim() {
        let outcome = ScrapeOutcome::failed("HTTP 503 from temu.com");
        assert_eq!(outcome.into_result().unwrap_err(), "HTTP 503 from temu.com");
    }
}
