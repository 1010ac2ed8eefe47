//! Catalog-side shapes produced by the importer and consumed by persistence.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::supplier::SupplierTag;

/// Coarse product type, sniffed from title keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Keyboard,
    Mouse,
    Cable,
    Charger,
    Bag,
    Bracket,
    Earbuds,
    Lamp,
    Watch,
    Headset,
    Other,
}

/// Storefront category for a product kind.
#[must_use]
pub fn category_for(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::Keyboard => "Tastaturer",
        ProductKind::Mouse => "Mus",
        ProductKind::Cable => "Kabler",
        ProductKind::Charger => "Ladere",
        ProductKind::Bag => "Vesker",
        ProductKind::Bracket => "Holdere og stativer",
        ProductKind::Earbuds => "Ørepropper",
        ProductKind::Lamp => "Belysning",
        ProductKind::Watch => "Smartklokker",
        ProductKind::Headset => "Headset",
        ProductKind::Other => "Elektronikk",
    }
}

/// Generates a URL-safe slug. Norwegian letters are transliterated
/// (`æ` → `ae`, `ø` → `o`, `å` → `a`); other non-ASCII characters are dropped.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match c {
            'æ' => out.push_str("ae"),
            'ø' | 'ö' => out.push('o'),
            'å' | 'ä' => out.push('a'),
            'ü' => out.push('u'),
            c if c.is_ascii_alphanumeric() => out.push(c),
            c if c.is_whitespace() || c == '-' || c == '_' || c == '/' => out.push('-'),
            _ => {}
        }
    }
    out.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A product ready to be written to the catalog. Prices are NOK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub store_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Decimal,
    pub supplier_price: Decimal,
    /// Deduplicated, variant images first.
    pub images: Vec<String>,
    pub category: String,
    pub supplier: SupplierTag,
    pub supplier_url: String,
    pub supplier_product_id: Option<String>,
    pub sku: String,
    pub stock: i32,
    pub is_active: bool,
    pub variants: Vec<VariantDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDraft {
    pub name: String,
    /// `{parent_sku}-V{index}`.
    pub sku: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub supplier_price: Decimal,
    pub image: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub stock: i32,
}
