//! Final cleanup applied to every scraper's output before it leaves the crate.
//!
//! Page parsers are lenient and fill what they can; this module decides
//! whether the result is a usable product.

use std::collections::HashSet;

use hypex_core::{ScrapedProductData, SupplierTag};
use rust_decimal::Decimal;

use crate::error::ScraperError;
use crate::html::clean_text;

/// Upper bound on gallery size; supplier pages often repeat thumbnails and
/// zoom variants of the same picture.
pub const MAX_IMAGES: usize = 12;

/// Validates and tidies a parsed product.
///
/// Trims text, drops empty and duplicate image URLs (keeping first-seen
/// order), clamps negative variant stock to zero, and gives image-less
/// variants the hero image.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the title is empty or the price is not
/// positive.
pub fn finalize_product(
    supplier: SupplierTag,
    url: &str,
    mut data: ScrapedProductData,
) -> Result<ScrapedProductData, ScraperError> {
    data.title = clean_text(&data.title);
    if data.title.is_empty() {
        return Err(ScraperError::parse(supplier, url, "no product title found"));
    }
    if data.price.amount <= Decimal::ZERO {
        return Err(ScraperError::parse(supplier, url, "no product price found"));
    }
    data.description = clean_text(&data.description);

    let mut seen = HashSet::new();
    data.images = std::mem::take(&mut data.images)
        .into_iter()
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        .take(MAX_IMAGES)
        .collect();

    data.variants.retain(|v| !v.name.trim().is_empty());
    for variant in &mut data.variants {
        variant.name = clean_text(&variant.name);
        variant.stock = variant.stock.max(0);
        if variant.price <= Decimal::ZERO {
            variant.price = data.price.amount;
        }
    }

    data.specs = std::mem::take(&mut data.specs)
        .into_iter()
        .map(|(k, v)| (clean_text(&k), clean_text(&v)))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect();

    data.inherit_variant_images();
    Ok(data)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
