//! Small helpers over `scraper::Html` for the DOM-based scrapers.

use scraper::{ElementRef, Html, Selector};

use crate::html::clean_text;

/// Collapsed text of the first element matching any of `selectors`.
pub(crate) fn first_text(doc: &Html, selectors: &[&Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        doc.select(sel)
            .map(|el| element_text(&el))
            .find(|t| !t.is_empty())
    })
}

pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// First present, non-empty attribute out of `names`.
pub(crate) fn attr_any(el: &ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| el.value().attr(n))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Image URLs from every element matching `selector`, in document order.
pub(crate) fn image_urls(doc: &Html, selector: &Selector, attrs: &[&str]) -> Vec<String> {
    doc.select(selector)
        .filter_map(|el| attr_any(&el, attrs))
        .collect()
}
