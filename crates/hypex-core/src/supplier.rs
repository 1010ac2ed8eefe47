//! Supplier identification from product-page URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// A marketplace we can scrape products from and place dropship orders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierTag {
    Temu,
    Alibaba,
    Ebay,
}

/// eBay country storefronts accepted after the `ebay` host label.
const EBAY_SUFFIXES: &[&str] = &[
    "com", "co.uk", "de", "fr", "it", "es", "nl", "at", "ch", "ie", "pl", "be", "ca", "com.au",
];

impl SupplierTag {
    pub const ALL: [SupplierTag; 3] = [SupplierTag::Temu, SupplierTag::Alibaba, SupplierTag::Ebay];

    /// Lowercase tag used in config, logs, and the `supplier_name` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SupplierTag::Temu => "temu",
            SupplierTag::Alibaba => "alibaba",
            SupplierTag::Ebay => "ebay",
        }
    }

    /// Human-facing marketplace name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            SupplierTag::Temu => "Temu",
            SupplierTag::Alibaba => "Alibaba",
            SupplierTag::Ebay => "eBay",
        }
    }

    /// Prefix for generated catalog SKUs and mock supplier order IDs.
    #[must_use]
    pub fn sku_prefix(self) -> &'static str {
        match self {
            SupplierTag::Temu => "TEMU",
            SupplierTag::Alibaba => "ALI",
            SupplierTag::Ebay => "EBAY",
        }
    }

    /// Comma-separated list of supported marketplaces, for user-facing errors.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|tag| tag.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn matches_host(self, host: &str) -> bool {
        match self {
            SupplierTag::Temu => host == "temu.com" || host.ends_with(".temu.com"),
            SupplierTag::Alibaba => host == "alibaba.com" || host.ends_with(".alibaba.com"),
            SupplierTag::Ebay => {
                let bare = host.strip_prefix("www.").unwrap_or(host);
                let bare = bare.strip_prefix("m.").unwrap_or(bare);
                bare.strip_prefix("ebay.")
                    .is_some_and(|suffix| EBAY_SUFFIXES.contains(&suffix))
            }
        }
    }
}

impl fmt::Display for SupplierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temu" => Ok(SupplierTag::Temu),
            "alibaba" => Ok(SupplierTag::Alibaba),
            "ebay" => Ok(SupplierTag::Ebay),
            other => Err(format!(
                "unknown supplier '{other}'; supported: {}",
                SupplierTag::supported_list()
            )),
        }
    }
}

/// Maps a product-page URL to the supplier that hosts it.
///
/// Scheme-less input (`"temu.com/goods/123"`) is accepted. Returns `None`
/// for any host that is not a known marketplace.
#[must_use]
pub fn identify_supplier(url: &str) -> Option<SupplierTag> {
    let host = parse_lenient(url)?.host_str()?.to_ascii_lowercase();
    SupplierTag::ALL
        .into_iter()
        .find(|tag| tag.matches_host(&host))
}

/// Extracts the supplier's product identifier: the last non-empty path
/// segment of the URL.
#[must_use]
pub fn supplier_product_id_from_url(url: &str) -> Option<String> {
    match parse_lenient(url) {
        Some(parsed) => parsed
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(str::to_owned),
        None => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(str::to_owned),
    }
}

fn parse_lenient(url: &str) -> Option<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{trimmed}")).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}
