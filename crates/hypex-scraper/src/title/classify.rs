use std::sync::LazyLock;

use hypex_core::ProductKind;
use regex::Regex;

/// Checked in order; the first kind whose keywords match wins. Cables come
/// before chargers so "charging cable" is a cable.
static KIND_KEYWORDS: LazyLock<Vec<(ProductKind, Regex)>> = LazyLock::new(|| {
    [
        (
            ProductKind::Keyboard,
            r"\b(?:tastatur\w*|keyboards?|keycaps?|mekanisk|mechanical)\b",
        ),
        (ProductKind::Mouse, r"\b(?:mus|mouse|mice|gaming-mus)\b"),
        (
            ProductKind::Earbuds,
            r"\b(?:ørepropper|øreplugger|earbuds?|earphones?|in-ear|tws)\b",
        ),
        (
            ProductKind::Headset,
            r"\b(?:headset|headphones?|hodetelefoner|over-ear)\b",
        ),
        (
            ProductKind::Watch,
            r"\b(?:smartklokke|smartwatch|smart\s+watch|klokke|watch|fitness\s+tracker|aktivitetsarmbånd)\b",
        ),
        (ProductKind::Cable, r"\b(?:kabel|kabler|cables?|ledning|cord)\b"),
        (
            ProductKind::Charger,
            r"\b(?:lader|hurtiglader|chargers?|charging\s+adapter|power\s+adapter|strømadapter|gan)\b",
        ),
        (
            ProductKind::Lamp,
            r"\b(?:lampe|lamp|light|lys|belysning|led\s+strip|led-stripe|nattlampe)\b",
        ),
        (
            ProductKind::Bag,
            r"\b(?:veske|bag|sekk|ryggsekk|backpack|sleeve|etui)\b",
        ),
        (
            ProductKind::Bracket,
            r"\b(?:holder|stativ|stand|mount|bracket|brakett|feste)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("valid keyword regex");
        (kind, re)
    })
    .collect()
});

/// Sniffs the product type from title keywords (Norwegian and English).
#[must_use]
pub fn classify_product(title: &str) -> ProductKind {
    KIND_KEYWORDS
        .iter()
        .find(|(_, re)| re.is_match(title))
        .map_or(ProductKind::Other, |(kind, _)| *kind)
}
