//! Regex-level page helpers shared by every scraper: meta tags, JSON-LD,
//! price text, and text cleanup. None of these build a DOM.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static CURRENCY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(USD|NOK|EUR|GBP|CNY)\b").expect("valid regex"));

/// Returns the `content` of the first `<meta>` whose `property` or `name`
/// equals `key` (case-insensitive).
#[must_use]
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|tag| {
        let mut matches_key = false;
        let mut content = None;
        for cap in ATTR_RE.captures_iter(tag.as_str()) {
            let name = cap.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
            let value = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
            match name.as_str() {
                "property" | "name" | "itemprop" if value.eq_ignore_ascii_case(key) => {
                    matches_key = true;
                }
                "content" => content = Some(decode_entities(value.trim())),
                _ => {}
            }
        }
        if matches_key {
            content.filter(|c| !c.is_empty())
        } else {
            None
        }
    })
}

/// Finds the first JSON-LD node whose `@type` is `Product`, searching
/// top-level arrays and `@graph` containers.
#[must_use]
pub fn json_ld_product(html: &str) -> Option<Value> {
    JSON_LD_RE.captures_iter(html).find_map(|cap| {
        let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
        let value = serde_json::from_str::<Value>(raw).ok()?;
        find_product_node(&value).cloned()
    })
}

fn find_product_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product_node),
        Value::Object(map) => {
            let is_product = match map.get("@type") {
                Some(Value::String(t)) => t.eq_ignore_ascii_case("product"),
                Some(Value::Array(types)) => types
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|t| t.eq_ignore_ascii_case("product")),
                _ => false,
            };
            if is_product {
                return Some(value);
            }
            map.get("@graph").and_then(find_product_node)
        }
        _ => None,
    }
}

/// Reads `offers.price` / `offers.lowPrice` and `offers.priceCurrency` from
/// a JSON-LD product node. `offers` may be an object or an array.
#[must_use]
pub fn json_ld_offer(product: &Value) -> Option<(Decimal, Option<String>)> {
    let offers = product.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let price = offer
        .get("price")
        .or_else(|| offer.get("lowPrice"))
        .and_then(json_decimal)?;
    let currency = offer
        .get("priceCurrency")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Some((price, currency))
}

/// JSON-LD `image` may be a string, an array of strings, or image objects.
#[must_use]
pub fn json_ld_images(product: &Value) -> Vec<String> {
    match product.get("image") {
        Some(Value::String(url)) => vec![url.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url.clone()),
                Value::Object(obj) => obj
                    .get("url")
                    .or_else(|| obj.get("contentUrl"))
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                _ => None,
            })
            .collect(),
        Some(Value::Object(obj)) => obj
            .get("url")
            .and_then(Value::as_str)
            .map(|u| vec![u.to_owned()])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Accepts JSON numbers and numeric strings.
#[must_use]
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => parse_price_text(s).map(|(amount, _)| amount),
        _ => None,
    }
}

/// Parses marketplace price text such as `"US $12.99"`, `"NOK 1 299,00"`,
/// `"€8,50"` or `"$3.20 - $5.10"` (first amount wins).
///
/// Returns the amount and, when the text names one, the currency code.
#[must_use]
pub fn parse_price_text(text: &str) -> Option<(Decimal, Option<String>)> {
    let currency = detect_currency(text);

    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ' ' | '\u{a0}'))
        .filter(|c| !matches!(c, ' ' | '\u{a0}'))
        .collect();
    let number = number.trim_end_matches(['.', ',']);

    let normalized = match (number.rfind('.'), number.rfind(',')) {
        // "1,299.00": comma is a thousands separator
        (Some(dot), Some(comma)) if dot > comma => number.replace(',', ""),
        // "1.299,00": dot is a thousands separator
        (Some(_), Some(_)) => number.replace('.', "").replace(',', "."),
        // "8,50" decimal comma vs "1,299" thousands comma
        (None, Some(comma)) if number.len() - comma - 1 == 3 => number.replace(',', ""),
        (None, Some(_)) => number.replace(',', "."),
        _ => number.to_owned(),
    };
    let amount = normalized.parse::<Decimal>().ok()?;
    Some((amount, currency))
}

fn detect_currency(text: &str) -> Option<String> {
    if let Some(code) = CURRENCY_CODE_RE.captures(text) {
        return code.get(1).map(|m| m.as_str().to_owned());
    }
    if text.contains('€') {
        Some("EUR".to_owned())
    } else if text.contains('£') {
        Some("GBP".to_owned())
    } else if text.contains("kr") {
        Some("NOK".to_owned())
    } else if text.contains('$') {
        Some("USD".to_owned())
    } else {
        None
    }
}

/// Strips tags, decodes common entities, and collapses whitespace.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = decode_entities(&without_tags);
    WS_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Turns protocol-relative and root-relative image URLs into absolute ones.
#[must_use]
pub fn absolutize(url: &str, page_url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("data:") {
        return None;
    }
    if url.starts_with("//") {
        return Some(format!("https:{url}"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_owned());
    }
    reqwest::Url::parse(page_url)
        .and_then(|base| base.join(url))
        .ok()
        .map(|u| u.to_string())
}
