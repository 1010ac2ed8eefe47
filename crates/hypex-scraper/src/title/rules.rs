//! Ordered regex rewrite rules. Each list runs top to bottom and every rule
//! sees the output of the previous one.

use std::sync::LazyLock;

use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("valid title rule"),
        replacement,
    }
}

static NOISE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"[【】\[\]{}()<>|]", " "),
        // model IDs: G123456789012, K68X2P, bare long digit runs
        rule(r"\b[A-Z]{1,4}\d{5,}[A-Z0-9]*\b", ""),
        rule(r"\b(?:[A-Z]+\d+){2,}[A-Z]*\b", ""),
        rule(r"\b\d{7,}\b", ""),
        rule(
            r"(?i)\b(?:temu|alibaba|aliexpress|ebay|amazon|wish|shein|dhgate)(?:\.com)?\b",
            "",
        ),
        rule(
            r"(?i)\b(?:made\s+in|fra|from|shipped\s+from|ships\s+from)\s+(?:china|kina|vietnam)\b",
            "",
        ),
        rule(r"(?i)\b(?:vietnam|china|kina|chinese|kinesisk)\b", ""),
        rule(r"(?i)\b20[12]\d\b", ""),
        rule(
            r"(?i)\b(?:new\s+arrival|hot\s+sale|best\s+seller|free\s+shipping|gratis\s+frakt|high\s+quality|høy\s+kvalitet|factory\s+price)\b",
            "",
        ),
        rule(r"(?i)100%\s*original\b", ""),
        rule(
            r"(?i)\b(?:wholesale|dropshipping|new|ny|nyhet|hot|original|cheap|billig|promotion|tilbud|brand)\b",
            "",
        ),
        rule(r",(?:\s|$)", " "),
        rule(r"[;:!?*+~#&/\\]+", " "),
        rule(r"(?:^|\s)-+(?:\s|$)", " "),
    ]
});

static TERM_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)\b(?:usb\s*-?\s*c|type\s*-?\s*c)\b", "USB-C"),
        rule(r"(?i)\busb\s*-?\s*a\b", "USB-A"),
        rule(r"(?i)\bmicro\s*-?\s*usb\b", "Micro-USB"),
        rule(r"(?i)\busb\b", "USB"),
        rule(r"(?i)\blightning\b", "Lightning"),
        rule(r"(?i)\bhdmi\b", "HDMI"),
        rule(r"(?i)\brgb\b", "RGB"),
        rule(r"(?i)\bled\b", "LED"),
        rule(r"(?i)\bbt\s*(\d\.\d)\b", "Bluetooth ${1}"),
        rule(r"(?i)\bbluetooth\b", "Bluetooth"),
        rule(r"(?i)\bgan\b", "GaN"),
        rule(r"(?i)\btws\b", "TWS"),
        rule(r"(?i)\banc\b", "ANC"),
        rule(r"(?i)\bwi-?fi\b", "WiFi"),
        rule(r"(?i)\b2[.,]4\s*g(?:hz)?\b", "2.4GHz"),
        rule(r"(?i)\bip\s*(6[5-8])\b", "IP${1}"),
        rule(r"(?i)\b(\d+)\s*w\b", "${1}W"),
        rule(r"(?i)\b(\d+)\s*mah\b", "${1}mAh"),
        rule(r"(?i)\b(\d+(?:[.,]\d+)?)\s*(?:m|meter|metre|meters)\b", "${1}m"),
        rule(r"(?i)\b(\d{2,3})\s*-?\s*(?:keys?|taster|tangenter)\b", "${1}-taster"),
        rule(r"(?i)\b(\d{3,5})\s*dpi\b", "${1} DPI"),
        rule(r"(?i)\b(\d)\s*-?\s*(?:ports?|porter)\b", "${1}-port"),
    ]
});

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static LIGHT_CLEAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[【】\[\]{}()<>|*#~]").expect("valid regex"));

fn apply(rules: &[Rule], input: &str) -> String {
    let out = rules.iter().fold(input.to_owned(), |text, r| {
        r.pattern.replace_all(&text, r.replacement).into_owned()
    });
    collapse_whitespace(&out)
}

/// Step one: drop model IDs, marketplace names, origin countries and filler.
pub(super) fn strip_noise(input: &str) -> String {
    apply(&NOISE_RULES, input)
}

/// Step two: canonical spelling of connectors, units and technical terms.
pub(super) fn normalize_terms(input: &str) -> String {
    apply(&TERM_RULES, input)
}

/// Only brackets and decoration removed; used by the last-resort fallback.
pub(super) fn light_clean(input: &str) -> String {
    collapse_whitespace(&LIGHT_CLEAN_RE.replace_all(input, " "))
}

pub(super) fn collapse_whitespace(input: &str) -> String {
    WS_RE.replace_all(input.trim(), " ").into_owned()
}
