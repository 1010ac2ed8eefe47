//! Per-kind title templates. Facts are pulled out of the normalized title
//! and placed in a fixed order; absent facts are skipped.

use std::sync::LazyLock;

use hypex_core::ProductKind;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid fact regex")
}

static KEY_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d{2,3})-taster\b"));
static SWITCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(red|blue|brown|black|yellow|rød|røde|blå|blåe|brun|brune|svart|svarte|gul|gule)\s*(?:switch(?:es)?|brytere?)\b")
});
static WATTAGE_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d{1,3})W\b"));
static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d+(?:[.,]\d+)?)m\b"));
static PORTS_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d)-port\b"));
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"(?i)\b(\d{1,2}(?:[.,]\d{1,2})?)\s*(?:"|''|inch(?:es)?|tommer|tommers)"#)
});
static DPI_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b(\d{3,5}) DPI\b"));
static BT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\bBluetooth (\d\.\d)\b"));
static IP_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\bIP6[5-8]\b"));
static CONNECTOR_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)\b(USB-C|USB-A|USB|Lightning|Micro-USB|HDMI)\s+(?:to|til)\s+(USB-C|USB-A|USB|Lightning|Micro-USB|HDMI)\b")
});
static CONNECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"\b(USB-C|USB-A|Lightning|Micro-USB|HDMI)\b"));
static SURROUND_RE: LazyLock<Regex> = LazyLock::new(|| re(r"\b7\.1\b"));

/// Case-insensitive term check. A term with a space is a phrase matched
/// anywhere, a trailing `*` makes it a word prefix, anything else must equal
/// a whole word.
fn mentions(text: &str, terms: &[&str]) -> bool {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == '"')
        .filter(|w| !w.is_empty())
        .collect();
    terms.iter().any(|term| {
        if term.contains(' ') {
            lower.contains(term)
        } else if let Some(stem) = term.strip_suffix('*') {
            words.iter().any(|w| w.starts_with(stem))
        } else {
            words.iter().any(|w| w == term)
        }
    })
}

/// What the templates need to know about a title.
#[derive(Debug, Default)]
pub(super) struct Facts {
    key_count: Option<String>,
    switch: Option<String>,
    wattage: Option<String>,
    length: Option<String>,
    ports: Option<String>,
    size: Option<String>,
    dpi: Option<String>,
    bluetooth_version: Option<String>,
    ip_rating: Option<String>,
    connector: Option<String>,
    mechanical: bool,
    gaming: bool,
    rgb: bool,
    wireless: bool,
    gan: bool,
    fast_charge: bool,
    braided: bool,
    noise_cancelling: bool,
    waterproof: bool,
    laptop: bool,
    adjustable: bool,
    dimmable: bool,
    microphone: bool,
    surround: bool,
    aluminium: bool,
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)?.get(1).map(|m| m.as_str().to_owned())
}

fn switch_colour(raw: &str) -> &'static str {
    match raw.to_lowercase().as_str() {
        "red" | "rød" | "røde" => "Red",
        "blue" | "blå" | "blåe" => "Blue",
        "brown" | "brun" | "brune" => "Brown",
        "yellow" | "gul" | "gule" => "Yellow",
        _ => "Black",
    }
}

impl Facts {
    pub(super) fn extract(text: &str) -> Self {
        let connector = CONNECTOR_PAIR_RE
            .captures(text)
            .and_then(|c| Some(format!("{} til {}", c.get(1)?.as_str(), c.get(2)?.as_str())))
            .or_else(|| capture(&CONNECTOR_RE, text));

        Self {
            key_count: capture(&KEY_COUNT_RE, text).map(|n| format!("{n}-taster")),
            switch: capture(&SWITCH_RE, text).map(|c| format!("{} switch", switch_colour(&c))),
            wattage: capture(&WATTAGE_RE, text).map(|w| format!("{w}W")),
            length: capture(&LENGTH_RE, text).map(|m| format!("{}m", m.replace(',', "."))),
            ports: capture(&PORTS_RE, text).map(|p| format!("{p}-port")),
            size: capture(&SIZE_RE, text).map(|s| format!("{}\"", s.replace(',', "."))),
            dpi: capture(&DPI_RE, text).map(|d| format!("{d} DPI")),
            bluetooth_version: capture(&BT_VERSION_RE, text).map(|v| format!("Bluetooth {v}")),
            ip_rating: IP_RE.find(text).map(|m| m.as_str().to_owned()),
            connector,
            mechanical: mentions(text, &["mekanisk", "mechanical"]),
            gaming: mentions(text, &["gaming", "gamer"]),
            rgb: mentions(text, &["rgb"]),
            wireless: mentions(text, &["trådløs*", "wireless", "cordless", "2.4ghz"]),
            gan: mentions(text, &["gan"]),
            fast_charge: mentions(
                text,
                &["hurtiglad*", "fast charg", "quick charge", "pd", "qc3.0", "qc 3.0"],
            ),
            braided: mentions(text, &["nylon", "braided", "flettet"]),
            noise_cancelling: mentions(text, &["anc", "noise cancel", "støydemp*"]),
            waterproof: mentions(
                text,
                &["waterproof", "water resistant", "vanntett*", "vannavstøtende"],
            ),
            laptop: mentions(text, &["laptop", "notebook", "macbook", "bærbar"]),
            adjustable: mentions(
                text,
                &["adjustable", "justerbar*", "foldable", "sammenleggbar"],
            ),
            dimmable: mentions(text, &["dimmable", "dimbar"]),
            microphone: mentions(text, &["mic", "microphone", "mikrofon"]),
            surround: SURROUND_RE.is_match(text),
            aluminium: mentions(text, &["aluminium", "aluminum"]),
        }
    }
}

/// Builds the template title for `kind`, or `None` when the kind has no
/// template.
pub(super) fn render(kind: ProductKind, text: &str, facts: &Facts) -> Option<String> {
    let mut parts: Vec<Option<String>> = Vec::new();
    let word = |on: bool, w: &str| on.then(|| w.to_owned());

    match kind {
        ProductKind::Keyboard => {
            parts.push(word(facts.mechanical, "Mekanisk"));
            parts.push(word(facts.gaming, "Gaming"));
            parts.push(Some("Tastatur".into()));
            parts.push(facts.key_count.clone());
            parts.push(word(facts.rgb, "RGB"));
            parts.push(word(facts.wireless, "Trådløs"));
            parts.push(facts.switch.clone());
        }
        ProductKind::Mouse => {
            parts.push(word(facts.wireless, "Trådløs"));
            parts.push(word(facts.gaming, "Gaming"));
            parts.push(Some("Mus".into()));
            parts.push(word(facts.rgb, "RGB"));
            parts.push(facts.dpi.clone());
        }
        ProductKind::Cable => {
            parts.push(facts.connector.clone());
            parts.push(Some("Kabel".into()));
            parts.push(facts.length.clone());
            parts.push(facts.wattage.clone());
            parts.push(word(facts.braided, "Flettet"));
        }
        ProductKind::Charger => {
            parts.push(facts.wattage.clone());
            parts.push(word(facts.gan, "GaN"));
            parts.push(facts.connector.clone());
            parts.push(Some(if facts.fast_charge { "Hurtiglader" } else { "Lader" }.into()));
            parts.push(facts.ports.clone());
        }
        ProductKind::Bag => {
            let noun = if mentions(text, &["sekk", "ryggsekk", "backpack"]) {
                "sekk"
            } else {
                "veske"
            };
            parts.push(facts.size.clone());
            parts.push(Some(if facts.laptop {
                format!("Laptop{noun}")
            } else {
                capitalize(noun)
            }));
            parts.push(word(facts.waterproof, "Vanntett"));
        }
        ProductKind::Bracket => {
            let noun = if mentions(text, &["stativ", "stand"]) {
                "stativ"
            } else {
                "holder"
            };
            let target = if facts.laptop {
                Some("Laptop")
            } else if mentions(text, &["phone", "telefon", "mobil*"]) {
                Some("Mobil")
            } else if mentions(text, &["tablet", "nettbrett", "ipad"]) {
                Some("Nettbrett")
            } else if mentions(text, &["monitor", "skjerm"]) {
                Some("Skjerm")
            } else {
                None
            };
            parts.push(word(facts.adjustable, "Justerbar"));
            parts.push(Some(match target {
                Some(t) => format!("{t}{noun}"),
                None => capitalize(noun),
            }));
            parts.push(word(facts.aluminium, "Aluminium"));
        }
        ProductKind::Earbuds => {
            parts.push(word(facts.wireless || facts.bluetooth_version.is_some(), "Trådløse"));
            parts.push(Some("Ørepropper".into()));
            parts.push(facts.bluetooth_version.clone());
            parts.push(word(facts.noise_cancelling, "ANC"));
            parts.push(word(facts.waterproof, "Vanntette"));
        }
        ProductKind::Lamp => {
            let noun = if mentions(text, &["strip", "stripe", "led-stripe"]) {
                "LED-stripe"
            } else if mentions(text, &["desk", "skrivebord*"]) {
                "Skrivebordslampe"
            } else if mentions(text, &["night", "natt*"]) {
                "Nattlampe"
            } else {
                "Lampe"
            };
            parts.push(word(facts.rgb, "RGB"));
            parts.push(word(noun == "Lampe" && mentions(text, &["led"]), "LED"));
            parts.push(Some(noun.into()));
            parts.push(facts.length.clone());
            parts.push(word(facts.dimmable, "Dimbar"));
        }
        ProductKind::Watch => {
            parts.push(Some("Smartklokke".into()));
            parts.push(facts.size.clone());
            parts.push(facts.ip_rating.clone());
            parts.push(word(mentions(text, &["heart rate", "puls*"]), "Pulsmåler"));
        }
        ProductKind::Headset => {
            parts.push(word(facts.wireless, "Trådløst"));
            parts.push(word(facts.gaming, "Gaming"));
            parts.push(Some("Headset".into()));
            parts.push(word(facts.surround, "7.1"));
            parts.push(word(facts.rgb, "RGB"));
            parts.push(word(facts.microphone, "med mikrofon"));
        }
        ProductKind::Other => return None,
    }

    Some(parts.into_iter().flatten().collect::<Vec<_>>().join(" "))
}

pub(super) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
