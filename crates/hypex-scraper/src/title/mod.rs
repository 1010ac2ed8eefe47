//! Rule-based rewrite of supplier product titles into short Norwegian
//! catalog names.
//!
//! Pipeline: strip noise, normalize technical terms, classify, render the
//! kind's template, fall back when the result is too thin, then tidy up.
//! Running [`improve_title`] on its own output may strip further tokens.

mod classify;
mod rules;
mod template;

pub use classify::classify_product;

use template::{capitalize, render, Facts};

/// Titles with no template keep at most this many cleaned words.
const OTHER_MAX_WORDS: usize = 8;
/// Last-resort fallback length, in words of the lightly cleaned original.
const FALLBACK_WORDS: usize = 6;
const MIN_CHARS: usize = 5;
const MIN_WORDS: usize = 2;
const REINJECT_TARGET_WORDS: usize = 3;
const REINJECT_TARGET_CHARS: usize = 15;

const GENERIC_NOUNS: &[&str] = &[
    "kabel", "cable", "tastatur", "keyboard", "mus", "mouse", "lader", "charger", "veske",
    "bag", "sekk", "holder", "stativ", "stand", "lampe", "lamp", "ørepropper", "earbuds",
    "headset", "smartklokke", "watch",
];

const STOPWORDS: &[&str] = &[
    "and", "og", "with", "med", "for", "til", "to", "the", "a", "an", "of", "in", "i", "på",
    "on", "-",
];

/// Produces a cleaned catalog title from a raw supplier title.
///
/// Returns an empty string only for blank input.
#[must_use]
pub fn improve_title(original: &str) -> String {
    let cleaned = rules::normalize_terms(&rules::strip_noise(original));
    let kind = classify_product(&cleaned);
    let facts = Facts::extract(&cleaned);

    let mut title = render(kind, &cleaned, &facts)
        .unwrap_or_else(|| first_words(&cleaned, OTHER_MAX_WORDS));

    if is_too_short(&title) || is_only_generic(&title) {
        title = reinject(&title, &cleaned);
    }
    if is_too_short(&title) {
        let fallback = first_words(&rules::light_clean(original), FALLBACK_WORDS);
        if !fallback.is_empty() {
            title = fallback;
        }
    }

    capitalize(&dedupe_adjacent(&title))
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

fn is_too_short(title: &str) -> bool {
    title.chars().count() < MIN_CHARS || word_count(title) < MIN_WORDS
}

fn is_only_generic(title: &str) -> bool {
    title
        .split_whitespace()
        .all(|w| GENERIC_NOUNS.contains(&w.to_lowercase().as_str()))
}

/// Appends words from the cleaned title that the template dropped, in their
/// original order, until the title reaches the target length.
fn reinject(title: &str, cleaned: &str) -> String {
    let mut words: Vec<String> = title.split_whitespace().map(str::to_owned).collect();

    for candidate in cleaned.split_whitespace() {
        let long_enough = words.len() >= REINJECT_TARGET_WORDS
            && words.join(" ").chars().count() >= REINJECT_TARGET_CHARS;
        if long_enough {
            break;
        }
        let lower = candidate.to_lowercase();
        if STOPWORDS.contains(&lower.as_str()) || GENERIC_NOUNS.contains(&lower.as_str()) {
            continue;
        }
        if words.iter().any(|w| w.to_lowercase() == lower) {
            continue;
        }
        words.push(candidate.to_owned());
    }

    words.join(" ")
}

fn first_words(s: &str, n: usize) -> String {
    s.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

fn dedupe_adjacent(s: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for word in s.split_whitespace() {
        if out
            .last()
            .is_some_and(|prev| prev.to_lowercase() == word.to_lowercase())
        {
            continue;
        }
        out.push(word);
    }
    out.join(" ")
}

#[cfg(test)]
#[path = "title_test.rs"]
mod tests;
