//! Pure text helpers shared by the extractors, the classifier and the
//! dedup logic. No I/O in here.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref SCRIPT_STYLE_REGEX: Regex =
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap();
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode HTML entities and collapse whitespace.
///
/// Entities are decoded twice because some boards double-escape
/// (`&amp;uuml;`).
pub fn clean_text(raw: &str) -> String {
    let once = html_escape::decode_html_entities(raw);
    let twice = html_escape::decode_html_entities(&once);
    collapse_whitespace(&twice)
}

/// Strip markup from an HTML fragment and return clean text.
pub fn strip_tags(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let without_tags = TAG_REGEX.replace_all(&without_scripts, " ");
    clean_text(&without_tags)
}

/// Lowercase and transliterate umlauts so "Anästhesie" and
/// "ANAESTHESIE" fold to the same key. Other diacritics are dropped.
pub fn fold_diacritics(text: &str) -> String {
    text.to_lowercase()
        .replace('ß', "ss")
        .replace("ä", "ae")
        .replace("ö", "oe")
        .replace("ü", "ue")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// SHA256 over the given fields, in order.
///
/// Fields are whitespace-normalized and joined with a unit separator so
/// that moving text from one field to the next changes the digest.
pub fn content_hash(fields: &[&str]) -> String {
    let normalized = fields
        .iter()
        .map(|field| collapse_whitespace(field))
        .collect::<Vec<_>>()
        .join("\u{1f}");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}
