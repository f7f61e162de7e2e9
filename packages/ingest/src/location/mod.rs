//! Location enrichment: annotate a free-text location with its region.
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. facility-name override
//! 2. every 5-digit postal code, in textual order
//! 3. exact city per comma/semicolon segment
//! 4. segment with a trailing locative ("Neustadt an der Weinstraße")
//!    removed
//! 5. segment with a trailing parenthetical removed
//! 6. first word, then first two words of a segment
//! 7. the whole string with digits removed
//!
//! Segments that look like street addresses are ignored by 3 to 6.
//! A string that already names a region comes back untouched, which
//! makes [`LocationResolver::enrich`] idempotent.

pub mod gazetteer;

use lazy_static::lazy_static;
use regex::Regex;

pub use gazetteer::{Gazetteer, REGION_LABELS};

use crate::text::{collapse_whitespace, fold_diacritics};

lazy_static! {
    static ref POSTAL_CODE: Regex = Regex::new(r"\b(\d{5})\b").unwrap();
    static ref LOCATIVE_SUFFIX: Regex =
        Regex::new(r"(?i)\s+(an der|in der|ob der|vor der|auf der|am|an|im|in|bei)\s+.+$")
            .unwrap();
    static ref TRAILING_PARENTHETICAL: Regex = Regex::new(r"\s*\([^)]*\)\s*$").unwrap();
    // Matched against folded text, so "Straße" arrives as "strasse".
    static ref STREET_KEYWORD: Regex = Regex::new(
        r"(strasse\b|str\.|\bweg\b|weg\s+\d|platz\b|allee\b|gasse\b|damm\b|chaussee\b|ufer\s+\d|ring\s+\d)"
    )
    .unwrap();
}

/// Which lookup produced the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    Facility,
    PostalCode,
    City,
    LocativeStripped,
    ParentheticalStripped,
    LeadingWords,
    DigitsRemoved,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatch {
    pub region: String,
    pub strategy: LookupStrategy,
}

/// Resolves free-text locations against a [`Gazetteer`].
#[derive(Debug, Clone)]
pub struct LocationResolver {
    gazetteer: Gazetteer,
    labels: Vec<String>,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new(Gazetteer::german())
    }
}

impl LocationResolver {
    pub fn new(gazetteer: Gazetteer) -> Self {
        let mut labels: Vec<String> = REGION_LABELS
            .iter()
            .copied()
            .chain(gazetteer.regions())
            .map(fold_diacritics)
            .collect();
        labels.sort();
        labels.dedup();
        Self { gazetteer, labels }
    }

    /// `"{text}, {region}"` when a region is found, else `text` unchanged.
    pub fn enrich(&self, text: &str) -> String {
        match self.resolve(text) {
            Some(found) => format!("{}, {}", text, found.region),
            None => text.to_string(),
        }
    }

    /// True when the text already carries a known region or country label.
    pub fn has_region(&self, text: &str) -> bool {
        let folded = fold_diacritics(text);
        self.labels
            .iter()
            .any(|label| contains_phrase(&folded, label))
    }

    /// Run the strategy chain. `None` if the text is already labelled or
    /// nothing matched.
    pub fn resolve(&self, text: &str) -> Option<RegionMatch> {
        if text.trim().is_empty() || self.has_region(text) {
            return None;
        }

        let hit = |region: &str, strategy| {
            Some(RegionMatch {
                region: region.to_string(),
                strategy,
            })
        };

        if let Some(region) = self
            .gazetteer
            .facility(text)
            .or_else(|| self.gazetteer.facility_in(text))
        {
            return hit(region, LookupStrategy::Facility);
        }

        for cap in POSTAL_CODE.captures_iter(text) {
            if let Some(region) = self.gazetteer.postal_code(&cap[1]) {
                return hit(region, LookupStrategy::PostalCode);
            }
        }

        let segments: Vec<&str> = text
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty() && !looks_like_address(s))
            .collect();

        let per_segment: [(LookupStrategy, fn(&str) -> Vec<String>); 4] = [
            (LookupStrategy::City, |s| vec![s.to_string()]),
            (LookupStrategy::LocativeStripped, |s| {
                let stripped = LOCATIVE_SUFFIX.replace(s, "");
                if stripped == s {
                    Vec::new()
                } else {
                    vec![stripped.into_owned()]
                }
            }),
            (LookupStrategy::ParentheticalStripped, |s| {
                let stripped = TRAILING_PARENTHETICAL.replace(s, "");
                if stripped == s {
                    Vec::new()
                } else {
                    vec![stripped.into_owned()]
                }
            }),
            (LookupStrategy::LeadingWords, leading_words),
        ];

        for (strategy, candidates) in per_segment {
            for segment in &segments {
                for candidate in candidates(segment) {
                    if let Some(region) = self.gazetteer.city(&candidate) {
                        return hit(region, strategy);
                    }
                }
            }
        }

        let without_digits: String = text.chars().filter(|c| !c.is_ascii_digit()).collect();
        let without_digits = collapse_whitespace(&without_digits);
        let without_digits = without_digits.trim_matches(|c: char| c == ',' || c == ';' || c == '-' || c.is_whitespace());
        self.gazetteer
            .city(without_digits)
            .and_then(|region| hit(region, LookupStrategy::DigitsRemoved))
    }
}

fn looks_like_address(segment: &str) -> bool {
    STREET_KEYWORD.is_match(&fold_diacritics(segment))
}

/// First word, then first two words, of a multi-word segment.
fn leading_words(segment: &str) -> Vec<String> {
    let words: Vec<&str> = segment.split_whitespace().collect();
    if words.len() < 2 {
        return Vec::new();
    }
    let mut candidates = vec![words[0].trim_end_matches(['-', '/']).to_string()];
    if words.len() > 2 {
        candidates.push(words[..2].join(" "));
    }
    candidates
}

/// `needle` occurs in `haystack` bounded by non-alphanumerics or the ends.
pub(crate) fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LocationResolver {
        LocationResolver::default()
    }

    #[test]
    fn postal_code_wins_over_city() {
        let r = LocationResolver::new(
            Gazetteer::empty()
                .with_postal_code("74613", "Baden-Württemberg")
                .with_city("Öhringen", "Somewhere Else"),
        );
        assert_eq!(r.enrich("74613 Öhringen"), "74613 Öhringen, Baden-Württemberg");
    }

    #[test]
    fn already_labelled_text_is_unchanged() {
        assert_eq!(resolver().enrich("Ulm, Baden-Württemberg"), "Ulm, Baden-Württemberg");
        assert_eq!(resolver().enrich("Wien, Österreich"), "Wien, Österreich");
        assert_eq!(resolver().enrich("Berlin"), "Berlin");
    }

    #[test]
    fn region_label_needs_word_boundary() {
        let r = resolver();
        assert!(!r.has_region("Sachsenhausen"));
        assert!(r.has_region("Leipzig (Sachsen)"));
    }

    #[test]
    fn facility_override() {
        let found = resolver().resolve("Charité - Universitätsmedizin Berlin Campus Mitte");
        // "Berlin" is itself a region label, so nothing to do.
        assert_eq!(found, None);

        let found = resolver().resolve("UKE").unwrap();
        assert_eq!(found.strategy, LookupStrategy::Facility);
        assert_eq!(found.region, "Hamburg");
    }

    #[test]
    fn tries_each_postal_code_in_order() {
        let r = LocationResolver::new(Gazetteer::empty().with_postal_code("69120", "Region B"));
        assert_eq!(r.enrich("00000 Nirgendwo / 69120 Heidelberg"), "00000 Nirgendwo / 69120 Heidelberg, Region B");
    }

    #[test]
    fn skips_street_segments() {
        let r = LocationResolver::new(
            Gazetteer::empty()
                .with_city("Heilbronner Straße 12", "Wrong")
                .with_city("Heilbronn", "Baden-Württemberg"),
        );
        let found = r.resolve("Heilbronner Straße 12, Heilbronn").unwrap();
        assert_eq!(found.region, "Baden-Württemberg");
        assert_eq!(found.strategy, LookupStrategy::City);
    }

    #[test]
    fn strips_locative_suffix() {
        let found = resolver().resolve("Esslingen am Neckar").unwrap();
        assert_eq!(found.strategy, LookupStrategy::LocativeStripped);
        assert_eq!(found.region, "Baden-Württemberg");
    }

    #[test]
    fn strips_trailing_parenthetical() {
        let found = resolver().resolve("Regensburg (Oberpfalz)").unwrap();
        assert_eq!(found.strategy, LookupStrategy::ParentheticalStripped);
        assert_eq!(found.region, "Bayern");
    }

    #[test]
    fn exact_city_beats_parenthetical_strip() {
        let found = resolver().resolve("Frankfurt (Oder)").unwrap();
        assert_eq!(found.region, "Brandenburg");
    }

    #[test]
    fn leading_words() {
        let found = resolver().resolve("Tübingen Universitätsklinikum").unwrap();
        assert_eq!(found.strategy, LookupStrategy::LeadingWords);
        assert_eq!(found.region, "Baden-Württemberg");
    }

    #[test]
    fn digits_removed_last_resort() {
        let r = LocationResolver::new(Gazetteer::empty().with_city("Öhringen", "Baden-Württemberg"));
        let found = r.resolve("74613 Öhringen").unwrap();
        assert_eq!(found.strategy, LookupStrategy::DigitsRemoved);
    }

    #[test]
    fn unknown_location_is_unchanged() {
        assert_eq!(resolver().enrich("Bundesweit"), "Bundesweit");
        assert_eq!(resolver().enrich(""), "");
    }
}
