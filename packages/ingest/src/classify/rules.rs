//! Deterministic keyword rules.
//!
//! Patterns run against diacritic-folded text, so umlauts appear as
//! `ae`/`oe`/`ue` and also as their bare vowel for boards that strip them.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::text::fold_diacritics;

/// Tags kept per listing.
pub const MAX_TAGS: usize = 5;

/// Department labels, in the order they are tested. More specific
/// disciplines come before the ones whose keywords they contain
/// ("Unfallchirurgie" is Orthopädie, not Chirurgie).
pub const DEPARTMENTS: &[&str] = &[
    "Kardiologie",
    "Neurologie",
    "Psychiatrie",
    "Anästhesie",
    "Pädiatrie",
    "Gynäkologie",
    "Orthopädie",
    "Urologie",
    "Radiologie",
    "Notfallmedizin",
    "Allgemeinmedizin",
    "Chirurgie",
    "Innere Medizin",
];

lazy_static! {
    static ref DEPARTMENT_RULES: Vec<(&'static str, Regex)> = [
        ("Kardiologie", r"kardiolog"),
        ("Neurologie", r"neurolog|stroke unit"),
        ("Psychiatrie", r"psychiatr|psychosomat|psychotherap"),
        ("Anästhesie", r"ana?e?sthes"),
        ("Pädiatrie", r"pa?e?diatr|kinderheilkunde|kinder- und jugendmedizin|neonatolog"),
        ("Gynäkologie", r"gyna?e?kolog|gynaecolog|geburtshilfe|frauenheilkunde"),
        ("Orthopädie", r"orthopa?e?d|unfallchirurg"),
        ("Urologie", r"urolog"),
        ("Radiologie", r"radiolog|nuklearmedizin"),
        ("Notfallmedizin", r"notfallmedizin|notarzt|notaerzt"),
        ("Allgemeinmedizin", r"allgemeinmedizin|hausarzt|hausaerzt"),
        ("Chirurgie", r"chirurg"),
        ("Innere Medizin", r"innere medizin|internist|gastroenterolog|onkolog|nephrolog|pneumolog|geriatr"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).unwrap()))
    .collect();

    static ref TAG_RULES: Vec<(&'static str, Regex)> = [
        // employment type
        ("Vollzeit", r"vollzeit|full[- ]?time"),
        ("Teilzeit", r"teilzeit|part[- ]?time"),
        ("Befristet", r"befristet"),
        // training programme
        ("Weiterbildung", r"weiterbildung|\bwba\b"),
        ("Assistenzarzt", r"assistenza?e?rzt|arzt in weiterbildung|aerztin in weiterbildung"),
        ("Facharzt", r"facha?e?rzt"),
        ("Oberarzt", r"oberae?rzt|oberarzt"),
        ("Chefarzt", r"chefae?rzt"),
        // wards
        ("Intensivstation", r"intensiv"),
        ("Notaufnahme", r"notaufnahme|\bzna\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).unwrap()))
    .collect();
}

/// Result of the keyword pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleMatch {
    pub department: Option<String>,
    pub tags: BTreeSet<String>,
}

impl RuleMatch {
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.tags.is_empty()
    }
}

/// Run department and tag rules over every given text.
pub fn apply(texts: &[&str]) -> RuleMatch {
    let folded = fold_diacritics(&texts.join(" \n "));

    let department = DEPARTMENT_RULES
        .iter()
        .find(|(_, pattern)| pattern.is_match(&folded))
        .map(|(label, _)| label.to_string());

    let tags = TAG_RULES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&folded))
        .map(|(label, _)| label.to_string())
        .take(MAX_TAGS)
        .collect();

    RuleMatch { department, tags }
}

/// Map a free-form department name onto a known label.
pub fn canonical_department(name: &str) -> Option<&'static str> {
    let folded = fold_diacritics(name.trim());
    if folded.is_empty() {
        return None;
    }
    DEPARTMENTS
        .iter()
        .copied()
        .find(|label| fold_diacritics(label) == folded)
        .or_else(|| {
            DEPARTMENT_RULES
                .iter()
                .find(|(_, pattern)| pattern.is_match(&folded))
                .map(|(label, _)| *label)
        })
}
