//! Lookup tables behind the location resolver.
//!
//! Keys are stored diacritic-folded (see [`fold_diacritics`]) so lookups
//! do not care about "Göttingen" vs "Goettingen".

use std::collections::HashMap;

use crate::text::fold_diacritics;

pub const BADEN_WUERTTEMBERG: &str = "Baden-Württemberg";
pub const BAYERN: &str = "Bayern";
pub const BERLIN: &str = "Berlin";
pub const BRANDENBURG: &str = "Brandenburg";
pub const BREMEN: &str = "Bremen";
pub const HAMBURG: &str = "Hamburg";
pub const HESSEN: &str = "Hessen";
pub const MECKLENBURG_VORPOMMERN: &str = "Mecklenburg-Vorpommern";
pub const NIEDERSACHSEN: &str = "Niedersachsen";
pub const NORDRHEIN_WESTFALEN: &str = "Nordrhein-Westfalen";
pub const RHEINLAND_PFALZ: &str = "Rheinland-Pfalz";
pub const SAARLAND: &str = "Saarland";
pub const SACHSEN: &str = "Sachsen";
pub const SACHSEN_ANHALT: &str = "Sachsen-Anhalt";
pub const SCHLESWIG_HOLSTEIN: &str = "Schleswig-Holstein";
pub const THUERINGEN: &str = "Thüringen";

/// Labels that mark a location string as already enriched.
pub const REGION_LABELS: &[&str] = &[
    BADEN_WUERTTEMBERG,
    BAYERN,
    BERLIN,
    BRANDENBURG,
    BREMEN,
    HAMBURG,
    HESSEN,
    MECKLENBURG_VORPOMMERN,
    NIEDERSACHSEN,
    NORDRHEIN_WESTFALEN,
    RHEINLAND_PFALZ,
    SAARLAND,
    SACHSEN,
    SACHSEN_ANHALT,
    SCHLESWIG_HOLSTEIN,
    THUERINGEN,
    "Deutschland",
    "Österreich",
    "Schweiz",
];

/// Two-digit postal prefixes mapped to the state most of the zone lies in.
const POSTAL_PREFIXES: &[(&str, &str)] = &[
    ("01", SACHSEN), ("02", SACHSEN), ("03", BRANDENBURG), ("04", SACHSEN),
    ("06", SACHSEN_ANHALT), ("07", THUERINGEN), ("08", SACHSEN), ("09", SACHSEN),
    ("10", BERLIN), ("12", BERLIN), ("13", BERLIN), ("14", BRANDENBURG),
    ("15", BRANDENBURG), ("16", BRANDENBURG), ("17", MECKLENBURG_VORPOMMERN),
    ("18", MECKLENBURG_VORPOMMERN), ("19", MECKLENBURG_VORPOMMERN),
    ("20", HAMBURG), ("21", NIEDERSACHSEN), ("22", HAMBURG), ("23", SCHLESWIG_HOLSTEIN),
    ("24", SCHLESWIG_HOLSTEIN), ("25", SCHLESWIG_HOLSTEIN), ("26", NIEDERSACHSEN),
    ("27", NIEDERSACHSEN), ("28", BREMEN), ("29", NIEDERSACHSEN),
    ("30", NIEDERSACHSEN), ("31", NIEDERSACHSEN), ("32", NORDRHEIN_WESTFALEN),
    ("33", NORDRHEIN_WESTFALEN), ("34", HESSEN), ("35", HESSEN), ("36", HESSEN),
    ("37", NIEDERSACHSEN), ("38", NIEDERSACHSEN), ("39", SACHSEN_ANHALT),
    ("40", NORDRHEIN_WESTFALEN), ("41", NORDRHEIN_WESTFALEN), ("42", NORDRHEIN_WESTFALEN),
    ("44", NORDRHEIN_WESTFALEN), ("45", NORDRHEIN_WESTFALEN), ("46", NORDRHEIN_WESTFALEN),
    ("47", NORDRHEIN_WESTFALEN), ("48", NORDRHEIN_WESTFALEN), ("49", NIEDERSACHSEN),
    ("50", NORDRHEIN_WESTFALEN), ("51", NORDRHEIN_WESTFALEN), ("52", NORDRHEIN_WESTFALEN),
    ("53", NORDRHEIN_WESTFALEN), ("54", RHEINLAND_PFALZ), ("55", RHEINLAND_PFALZ),
    ("56", RHEINLAND_PFALZ), ("57", NORDRHEIN_WESTFALEN), ("58", NORDRHEIN_WESTFALEN),
    ("59", NORDRHEIN_WESTFALEN), ("60", HESSEN), ("61", HESSEN), ("63", HESSEN),
    ("64", HESSEN), ("65", HESSEN), ("66", SAARLAND), ("67", RHEINLAND_PFALZ),
    ("68", BADEN_WUERTTEMBERG), ("69", BADEN_WUERTTEMBERG), ("70", BADEN_WUERTTEMBERG),
    ("71", BADEN_WUERTTEMBERG), ("72", BADEN_WUERTTEMBERG), ("73", BADEN_WUERTTEMBERG),
    ("74", BADEN_WUERTTEMBERG), ("75", BADEN_WUERTTEMBERG), ("76", BADEN_WUERTTEMBERG),
    ("77", BADEN_WUERTTEMBERG), ("78", BADEN_WUERTTEMBERG), ("79", BADEN_WUERTTEMBERG),
    ("80", BAYERN), ("81", BAYERN), ("82", BAYERN), ("83", BAYERN), ("84", BAYERN),
    ("85", BAYERN), ("86", BAYERN), ("87", BAYERN), ("88", BADEN_WUERTTEMBERG),
    ("89", BADEN_WUERTTEMBERG), ("90", BAYERN), ("91", BAYERN), ("92", BAYERN),
    ("93", BAYERN), ("94", BAYERN), ("95", BAYERN), ("96", BAYERN), ("97", BAYERN),
    ("98", THUERINGEN), ("99", THUERINGEN),
];

/// Postal codes whose zone straddles a state border.
const POSTAL_CODES: &[(&str, &str)] = &[
    ("21029", HAMBURG), ("21031", HAMBURG), ("21033", HAMBURG), ("21035", HAMBURG),
    ("21073", HAMBURG), ("21075", HAMBURG), ("21077", HAMBURG), ("27568", BREMEN),
    ("27570", BREMEN), ("27572", BREMEN), ("27574", BREMEN), ("27576", BREMEN),
    ("63739", BAYERN), ("63741", BAYERN), ("63743", BAYERN), ("89231", BAYERN),
    ("89233", BAYERN), ("89073", BADEN_WUERTTEMBERG),
];

const CITIES: &[(&str, &str)] = &[
    ("Aachen", NORDRHEIN_WESTFALEN), ("Augsburg", BAYERN), ("Bad Mergentheim", BADEN_WUERTTEMBERG),
    ("Bamberg", BAYERN), ("Bayreuth", BAYERN), ("Berlin", BERLIN), ("Bielefeld", NORDRHEIN_WESTFALEN),
    ("Bochum", NORDRHEIN_WESTFALEN), ("Bonn", NORDRHEIN_WESTFALEN), ("Brandenburg", BRANDENBURG),
    ("Braunschweig", NIEDERSACHSEN), ("Bremen", BREMEN), ("Bremerhaven", BREMEN),
    ("Chemnitz", SACHSEN), ("Cottbus", BRANDENBURG), ("Darmstadt", HESSEN), ("Dessau", SACHSEN_ANHALT),
    ("Dortmund", NORDRHEIN_WESTFALEN), ("Dresden", SACHSEN), ("Duisburg", NORDRHEIN_WESTFALEN),
    ("Düsseldorf", NORDRHEIN_WESTFALEN), ("Erfurt", THUERINGEN), ("Erlangen", BAYERN),
    ("Essen", NORDRHEIN_WESTFALEN), ("Esslingen", BADEN_WUERTTEMBERG), ("Flensburg", SCHLESWIG_HOLSTEIN),
    ("Frankfurt", HESSEN), ("Frankfurt (Oder)", BRANDENBURG), ("Freiburg", BADEN_WUERTTEMBERG),
    ("Fulda", HESSEN), ("Gelsenkirchen", NORDRHEIN_WESTFALEN), ("Gera", THUERINGEN),
    ("Gießen", HESSEN), ("Göttingen", NIEDERSACHSEN), ("Greifswald", MECKLENBURG_VORPOMMERN),
    ("Halle", SACHSEN_ANHALT), ("Hamburg", HAMBURG), ("Hamm", NORDRHEIN_WESTFALEN),
    ("Hannover", NIEDERSACHSEN), ("Heidelberg", BADEN_WUERTTEMBERG), ("Heilbronn", BADEN_WUERTTEMBERG),
    ("Hildesheim", NIEDERSACHSEN), ("Homburg", SAARLAND), ("Ingolstadt", BAYERN), ("Jena", THUERINGEN),
    ("Kaiserslautern", RHEINLAND_PFALZ), ("Karlsruhe", BADEN_WUERTTEMBERG), ("Kassel", HESSEN),
    ("Kiel", SCHLESWIG_HOLSTEIN), ("Koblenz", RHEINLAND_PFALZ), ("Köln", NORDRHEIN_WESTFALEN),
    ("Konstanz", BADEN_WUERTTEMBERG), ("Krefeld", NORDRHEIN_WESTFALEN), ("Leipzig", SACHSEN),
    ("Leverkusen", NORDRHEIN_WESTFALEN), ("Lübeck", SCHLESWIG_HOLSTEIN), ("Ludwigsburg", BADEN_WUERTTEMBERG),
    ("Ludwigshafen", RHEINLAND_PFALZ), ("Lüneburg", NIEDERSACHSEN), ("Magdeburg", SACHSEN_ANHALT),
    ("Mainz", RHEINLAND_PFALZ), ("Mannheim", BADEN_WUERTTEMBERG), ("Marburg", HESSEN),
    ("Minden", NORDRHEIN_WESTFALEN), ("Mönchengladbach", NORDRHEIN_WESTFALEN), ("Mülheim", NORDRHEIN_WESTFALEN),
    ("München", BAYERN), ("Münster", NORDRHEIN_WESTFALEN), ("Neubrandenburg", MECKLENBURG_VORPOMMERN),
    ("Neuruppin", BRANDENBURG), ("Neuss", NORDRHEIN_WESTFALEN), ("Nürnberg", BAYERN),
    ("Oberhausen", NORDRHEIN_WESTFALEN), ("Offenbach", HESSEN), ("Offenburg", BADEN_WUERTTEMBERG),
    ("Oldenburg", NIEDERSACHSEN), ("Osnabrück", NIEDERSACHSEN), ("Paderborn", NORDRHEIN_WESTFALEN),
    ("Passau", BAYERN), ("Pforzheim", BADEN_WUERTTEMBERG), ("Potsdam", BRANDENBURG),
    ("Ravensburg", BADEN_WUERTTEMBERG), ("Regensburg", BAYERN), ("Reutlingen", BADEN_WUERTTEMBERG),
    ("Rosenheim", BAYERN), ("Rostock", MECKLENBURG_VORPOMMERN), ("Saarbrücken", SAARLAND),
    ("Schwäbisch Hall", BADEN_WUERTTEMBERG), ("Schwerin", MECKLENBURG_VORPOMMERN), ("Siegen", NORDRHEIN_WESTFALEN),
    ("Solingen", NORDRHEIN_WESTFALEN), ("Stralsund", MECKLENBURG_VORPOMMERN), ("Stuttgart", BADEN_WUERTTEMBERG),
    ("Trier", RHEINLAND_PFALZ), ("Tübingen", BADEN_WUERTTEMBERG), ("Ulm", BADEN_WUERTTEMBERG),
    ("Weimar", THUERINGEN), ("Wiesbaden", HESSEN), ("Wolfsburg", NIEDERSACHSEN),
    ("Wuppertal", NORDRHEIN_WESTFALEN), ("Würzburg", BAYERN), ("Zwickau", SACHSEN),
    ("Öhringen", BADEN_WUERTTEMBERG),
];

const FACILITIES: &[(&str, &str)] = &[
    ("Charité", BERLIN),
    ("Charité - Universitätsmedizin Berlin", BERLIN),
    ("Universitätsklinikum Hamburg-Eppendorf", HAMBURG),
    ("UKE", HAMBURG),
    ("Medizinische Hochschule Hannover", NIEDERSACHSEN),
    ("MHH", NIEDERSACHSEN),
    ("LMU Klinikum", BAYERN),
    ("Klinikum rechts der Isar", BAYERN),
    ("Uniklinik RWTH Aachen", NORDRHEIN_WESTFALEN),
    ("Universitätsklinikum Heidelberg", BADEN_WUERTTEMBERG),
];

/// Region lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    facilities: HashMap<String, String>,
    postal_codes: HashMap<String, String>,
    postal_prefixes: HashMap<String, String>,
    cities: HashMap<String, String>,
}

impl Gazetteer {
    /// Empty tables; fill with the `with_*` builders.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in tables for German locations.
    pub fn german() -> Self {
        let mut gazetteer = Self::empty();
        for (name, region) in FACILITIES {
            gazetteer = gazetteer.with_facility(*name, *region);
        }
        for (code, region) in POSTAL_CODES {
            gazetteer = gazetteer.with_postal_code(*code, *region);
        }
        for (prefix, region) in POSTAL_PREFIXES {
            gazetteer
                .postal_prefixes
                .insert(prefix.to_string(), region.to_string());
        }
        for (city, region) in CITIES {
            gazetteer = gazetteer.with_city(*city, *region);
        }
        gazetteer
    }

    pub fn with_facility(mut self, name: impl AsRef<str>, region: impl Into<String>) -> Self {
        self.facilities
            .insert(fold_diacritics(name.as_ref()), region.into());
        self
    }

    pub fn with_postal_code(mut self, code: impl Into<String>, region: impl Into<String>) -> Self {
        self.postal_codes.insert(code.into(), region.into());
        self
    }

    pub fn with_city(mut self, city: impl AsRef<str>, region: impl Into<String>) -> Self {
        self.cities.insert(fold_diacritics(city.as_ref()), region.into());
        self
    }

    pub fn facility(&self, name: &str) -> Option<&str> {
        self.facilities.get(&fold_diacritics(name.trim())).map(String::as_str)
    }

    /// Facility names that occur somewhere in the text, longest first.
    pub fn facility_in(&self, text: &str) -> Option<&str> {
        let folded = fold_diacritics(text);
        self.facilities
            .iter()
            .filter(|(name, _)| super::contains_phrase(&folded, name))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, region)| region.as_str())
    }

    /// Exact code first, then its two-digit zone.
    pub fn postal_code(&self, code: &str) -> Option<&str> {
        self.postal_codes
            .get(code)
            .or_else(|| code.get(..2).and_then(|prefix| self.postal_prefixes.get(prefix)))
            .map(String::as_str)
    }

    pub fn city(&self, name: &str) -> Option<&str> {
        let key = fold_diacritics(name.trim());
        if key.is_empty() {
            return None;
        }
        self.cities.get(&key).map(String::as_str)
    }

    /// Every region label this gazetteer can produce.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.facilities
            .values()
            .chain(self.postal_codes.values())
            .chain(self.postal_prefixes.values())
            .chain(self.cities.values())
            .map(String::as_str)
    }
}
