use serde::{Deserialize, Serialize};
use url::Url;

use crate::text::content_hash;

/// External job boards the pipeline scrapes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SourceName {
    Klinikstellen,
    Medijobs,
    Arztboerse,
    Stellenwerk,
    Karriereportal,
}

impl SourceName {
    pub const ALL: [SourceName; 5] = [
        SourceName::Klinikstellen,
        SourceName::Medijobs,
        SourceName::Arztboerse,
        SourceName::Stellenwerk,
        SourceName::Karriereportal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Klinikstellen => "klinikstellen",
            SourceName::Medijobs => "medijobs",
            SourceName::Arztboerse => "arztboerse",
            SourceName::Stellenwerk => "stellenwerk",
            SourceName::Karriereportal => "karriereportal",
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a source name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source: {0}")]
pub struct UnknownSource(pub String);

impl std::str::FromStr for SourceName {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// One listing as extracted from a result page.
///
/// Never persisted as-is: the orchestrator turns it into a `JobRecord`
/// or uses it to refresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedListing {
    pub title: String,
    pub external_link: Url,
    pub employer_name: String,
    pub location_raw: String,
    /// Stable within one source; usually the canonical detail-page URL.
    pub source_unique_id: String,
    pub pre_resolved_employer_url: Option<Url>,
    pub source_name: SourceName,
}

impl ScrapedListing {
    /// Digest over the fields that decide whether a listing changed.
    pub fn content_hash(&self) -> String {
        content_hash(&[&self.title, &self.employer_name, &self.location_raw])
    }
}
