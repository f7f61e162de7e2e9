use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::id::JobId;
use super::listing::SourceName;

/// Lifecycle status of an imported listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ImportStatus {
    PendingReview,
    Classified,
    NoSignal,
    Expired,
    Error,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::PendingReview => "pending_review",
            ImportStatus::Classified => "classified",
            ImportStatus::NoSignal => "no_signal",
            ImportStatus::Expired => "expired",
            ImportStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(ImportStatus::PendingReview),
            "classified" => Ok(ImportStatus::Classified),
            "no_signal" => Ok(ImportStatus::NoSignal),
            "expired" => Ok(ImportStatus::Expired),
            "error" => Ok(ImportStatus::Error),
            _ => Err(format!("Invalid import status: {}", s)),
        }
    }
}

/// A persisted job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    pub title: String,
    pub hospital_name: String,
    /// Location after region enrichment.
    pub location: String,
    pub department: Option<String>,
    pub tags: BTreeSet<String>,
    pub description: String,
    pub apply_url: String,
    pub source_url: String,
    pub source_name: SourceName,

    // Dedup
    pub source_unique_id: String,
    pub content_hash: String,

    // Lifecycle
    pub import_status: ImportStatus,
    pub is_published: bool,
    pub imported_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Fields for a listing that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobRecord {
    pub title: String,
    pub hospital_name: String,
    pub location: String,
    pub department: Option<String>,
    pub tags: BTreeSet<String>,
    pub description: String,
    pub apply_url: String,
    pub source_url: String,
    pub source_name: SourceName,
    pub source_unique_id: String,
    pub content_hash: String,
    pub import_status: ImportStatus,
    pub seen_at: DateTime<Utc>,
}

impl NewJobRecord {
    /// Materialise the record with a fresh id, as a store would.
    pub fn into_record(self, id: JobId) -> JobRecord {
        JobRecord {
            id,
            title: self.title,
            hospital_name: self.hospital_name,
            location: self.location,
            department: self.department,
            tags: self.tags,
            description: self.description,
            apply_url: self.apply_url,
            source_url: self.source_url,
            source_name: self.source_name,
            source_unique_id: self.source_unique_id,
            content_hash: self.content_hash,
            import_status: self.import_status,
            is_published: false,
            imported_at: self.seen_at,
            last_seen_at: self.seen_at,
        }
    }
}
