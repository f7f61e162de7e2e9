use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::{JobId, RunId};

/// What a run-log row records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RunAction {
    RunStarted,
    Imported,
    Updated,
    Skipped,
    Expired,
    Error,
    RunCompleted,
}

impl RunAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunAction::RunStarted => "run_started",
            RunAction::Imported => "imported",
            RunAction::Updated => "updated",
            RunAction::Skipped => "skipped",
            RunAction::Expired => "expired",
            RunAction::Error => "error",
            RunAction::RunCompleted => "run_completed",
        }
    }
}

impl std::fmt::Display for RunAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLogEntry {
    pub run_id: RunId,
    pub action: RunAction,
    pub source_unique_id: Option<String>,
    pub job_id: Option<JobId>,
    pub details: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl RunLogEntry {
    pub fn new(run_id: RunId, action: RunAction, created_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            action,
            source_unique_id: None,
            job_id: None,
            details: Map::new(),
            created_at,
        }
    }

    pub fn with_listing(mut self, source_unique_id: impl Into<String>) -> Self {
        self.source_unique_id = Some(source_unique_id.into());
        self
    }

    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one run, returned to the trigger caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub success: bool,
    pub run_id: Option<RunId>,
    pub total_listings: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub expired: usize,
    pub errors: usize,
    pub error_messages: Vec<String>,
    pub budget_exhausted: bool,
    /// Listings extracted but left for the next run.
    pub unprocessed: usize,
}
