//! Data model shared by the pipeline stages and the store.

pub mod id;
pub mod listing;
pub mod record;
pub mod run_log;

pub use id::{JobId, RunId};
pub use listing::{ScrapedListing, SourceName, UnknownSource};
pub use record::{ImportStatus, JobRecord, NewJobRecord};
pub use run_log::{RunAction, RunLogEntry, RunSummary};
