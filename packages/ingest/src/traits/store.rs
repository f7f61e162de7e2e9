//! Listing persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{JobId, JobRecord, NewJobRecord, RunLogEntry, SourceName};

/// The store behind the listings table and the append-only run log.
///
/// Writes are keyed by `(source_name, source_unique_id)` or by id, so a
/// second concurrent run cannot corrupt rows. Preventing concurrent runs
/// is the caller's job.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Every known listing of the given sources, in any state.
    async fn find_by_sources(&self, sources: &[SourceName]) -> StoreResult<Vec<JobRecord>>;

    /// A published listing with exactly this apply URL, if any.
    async fn find_published_by_apply_url(&self, apply_url: &str) -> StoreResult<Option<JobRecord>>;

    /// Insert a new listing.
    ///
    /// Returns `StoreError::Duplicate` when the source already has a row
    /// with the same unique id.
    async fn insert_listing(&self, listing: NewJobRecord) -> StoreResult<JobRecord>;

    /// Overwrite the mutable fields of an existing listing.
    async fn update_listing(&self, record: &JobRecord) -> StoreResult<()>;

    async fn append_log(&self, entry: RunLogEntry) -> StoreResult<()>;

    /// Creation time of the newest imported listing, for the run cooldown.
    async fn last_import_at(&self) -> StoreResult<Option<DateTime<Utc>>>;

    /// Cheap connectivity check.
    async fn ping(&self) -> StoreResult<()>;

    async fn get_listing(&self, id: JobId) -> StoreResult<Option<JobRecord>>;
}
