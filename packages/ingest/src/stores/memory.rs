//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::ListingStore;
use crate::types::{JobId, JobRecord, NewJobRecord, RunAction, RunLogEntry, SourceName};

/// In-memory listings and run log.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    listings: RwLock<HashMap<JobId, JobRecord>>,
    logs: RwLock<Vec<RunLogEntry>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if an earlier run had stored it.
    pub fn with_record(self, record: JobRecord) -> Self {
        self.listings.write().unwrap().insert(record.id, record);
        self
    }

    /// Make every call fail with a backend error, like a dropped connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All listings, ordered by source and unique id.
    pub fn listings(&self) -> Vec<JobRecord> {
        let mut all: Vec<_> = self.listings.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| {
            (a.source_name, &a.source_unique_id).cmp(&(b.source_name, &b.source_unique_id))
        });
        all
    }

    pub fn listing_by_unique_id(&self, source: SourceName, source_unique_id: &str) -> Option<JobRecord> {
        self.listings
            .read()
            .unwrap()
            .values()
            .find(|r| r.source_name == source && r.source_unique_id == source_unique_id)
            .cloned()
    }

    /// Run log in append order.
    pub fn logs(&self) -> Vec<RunLogEntry> {
        self.logs.read().unwrap().clone()
    }

    pub fn logs_with_action(&self, action: RunAction) -> Vec<RunLogEntry> {
        self.logs().into_iter().filter(|e| e.action == action).collect()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "memory store marked unavailable",
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn find_by_sources(&self, sources: &[SourceName]) -> StoreResult<Vec<JobRecord>> {
        self.check_available()?;
        Ok(self
            .listings
            .read()
            .unwrap()
            .values()
            .filter(|r| sources.contains(&r.source_name))
            .cloned()
            .collect())
    }

    async fn find_published_by_apply_url(&self, apply_url: &str) -> StoreResult<Option<JobRecord>> {
        self.check_available()?;
        Ok(self
            .listings
            .read()
            .unwrap()
            .values()
            .find(|r| r.is_published && r.apply_url == apply_url)
            .cloned())
    }

    async fn insert_listing(&self, listing: NewJobRecord) -> StoreResult<JobRecord> {
        self.check_available()?;
        let mut listings = self.listings.write().unwrap();
        let taken = listings.values().any(|r| {
            r.source_name == listing.source_name && r.source_unique_id == listing.source_unique_id
        });
        if taken {
            return Err(StoreError::Duplicate {
                source_name: listing.source_name.to_string(),
                source_unique_id: listing.source_unique_id,
            });
        }

        let record = listing.into_record(JobId::new());
        listings.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_listing(&self, record: &JobRecord) -> StoreResult<()> {
        self.check_available()?;
        let mut listings = self.listings.write().unwrap();
        let stored = listings
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.to_string()))?;
        // Publication is owned by editors, not by imports.
        let is_published = stored.is_published;
        *stored = record.clone();
        stored.is_published = is_published;
        Ok(())
    }

    async fn append_log(&self, entry: RunLogEntry) -> StoreResult<()> {
        self.check_available()?;
        self.logs.write().unwrap().push(entry);
        Ok(())
    }

    async fn last_import_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        self.check_available()?;
        Ok(self
            .listings
            .read()
            .unwrap()
            .values()
            .map(|r| r.imported_at)
            .max())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn get_listing(&self, id: JobId) -> StoreResult<Option<JobRecord>> {
        self.check_available()?;
        Ok(self.listings.read().unwrap().get(&id).cloned())
    }
}
