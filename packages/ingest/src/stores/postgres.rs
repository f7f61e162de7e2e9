//! PostgreSQL storage implementation.
//!
//! Tables `job_listings` and `job_import_logs` are created by the server's
//! migrations. All SQL of the pipeline lives in this file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ListingStore;
use crate::types::{ImportStatus, JobId, JobRecord, NewJobRecord, RunLogEntry, SourceName};

const LISTING_COLUMNS: &str = "id, title, hospital_name, location, department, tags, description, \
    apply_url, source_url, source_name, source_unique_id, content_hash, import_status, \
    is_published, imported_at, last_seen_at";

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool, e.g. the server's.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(Box::new(e))
}

fn corrupt(message: String) -> StoreError {
    StoreError::Backend(message.into())
}

#[derive(FromRow)]
struct ListingRow {
    id: JobId,
    title: String,
    hospital_name: String,
    location: String,
    department: Option<String>,
    tags: Vec<String>,
    description: String,
    apply_url: String,
    source_url: String,
    source_name: String,
    source_unique_id: String,
    content_hash: String,
    import_status: String,
    is_published: bool,
    imported_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for JobRecord {
    type Error = StoreError;

    fn try_from(row: ListingRow) -> StoreResult<Self> {
        let source_name: SourceName = row
            .source_name
            .parse()
            .map_err(|e| corrupt(format!("job_listings.source_name: {}", e)))?;
        let import_status: ImportStatus = row
            .import_status
            .parse()
            .map_err(|e| corrupt(format!("job_listings.import_status: {}", e)))?;

        Ok(JobRecord {
            id: row.id,
            title: row.title,
            hospital_name: row.hospital_name,
            location: row.location,
            department: row.department,
            tags: row.tags.into_iter().collect(),
            description: row.description,
            apply_url: row.apply_url,
            source_url: row.source_url,
            source_name,
            source_unique_id: row.source_unique_id,
            content_hash: row.content_hash,
            import_status,
            is_published: row.is_published,
            imported_at: row.imported_at,
            last_seen_at: row.last_seen_at,
        })
    }
}

fn into_records(rows: Vec<ListingRow>) -> StoreResult<Vec<JobRecord>> {
    rows.into_iter().map(JobRecord::try_from).collect()
}

#[async_trait]
impl ListingStore for PostgresStore {
    async fn find_by_sources(&self, sources: &[SourceName]) -> StoreResult<Vec<JobRecord>> {
        let names: Vec<&str> = sources.iter().map(SourceName::as_str).collect();
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM job_listings WHERE source_name = ANY($1)",
            LISTING_COLUMNS
        ))
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        into_records(rows)
    }

    async fn find_published_by_apply_url(&self, apply_url: &str) -> StoreResult<Option<JobRecord>> {
        sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM job_listings WHERE is_published AND apply_url = $1 LIMIT 1",
            LISTING_COLUMNS
        ))
        .bind(apply_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(JobRecord::try_from)
        .transpose()
    }

    async fn insert_listing(&self, listing: NewJobRecord) -> StoreResult<JobRecord> {
        let id = JobId::new();
        let tags: Vec<&str> = listing.tags.iter().map(String::as_str).collect();

        let inserted: Option<(JobId,)> = sqlx::query_as(
            r#"
            INSERT INTO job_listings (
                id, title, hospital_name, location, department, tags, description,
                apply_url, source_url, source_name, source_unique_id, content_hash,
                import_status, is_published, imported_at, last_seen_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, FALSE, $14, $14)
            ON CONFLICT (source_name, source_unique_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&listing.title)
        .bind(&listing.hospital_name)
        .bind(&listing.location)
        .bind(&listing.department)
        .bind(&tags)
        .bind(&listing.description)
        .bind(&listing.apply_url)
        .bind(&listing.source_url)
        .bind(listing.source_name.as_str())
        .bind(&listing.source_unique_id)
        .bind(&listing.content_hash)
        .bind(listing.import_status.as_str())
        .bind(listing.seen_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if inserted.is_none() {
            debug!(
                source = %listing.source_name,
                id = %listing.source_unique_id,
                "Insert hit unique constraint"
            );
            return Err(StoreError::Duplicate {
                source_name: listing.source_name.to_string(),
                source_unique_id: listing.source_unique_id,
            });
        }
        Ok(listing.into_record(id))
    }

    async fn update_listing(&self, record: &JobRecord) -> StoreResult<()> {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        let result = sqlx::query(
            r#"
            UPDATE job_listings SET
                title = $2, hospital_name = $3, location = $4, department = $5, tags = $6,
                description = $7, apply_url = $8, source_url = $9, content_hash = $10,
                import_status = $11, last_seen_at = $12
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.hospital_name)
        .bind(&record.location)
        .bind(&record.department)
        .bind(&tags)
        .bind(&record.description)
        .bind(&record.apply_url)
        .bind(&record.source_url)
        .bind(&record.content_hash)
        .bind(record.import_status.as_str())
        .bind(record.last_seen_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    async fn append_log(&self, entry: RunLogEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO job_import_logs (run_id, action, source_unique_id, job_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.run_id)
        .bind(entry.action.as_str())
        .bind(&entry.source_unique_id)
        .bind(entry.job_id)
        .bind(serde_json::Value::Object(entry.details))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn last_import_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let row: (Option<DateTime<Utc>>,) = sqlx::query_as("SELECT MAX(imported_at) FROM job_listings")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn get_listing(&self, id: JobId) -> StoreResult<Option<JobRecord>> {
        sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM job_listings WHERE id = $1",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .map(JobRecord::try_from)
        .transpose()
    }
}
