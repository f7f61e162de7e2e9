//! Typed errors for the ingestion library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the server can map
//! each failure class to a response without string matching.

use thiserror::Error;

/// Errors that abort a whole import run.
///
/// Anything that happens after scraping has started is caught at the
/// listing boundary instead and never surfaces as an `IngestError`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Loading the previously known listings failed
    #[error("failed to load existing listings: {0}")]
    LoadExisting(#[source] StoreError),

    /// Writing the run-started log failed
    #[error("failed to open run log: {0}")]
    RunLog(#[source] StoreError),

    /// Invalid or missing configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request exceeded its timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The rendering service failed or returned an unusable body
    #[error("rendering service error: {0}")]
    Render(String),
}

impl CrawlError {
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            CrawlError::Timeout {
                url: url.to_string(),
            }
        } else {
            CrawlError::Http(Box::new(err))
        }
    }
}

/// Errors from the listing store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint on `(source_name, source_unique_id)` hit
    #[error("duplicate listing: {source_name}/{source_unique_id}")]
    Duplicate {
        source_name: String,
        source_unique_id: String,
    },

    /// Row does not exist
    #[error("listing not found: {0}")]
    NotFound(String),

    /// Backend failure
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from the external text classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Request could not be sent or returned an error status
    #[error("classifier request failed: {0}")]
    Request(String),

    /// Response did not match the expected JSON shape
    #[error("unparsable classifier response: {0}")]
    Parse(String),
}

/// Result type alias for run-level operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for fetch operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
