//! Job-listing ingestion and deduplication pipeline.
//!
//! Scrapes hospital job boards, turns their result pages into listings,
//! decides per listing whether it is new, changed or unchanged, resolves
//! the employer's own application URL, enriches location and department,
//! and retires listings that disappeared from their board.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ingest::{HttpFetcher, IngestConfig, MemoryStore, Orchestrator, SourceName};
//!
//! let config = IngestConfig::default();
//! let fetcher = Arc::new(HttpFetcher::new(&config)?);
//! let orchestrator = Orchestrator::new(Arc::new(MemoryStore::new()), fetcher, config);
//!
//! let summary = orchestrator.run(&[SourceName::Medijobs]).await?;
//! println!("{} imported, {} updated", summary.imported, summary.updated);
//! ```
//!
//! # Modules
//!
//! - [`extractors`] - Per-source HTML extraction
//! - [`location`] - Region enrichment of free-text locations
//! - [`links`] - Employer application URL resolution
//! - [`classify`] - Department and tag classification
//! - [`crawler`] - Paginated crawling of one source
//! - [`pipeline`] - The import run and listing lifecycle
//! - [`traits`] - Store, fetcher and classifier interfaces
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`fetch`] - HTTP and rendering-service fetchers
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod links;
pub mod location;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use classify::{Classification, ClassificationSignal, Classifier, OpenAiClassifier};
pub use config::IngestConfig;
pub use crawler::{CrawlOutcome, SourceCrawler, StopReason};
pub use error::{ClassifierError, CrawlError, IngestError, StoreError};
pub use fetch::{HttpFetcher, RenderingFetcher};
pub use links::{EmployerLinkResolver, LinkResolution, UnresolvedReason};
pub use location::{Gazetteer, LocationResolver};
pub use pipeline::{Clock, Orchestrator, RunBudget, SystemClock};
pub use traits::{FetchedPage, ListingStore, ModelLabels, PageFetcher, TextClassifier};
pub use types::{
    ImportStatus, JobId, JobRecord, NewJobRecord, RunAction, RunId, RunLogEntry, RunSummary,
    ScrapedListing, SourceName, UnknownSource,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
