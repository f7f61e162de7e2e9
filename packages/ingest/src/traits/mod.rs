//! Collaborator interfaces.
//!
//! The pipeline never talks to the network, a database or a model API
//! directly. Each of those sits behind one of these traits so the
//! orchestrator can run against in-memory doubles.

pub mod classifier;
pub mod fetcher;
pub mod store;

pub use classifier::{ModelLabels, TextClassifier};
pub use fetcher::{FetchedPage, PageFetcher};
pub use store::ListingStore;
