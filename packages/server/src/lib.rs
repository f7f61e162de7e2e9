// Job import service - API core
//
// Exposes the ingest pipeline over HTTP: an authenticated trigger for
// import runs, a health check, and an optional cron schedule.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
