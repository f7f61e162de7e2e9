//! The import run and the state it threads through.

pub mod budget;
pub mod lifecycle;
pub mod orchestrator;

pub use budget::{Clock, RunBudget, SystemClock};
pub use orchestrator::Orchestrator;
