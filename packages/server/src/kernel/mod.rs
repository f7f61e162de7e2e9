// Infrastructure: pipeline wiring and background tasks
pub mod deps;
pub mod scheduled_tasks;

pub use deps::*;
pub use scheduled_tasks::*;
