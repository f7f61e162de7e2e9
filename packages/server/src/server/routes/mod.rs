// HTTP routes
pub mod health;
pub mod import;

pub use health::*;
pub use import::*;
