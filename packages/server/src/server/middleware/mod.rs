// HTTP middleware
pub mod import_auth;

pub use import_auth::*;
