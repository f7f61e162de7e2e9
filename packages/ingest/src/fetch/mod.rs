//! [`PageFetcher`](crate::traits::PageFetcher) implementations.

pub mod http;
pub mod render;

pub use http::HttpFetcher;
pub use render::RenderingFetcher;
