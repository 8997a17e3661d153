//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a browser-render fallback
//! - Same-site link discovery
//! - The breadth-first frontier
//! - Overall audit coordination

mod coordinator;
mod discover;
mod fetcher;
mod frontier;
mod render;

pub use coordinator::{run_audit, Auditor};
pub use discover::{discover, discover_in};
pub use fetcher::{build_http_client, looks_complete, FetchSource, FetchedPage, Fetcher};
pub use frontier::Frontier;
pub use render::BrowserRenderer;
