//! Page audit module
//!
//! This module turns a fetched document into a [`PageReport`]:
//! - `extract`: synchronous on-page signals (title, headings, words, images, schema)
//! - `probe`: existence checks for internal links and image sources
//! - `tracker`: run-scoped duplicate detection
//! - `report`: the serializable report types

mod extract;
mod probe;
mod report;
mod tracker;

pub use extract::{
    content_hash, count_words, extract, extract_html, percentage, visible_text, PageAnalysis,
};
pub use probe::{probe_url, LinkProbe, Prober};
pub use report::{
    AuditReport, DuplicateFlags, HeadingSummary, HttpInfo, Hreflang, ImageSummary, LinkSummary,
    MetadataInfo, PageError, PageReport, RobotsSummary, SchemaSummary, TextSignal, WordStats,
};
pub use tracker::DuplicationTrackers;
