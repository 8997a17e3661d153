//! Report types produced by an audit run
//!
//! Every type here serializes to JSON with snake_case keys; the whole
//! [`AuditReport`] is the document handed to downstream summarizers.

use crate::audit::extract::PageAnalysis;
use crate::audit::probe::LinkProbe;
use crate::config::ExtractionMode;
use crate::crawler::{FetchSource, FetchedPage};
use crate::state::PageOutcome;
use crate::url::CrawlTarget;
use crate::FetchError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of one audit run
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub start_url: String,
    pub mode: ExtractionMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// True when `max-pages` stopped the crawl before the queue drained
    pub truncated: bool,
    /// URLs still queued when the crawl stopped
    pub pending: usize,
    pub pages: Vec<PageReport>,
}

impl AuditReport {
    /// Pages whose fetch failed
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.pages.iter().filter(|p| p.outcome.is_error())
    }

    pub fn audited_pages(&self) -> impl Iterator<Item = &PageReport> {
        self.pages
            .iter()
            .filter(|p| p.outcome == PageOutcome::Audited)
    }
}

/// Signals of a single crawled URL
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: String,
    pub normalized_url: String,
    pub depth: u32,
    pub outcome: PageOutcome,
    pub crawled_at: DateTime<Utc>,
    pub http: Option<HttpInfo>,
    pub title: Option<TextSignal>,
    pub description: Option<TextSignal>,
    pub metadata: Option<MetadataInfo>,
    pub headings: Option<HeadingSummary>,
    pub word_stats: Option<WordStats>,
    pub links: Option<LinkSummary>,
    pub images: Option<ImageSummary>,
    pub schema: Option<SchemaSummary>,
    pub robots: Option<RobotsSummary>,
    pub internal_link_errors: Vec<LinkProbe>,
    pub duplicates: DuplicateFlags,
    pub content_hash: Option<String>,
    pub discovered_links: usize,
    pub error: Option<PageError>,
}

impl PageReport {
    fn empty(target: &CrawlTarget, outcome: PageOutcome) -> Self {
        Self {
            url: target.url.to_string(),
            normalized_url: target.key.clone(),
            depth: target.depth,
            outcome,
            crawled_at: Utc::now(),
            http: None,
            title: None,
            description: None,
            metadata: None,
            headings: None,
            word_stats: None,
            links: None,
            images: None,
            schema: None,
            robots: None,
            internal_link_errors: Vec::new(),
            duplicates: DuplicateFlags::default(),
            content_hash: None,
            discovered_links: 0,
            error: None,
        }
    }

    /// Report of a URL whose fetch failed on every path
    pub fn failed(target: &CrawlTarget, error: &FetchError) -> Self {
        let mut report = Self::empty(target, PageOutcome::FetchFailed);
        report.error = Some(PageError::from(error));
        report
    }

    /// Report of a URL skipped because robots.txt forbids it
    pub fn disallowed(target: &CrawlTarget, robots: RobotsSummary) -> Self {
        let mut report = Self::empty(target, PageOutcome::Disallowed);
        report.robots = Some(robots);
        report
    }

    /// Report of a fetched page
    ///
    /// Probe results and the robots summary are filled in by the caller.
    pub fn audited(target: &CrawlTarget, page: &FetchedPage, analysis: PageAnalysis) -> Self {
        let mut report = Self::empty(target, PageOutcome::Audited);
        report.http = Some(HttpInfo::from(page));
        report.title = Some(analysis.title);
        report.description = Some(analysis.description);
        report.metadata = analysis.metadata;
        report.headings = Some(analysis.headings);
        report.word_stats = Some(analysis.word_stats);
        report.links = Some(analysis.links);
        report.images = Some(analysis.images);
        report.schema = analysis.schema;
        report.duplicates = analysis.duplicates;
        report.content_hash = Some(analysis.content_hash);
        report
    }

    /// Title text, or "" when the page had none
    pub fn title_text(&self) -> &str {
        self.title.as_ref().map(|t| t.text.as_str()).unwrap_or_default()
    }
}

/// Transport facts about the fetched page
#[derive(Debug, Clone, Serialize)]
pub struct HttpInfo {
    /// Status of the direct response, `None` if only the browser render answered
    pub status: Option<u16>,
    pub final_url: String,
    pub using_https: bool,
    pub response_time_ms: u64,
    pub source: FetchSource,
}

impl From<&FetchedPage> for HttpInfo {
    fn from(page: &FetchedPage) -> Self {
        Self {
            status: page.status_code,
            final_url: page.final_url.to_string(),
            using_https: page.final_url.scheme() == "https",
            response_time_ms: page.elapsed.as_millis() as u64,
            source: page.source,
        }
    }
}

/// A title or meta description
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextSignal {
    pub found: bool,
    pub text: String,
    /// Length in characters
    pub length: usize,
    pub words: usize,
    pub chars_per_word: f64,
    /// Number of matching tags on the page
    pub tag_count: usize,
}

/// Head metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataInfo {
    pub charset: Option<String>,
    pub canonical: Option<String>,
    pub favicon: Option<String>,
    pub viewport: Option<String>,
    pub keywords: Option<String>,
    pub locale: Option<String>,
    pub content_type: Option<String>,
    pub site_name: Option<String>,
    pub site_image: Option<String>,
    pub hreflangs: Vec<Hreflang>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hreflang {
    pub language: String,
    pub url: String,
}

/// Heading counts per level
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadingSummary {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
    pub h1_count: usize,
    /// Text of the first H1, "" if none
    pub h1_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WordStats {
    pub total_words: usize,
    pub anchor_words: usize,
    /// Anchor words as a percentage of all words
    pub anchor_ratio: f64,
    pub text_length: usize,
    pub html_length: usize,
    /// Visible text length as a percentage of the HTML length
    pub text_to_html_ratio: f64,
}

/// Anchor counts of a page
///
/// `total` is always `internal + external + non_crawlable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSummary {
    /// Anchors carrying an `href`
    pub total: usize,
    pub internal: usize,
    pub external: usize,
    /// Fragment-only, `mailto:`, `tel:`, `javascript:` and other non-HTTP targets
    pub non_crawlable: usize,
    pub nofollow: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageSummary {
    pub total_images: usize,
    pub images_without_alt: usize,
    pub images_without_src: usize,
    /// Percentage of images carrying a non-blank alt
    pub alt_coverage: f64,
    /// Number of image sources checked for reachability
    pub probed: usize,
    pub broken_images: Vec<LinkProbe>,
}

/// Structured data found on the page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaSummary {
    pub has_structured_data: bool,
    pub json_ld_count: usize,
    pub json_ld_types: Vec<String>,
    pub microdata_count: usize,
    pub microdata_types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RobotsSummary {
    /// Whether the site serves a robots.txt
    pub robots_txt_found: bool,
    pub disallow: Vec<String>,
    /// Whether robots.txt allows the crawler to fetch this page
    pub page_allowed: bool,
    /// Content of `<meta name="robots">`
    pub meta_robots: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateFlags {
    pub title: bool,
    pub description: bool,
    pub content: bool,
}

impl DuplicateFlags {
    pub fn any(&self) -> bool {
        self.title || self.description || self.content
    }
}

/// Why a page produced no signals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageError {
    pub kind: String,
    pub message: String,
    pub status: Option<u16>,
}

impl From<&FetchError> for PageError {
    fn from(error: &FetchError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
            status: error.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryPolicy;
    use url::Url;

    fn target() -> CrawlTarget {
        let url = Url::parse("https://example.com/about/").unwrap();
        CrawlTarget::new(&url, 1, QueryPolicy::Ignore)
    }

    #[test]
    fn test_failed_report_carries_error() {
        let error = FetchError::Status {
            url: "https://example.com/about/".to_string(),
            status: 500,
        };
        let report = PageReport::failed(&target(), &error);

        assert_eq!(report.outcome, PageOutcome::FetchFailed);
        assert_eq!(report.normalized_url, "https://example.com/about");
        let err = report.error.unwrap();
        assert_eq!(err.kind, "http_status");
        assert_eq!(err.status, Some(500));
        assert!(report.title.is_none());
    }

    #[test]
    fn test_report_serializes_signal_keys() {
        let report = PageReport::failed(
            &target(),
            &FetchError::Timeout {
                url: "https://example.com/about/".to_string(),
            },
        );
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "url",
            "normalized_url",
            "depth",
            "outcome",
            "title",
            "description",
            "headings",
            "word_stats",
            "images",
            "schema",
            "robots",
            "internal_link_errors",
            "duplicates",
            "error",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
        assert_eq!(value["outcome"], "fetch_failed");
        assert_eq!(value["error"]["kind"], "timeout");
    }

    #[test]
    fn test_duplicate_flags_any() {
        assert!(!DuplicateFlags::default().any());
        let flags = DuplicateFlags {
            content: true,
            ..Default::default()
        };
        assert!(flags.any());
    }
}
