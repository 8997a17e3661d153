//! Output module for audit reports
//!
//! This module handles:
//! - Writing the JSON report to a file or stdout
//! - Generating the markdown issue summary
//! - Computing and printing site-wide statistics

mod json;
mod markdown;
pub mod stats;
mod traits;

pub use json::{to_json_string, JsonOutput};
pub use markdown::{format_markdown_summary, MarkdownOutput};
pub use stats::{print_statistics, SiteStatistics};
pub use traits::{OutputError, OutputResult, ReportSink};

use crate::audit::AuditReport;
use crate::config::OutputConfig;
use std::path::PathBuf;
use tracing::info;

/// Builds the sinks configured in `[output]`
///
/// The JSON report is always produced; the markdown summary only when a
/// path is configured.
pub fn configured_sinks(config: &OutputConfig) -> Vec<Box<dyn ReportSink>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(JsonOutput::new(
        config.json_path.as_ref().map(PathBuf::from),
    ))];

    if let Some(path) = &config.summary_path {
        sinks.push(Box::new(MarkdownOutput::new(path)));
    }

    sinks
}

/// Writes the report to every configured sink, stopping at the first failure
pub fn write_outputs(report: &AuditReport, config: &OutputConfig) -> OutputResult<()> {
    for sink in configured_sinks(config) {
        sink.write_report(report)?;
        info!("Wrote {}", sink.describe());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::audit::{
        AuditReport, DuplicateFlags, HeadingSummary, ImageSummary, PageReport, TextSignal,
        WordStats,
    };
    use crate::config::{ExtractionMode, QueryPolicy};
    use crate::state::PageOutcome;
    use crate::url::CrawlTarget;
    use crate::FetchError;
    use chrono::Utc;
    use url::Url;

    fn audited(url: &str, depth: u32, title: &str, h1_count: usize) -> PageReport {
        let target = CrawlTarget::new(&Url::parse(url).unwrap(), depth, QueryPolicy::Ignore);
        let mut page = PageReport::failed(
            &target,
            &FetchError::Timeout {
                url: url.to_string(),
            },
        );
        page.outcome = PageOutcome::Audited;
        page.error = None;
        page.title = Some(TextSignal {
            found: true,
            text: title.to_string(),
            length: title.chars().count(),
            words: 1,
            chars_per_word: title.chars().count() as f64,
            tag_count: 1,
        });
        page.description = Some(TextSignal::default());
        page.headings = Some(HeadingSummary {
            h1: h1_count,
            h1_count,
            ..HeadingSummary::default()
        });
        page.word_stats = Some(WordStats {
            total_words: 100,
            ..WordStats::default()
        });
        page.images = Some(ImageSummary::default());
        page
    }

    /// Three pages: the home page, a page repeating its title, and a 500
    pub fn sample_report() -> AuditReport {
        let mut home = audited("https://example.com/", 0, "Home", 1);
        home.images = Some(ImageSummary {
            total_images: 2,
            images_without_alt: 1,
            alt_coverage: 50.0,
            ..ImageSummary::default()
        });

        let mut about = audited("https://example.com/about", 1, "Home", 0);
        about.duplicates = DuplicateFlags {
            title: true,
            ..DuplicateFlags::default()
        };

        let broken_url = Url::parse("https://example.com/broken").unwrap();
        let broken = PageReport::failed(
            &CrawlTarget::new(&broken_url, 1, QueryPolicy::Ignore),
            &FetchError::Status {
                url: broken_url.to_string(),
                status: 500,
            },
        );

        AuditReport {
            start_url: "https://example.com/".to_string(),
            mode: ExtractionMode::Full,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration_ms: 1200,
            truncated: false,
            pending: 0,
            pages: vec![home, about, broken],
        }
    }
}
