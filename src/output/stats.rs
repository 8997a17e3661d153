//! Site-wide statistics over an audit report
//!
//! This module aggregates per-page signals into counts for the terminal and
//! the markdown summary.

use crate::audit::AuditReport;
use crate::audit::percentage;
use crate::state::PageOutcome;
use std::collections::BTreeMap;

/// Audit statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteStatistics {
    /// Number of page reports
    pub total_pages: usize,

    /// Count of pages by outcome
    pub audited: usize,
    pub failed: usize,
    pub disallowed: usize,

    /// URLs left in the queue when a page limit stopped the crawl
    pub pending: usize,
    pub truncated: bool,

    pub total_words: usize,
    pub average_words: f64,

    pub missing_titles: usize,
    pub missing_descriptions: usize,
    pub missing_h1: usize,
    pub multiple_h1: usize,

    pub duplicate_titles: usize,
    pub duplicate_descriptions: usize,
    pub duplicate_content: usize,

    pub total_images: usize,
    pub images_without_alt: usize,
    pub broken_images: usize,
    pub broken_internal_links: usize,

    pub pages_with_structured_data: usize,
    pub noindex_pages: usize,

    /// Failure kind -> count
    pub failures_by_kind: BTreeMap<String, usize>,

    /// Depth -> page count
    pub depth_breakdown: BTreeMap<u32, usize>,
}

impl SiteStatistics {
    /// Aggregates the pages of `report`
    pub fn from_report(report: &AuditReport) -> Self {
        let mut stats = Self {
            total_pages: report.pages.len(),
            pending: report.pending,
            truncated: report.truncated,
            ..Self::default()
        };

        for page in &report.pages {
            *stats.depth_breakdown.entry(page.depth).or_default() += 1;

            match page.outcome {
                PageOutcome::Audited => stats.audited += 1,
                PageOutcome::FetchFailed => stats.failed += 1,
                PageOutcome::Disallowed => stats.disallowed += 1,
            }

            if let Some(error) = &page.error {
                *stats.failures_by_kind.entry(error.kind.clone()).or_default() += 1;
            }

            if page.outcome != PageOutcome::Audited {
                continue;
            }

            if page.title.as_ref().map_or(true, |t| t.text.is_empty()) {
                stats.missing_titles += 1;
            }
            if page.description.as_ref().map_or(true, |d| d.text.is_empty()) {
                stats.missing_descriptions += 1;
            }
            if let Some(headings) = &page.headings {
                match headings.h1_count {
                    0 => stats.missing_h1 += 1,
                    1 => {}
                    _ => stats.multiple_h1 += 1,
                }
            }

            stats.duplicate_titles += usize::from(page.duplicates.title);
            stats.duplicate_descriptions += usize::from(page.duplicates.description);
            stats.duplicate_content += usize::from(page.duplicates.content);

            if let Some(words) = &page.word_stats {
                stats.total_words += words.total_words;
            }
            if let Some(images) = &page.images {
                stats.total_images += images.total_images;
                stats.images_without_alt += images.images_without_alt;
                stats.broken_images += images.broken_images.len();
            }
            stats.broken_internal_links += page.internal_link_errors.len();

            if page.schema.as_ref().is_some_and(|s| s.has_structured_data) {
                stats.pages_with_structured_data += 1;
            }
            let noindex = page
                .robots
                .as_ref()
                .and_then(|r| r.meta_robots.as_deref())
                .is_some_and(|m| m.to_ascii_lowercase().contains("noindex"));
            if noindex {
                stats.noindex_pages += 1;
            }
        }

        if stats.audited > 0 {
            stats.average_words =
                (stats.total_words as f64 / stats.audited as f64 * 100.0).round() / 100.0;
        }

        stats
    }

    /// Share of crawled pages that were audited, as a percentage
    pub fn success_rate(&self) -> f64 {
        percentage(self.audited, self.total_pages)
    }

    /// Share of images carrying alt text, as a percentage
    pub fn alt_coverage(&self) -> f64 {
        percentage(
            self.total_images - self.images_without_alt,
            self.total_images,
        )
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SiteStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Overview:");
    println!("  Pages crawled: {}", stats.total_pages);
    println!("  Audited: {}", stats.audited);
    println!("  Failed: {}", stats.failed);
    println!("  Blocked by robots.txt: {}", stats.disallowed);
    if stats.truncated {
        println!("  Left unvisited (page limit): {}", stats.pending);
    }
    println!("  Average words per page: {:.2}", stats.average_words);
    println!();

    println!("On-page Issues:");
    println!("  Missing title: {}", stats.missing_titles);
    println!("  Missing description: {}", stats.missing_descriptions);
    println!("  Missing H1: {}", stats.missing_h1);
    println!("  Multiple H1: {}", stats.multiple_h1);
    println!("  Duplicate titles: {}", stats.duplicate_titles);
    println!("  Duplicate descriptions: {}", stats.duplicate_descriptions);
    println!("  Duplicate content: {}", stats.duplicate_content);
    println!(
        "  Images without alt: {} of {} ({:.1}% coverage)",
        stats.images_without_alt,
        stats.total_images,
        stats.alt_coverage()
    );
    println!("  Broken images: {}", stats.broken_images);
    println!("  Broken internal links: {}", stats.broken_internal_links);
    println!("  Noindex pages: {}", stats.noindex_pages);
    println!(
        "  Pages with structured data: {}",
        stats.pages_with_structured_data
    );
    println!();

    if !stats.failures_by_kind.is_empty() {
        println!("Failure Summary:");
        for (kind, count) in &stats.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages audited)",
        stats.success_rate(),
        stats.audited,
        stats.total_pages
    );
}
