//! Markdown summary generation
//!
//! This module renders a human-readable issue summary of an audit report:
//! run information, site statistics, and one table per kind of issue.

use crate::audit::{AuditReport, PageReport};
use crate::output::stats::SiteStatistics;
use crate::output::traits::{OutputError, OutputResult, ReportSink};
use crate::state::PageOutcome;
use std::fs;
use std::path::PathBuf;

/// Writes the markdown summary of a report to a file
#[derive(Debug, Clone)]
pub struct MarkdownOutput {
    path: PathBuf,
}

impl MarkdownOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MarkdownOutput {
    fn describe(&self) -> String {
        format!("markdown summary at {}", self.path.display())
    }

    fn write_report(&self, report: &AuditReport) -> OutputResult<()> {
        let markdown = format_markdown_summary(report);
        fs::write(&self.path, markdown).map_err(|source| OutputError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Formats an audit report as markdown
pub fn format_markdown_summary(report: &AuditReport) -> String {
    let stats = SiteStatistics::from_report(report);
    let mut md = String::new();

    md.push_str("# Site Audit Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", report.start_url));
    md.push_str(&format!("- **Mode**: {:?}\n", report.mode));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.duration_ms as f64 / 1000.0
    ));
    if report.truncated {
        md.push_str(&format!(
            "- **Truncated**: page limit reached with {} URLs unvisited\n",
            report.pending
        ));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Audited**: {}\n", stats.audited));
    md.push_str(&format!("- **Failed**: {}\n", stats.failed));
    md.push_str(&format!("- **Blocked by robots.txt**: {}\n", stats.disallowed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        stats.success_rate()
    ));
    md.push_str(&format!(
        "- **Average Words per Page**: {:.2}\n\n",
        stats.average_words
    ));

    if !stats.depth_breakdown.is_empty() {
        md.push_str("## Pages by Depth\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    let failed: Vec<&PageReport> = report.failed_pages().collect();
    if !failed.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Kind | Status | Message |\n");
        md.push_str("|-----|------|--------|---------|\n");
        for page in failed {
            if let Some(error) = &page.error {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    page.url,
                    error.kind,
                    error.status.map(|s| s.to_string()).unwrap_or_default(),
                    escape_cell(&error.message)
                ));
            }
        }
        md.push('\n');
    }

    let blocked: Vec<&PageReport> = report
        .pages
        .iter()
        .filter(|p| p.outcome == PageOutcome::Disallowed)
        .collect();
    if !blocked.is_empty() {
        md.push_str("## Blocked by robots.txt\n\n");
        for page in blocked {
            md.push_str(&format!("- {}\n", page.url));
        }
        md.push('\n');
    }

    let mut issues = String::new();
    for page in report.audited_pages() {
        for issue in page_issues(page) {
            issues.push_str(&format!("| {} | {} |\n", page.url, escape_cell(&issue)));
        }
    }
    if !issues.is_empty() {
        md.push_str("## On-page Issues\n\n");
        md.push_str("| URL | Issue |\n");
        md.push_str("|-----|-------|\n");
        md.push_str(&issues);
        md.push('\n');
    }

    let mut broken = String::new();
    for page in report.audited_pages() {
        let images = page.images.iter().flat_map(|i| i.broken_images.iter());
        for probe in images {
            broken.push_str(&format!(
                "| {} | image | {} | {} |\n",
                page.url,
                probe.url,
                probe_outcome(probe.status, probe.error.as_deref())
            ));
        }
        for probe in &page.internal_link_errors {
            broken.push_str(&format!(
                "| {} | link | {} | {} |\n",
                page.url,
                probe.url,
                probe_outcome(probe.status, probe.error.as_deref())
            ));
        }
    }
    if !broken.is_empty() {
        md.push_str("## Broken Resources\n\n");
        md.push_str("| Page | Type | Target | Result |\n");
        md.push_str("|------|------|--------|--------|\n");
        md.push_str(&broken);
        md.push('\n');
    }

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Generated by site-audit at {}*\n",
        chrono::Utc::now().to_rfc3339()
    ));

    md
}

/// Lists the on-page problems of an audited page
fn page_issues(page: &PageReport) -> Vec<String> {
    let mut issues = Vec::new();

    match &page.title {
        Some(title) if title.found && !title.text.is_empty() => {
            if title.tag_count > 1 {
                issues.push(format!("{} title tags", title.tag_count));
            }
        }
        _ => issues.push("Missing title".to_string()),
    }
    if !page.description.as_ref().is_some_and(|d| d.found && !d.text.is_empty()) {
        issues.push("Missing meta description".to_string());
    }
    if let Some(headings) = &page.headings {
        match headings.h1_count {
            0 => issues.push("Missing H1".to_string()),
            1 => {}
            n => issues.push(format!("{} H1 headings", n)),
        }
    }
    if page.duplicates.title {
        issues.push(format!("Duplicate title \"{}\"", page.title_text()));
    }
    if page.duplicates.description {
        issues.push("Duplicate meta description".to_string());
    }
    if page.duplicates.content {
        issues.push("Duplicate content".to_string());
    }
    if let Some(images) = &page.images {
        if images.images_without_alt > 0 {
            issues.push(format!(
                "{} of {} images without alt",
                images.images_without_alt, images.total_images
            ));
        }
    }

    issues
}

fn probe_outcome(status: Option<u16>, error: Option<&str>) -> String {
    match (status, error) {
        (_, Some(error)) => error.to_string(),
        (Some(status), None) => format!("HTTP {}", status),
        (None, None) => "unknown".to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
