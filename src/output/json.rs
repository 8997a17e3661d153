//! JSON report output
//!
//! The JSON document is the full [`AuditReport`], pretty-printed, so that a
//! downstream summarizer can consume it verbatim.

use crate::audit::AuditReport;
use crate::output::traits::{OutputError, OutputResult, ReportSink};
use std::io::Write;
use std::path::PathBuf;

/// Serializes the report as pretty-printed JSON
pub fn to_json_string(report: &AuditReport) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the JSON report to a file, or to stdout without a path
#[derive(Debug, Clone, Default)]
pub struct JsonOutput {
    path: Option<PathBuf>,
}

impl JsonOutput {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ReportSink for JsonOutput {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("JSON report {}", path.display()),
            None => "JSON report (stdout)".to_string(),
        }
    }

    fn write_report(&self, report: &AuditReport) -> OutputResult<()> {
        let json = to_json_string(report)?;

        match &self.path {
            Some(path) => std::fs::write(path, json).map_err(|source| OutputError::Write {
                path: path.display().to_string(),
                source,
            }),
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", json)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::sample_report;
    use tempfile::tempdir;

    #[test]
    fn test_json_contains_pages() {
        let report = sample_report();
        let json = to_json_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pages"].as_array().unwrap().len(), report.pages.len());
        assert_eq!(value["mode"], "full");
        assert_eq!(value["pages"][0]["title"]["text"], "Home");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.json");
        let output = JsonOutput::new(Some(path.clone()));

        output.write_report(&sample_report()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"start_url\""));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let output = JsonOutput::new(Some(dir.path().join("missing").join("audit.json")));
        let err = output.write_report(&sample_report()).unwrap_err();
        assert!(matches!(err, OutputError::Write { .. }));
    }
}
