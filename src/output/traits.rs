//! Output sink trait and errors
//!
//! A sink receives the finished audit report and writes it somewhere.

use crate::audit::AuditReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for a finished audit report
pub trait ReportSink {
    /// Short human-readable description of the destination
    fn describe(&self) -> String;

    /// Writes the report
    fn write_report(&self, report: &AuditReport) -> OutputResult<()>;
}
