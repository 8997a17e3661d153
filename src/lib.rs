//! Site-Audit: a sequential SEO site crawler
//!
//! This crate crawls a single website breadth-first from a start URL and
//! produces one structured SEO report per page: metadata, headings, word
//! statistics, images, structured data, robots directives, broken internal
//! links and duplicate flags. The resulting report is JSON-serializable.

pub mod audit;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Reasons a page could not be retrieved
///
/// Fetch failures never abort a crawl; they are recorded on the page report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Browser render failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("All fetch paths failed for {url}: {direct}; {render}")]
    Exhausted {
        url: String,
        direct: Box<FetchError>,
        render: Box<FetchError>,
    },
}

impl FetchError {
    /// Short machine-readable label for the failure
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::Render { .. } => "render",
            Self::Exhausted { .. } => "exhausted",
        }
    }

    /// HTTP status of the direct request, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { direct, .. } => direct.status_code(),
            _ => None,
        }
    }
}

/// Result type alias for Site-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use audit::{AuditReport, PageReport};
pub use config::Config;
pub use crawler::{run_audit, Auditor};
pub use state::{PageOutcome, RunState};
pub use url::{normalize_key, CrawlTarget, SiteScope};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kind() {
        let err = FetchError::Timeout {
            url: "https://example.com/".to_string(),
        };
        assert_eq!(err.kind(), "timeout");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_exhausted_keeps_direct_status() {
        let err = FetchError::Exhausted {
            url: "https://example.com/".to_string(),
            direct: Box::new(FetchError::Status {
                url: "https://example.com/".to_string(),
                status: 503,
            }),
            render: Box::new(FetchError::Render {
                url: "https://example.com/".to_string(),
                message: "exit status 1".to_string(),
            }),
        };
        assert_eq!(err.kind(), "exhausted");
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains("HTTP 503"));
    }
}
