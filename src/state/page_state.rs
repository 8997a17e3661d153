/// Per-page outcome definitions
///
/// Every entry of the report sequence carries exactly one outcome.
use serde::Serialize;
use std::fmt;

/// How a dequeued URL ended up in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    /// Page was fetched and its signals extracted
    Audited,

    /// Every fetch path failed; the report carries the error
    FetchFailed,

    /// robots.txt forbids the page and robots are respected
    Disallowed,
}

impl PageOutcome {
    /// Returns true if the page produced no signals because of a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed)
    }

    /// Returns true if the page was skipped without being fetched
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Disallowed)
    }

    /// String form used in reports and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audited => "audited",
            Self::FetchFailed => "fetch_failed",
            Self::Disallowed => "disallowed",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
