use serde::{Deserialize, Serialize};

/// Browser-like user agent sent with page requests and probes
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Main configuration structure for Site-Audit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Fixed delay between iterations (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Stop after this many page reports; `None` crawls until the queue drains
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: Option<usize>,

    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth", default)]
    pub max_depth: Option<u32>,

    /// Whether request URLs keep their query string
    #[serde(rename = "query-policy", default)]
    pub query_policy: QueryPolicy,

    /// Additional host patterns treated as part of the site (e.g. "*.example.com")
    #[serde(rename = "extra-domains", default)]
    pub extra_domains: Vec<String>,

    /// Skip pages disallowed by robots.txt and honor its Crawl-delay
    #[serde(rename = "respect-robots", default)]
    pub respect_robots: bool,
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout of the direct HTTP request (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bodies shorter than this are considered incomplete
    #[serde(rename = "min-body-length", default = "default_min_body_length")]
    pub min_body_length: usize,

    /// Browser command used as fallback renderer; the URL is appended as last argument
    #[serde(rename = "render-command", default)]
    pub render_command: Option<Vec<String>>,

    /// Timeout of the browser render (seconds)
    #[serde(rename = "render-timeout-secs", default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,
}

/// Signal extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub mode: ExtractionMode,

    /// Number of images per page checked for broken sources
    #[serde(rename = "image-probe-limit", default = "default_image_probe_limit")]
    pub image_probe_limit: usize,

    /// Probe every same-site link for error statuses
    #[serde(rename = "probe-internal-links", default = "default_true")]
    pub probe_internal_links: bool,

    /// Timeout of a single existence probe (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path of the JSON report; printed to stdout when unset
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,

    /// Path of the markdown summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// How much work the extractor performs per page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// On-page signals only, no network probes
    Light,
    /// On-page signals, metadata, robots.txt and existence probes
    #[default]
    Full,
}

/// Query string handling for discovered URLs
///
/// Visited keys never contain the query; this only decides what is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPolicy {
    #[default]
    Ignore,
    Preserve,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_pages: default_max_pages(),
            max_depth: None,
            query_policy: QueryPolicy::default(),
            extra_domains: Vec::new(),
            respect_robots: false,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            min_body_length: default_min_body_length(),
            render_command: None,
            render_timeout_secs: default_render_timeout_secs(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            image_probe_limit: default_image_probe_limit(),
            probe_internal_links: true,
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}

fn default_max_pages() -> Option<usize> {
    Some(500)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_body_length() -> usize {
    1024
}

fn default_render_timeout_secs() -> u64 {
    30
}

fn default_image_probe_limit() -> usize {
    10
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}
