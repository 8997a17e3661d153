//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the audit, including:
//! - Building the HTTP client with a browser-like user agent
//! - Direct GET requests with a bounded timeout
//! - Completeness checks on the direct response
//! - Falling back to the browser renderer
//! - Error classification

use crate::audit::visible_text;
use crate::config::FetcherConfig;
use crate::crawler::render::BrowserRenderer;
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("Failed to parse body selector - this is a bug")
});

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6")
        .expect("Failed to parse heading selector - this is a bug")
});

/// Which path produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Direct,
    Rendered,
}

/// A retrieved document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: Url,
    /// URL after redirects; the requested URL for rendered pages
    pub final_url: Url,
    /// Status of the direct response, `None` if the server never answered
    pub status_code: Option<u16>,
    pub body: String,
    pub source: FetchSource,
    pub elapsed: Duration,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use site_audit::config::FetcherConfig;
/// use site_audit::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a direct response body can be audited as-is
///
/// The body must reach `min_body_length` bytes, contain visible body text and
/// at least one heading element.
pub fn looks_complete(body: &str, min_body_length: usize) -> bool {
    if body.len() < min_body_length {
        return false;
    }

    let document = Html::parse_document(body);
    let has_text = document
        .select(&BODY_SELECTOR)
        .next()
        .is_some_and(|b| !visible_text(b).is_empty());

    has_text && document.select(&HEADING_SELECTOR).next().is_some()
}

/// Retrieves pages directly, falling back to a browser render when configured
///
/// | direct | render | result |
/// |--------|--------|--------|
/// | complete 2xx | not run | direct |
/// | incomplete 2xx | ok | rendered |
/// | incomplete 2xx | failed / not configured | direct |
/// | error | ok | rendered |
/// | error | failed | `FetchError::Exhausted` |
/// | error | not configured | the direct error |
///
/// There are no retries; each path is attempted once.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    renderer: Option<BrowserRenderer>,
    min_body_length: usize,
}

impl Fetcher {
    /// Creates a fetcher sharing `client`
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client built by [`build_http_client`]
    /// * `config` - Supplies the render command, its timeout and the
    ///   completeness threshold
    pub fn new(client: Client, config: &FetcherConfig) -> Self {
        let renderer = config.render_command.as_deref().and_then(|command| {
            BrowserRenderer::from_command(
                command,
                Duration::from_secs(config.render_timeout_secs),
            )
        });

        Self {
            client,
            renderer,
            min_body_length: config.min_body_length,
        }
    }

    /// Fetches `url`, which must be an absolute HTTP(S) URL
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The direct or rendered document
    /// * `Err(FetchError)` - The direct error when no renderer is configured,
    ///   or `FetchError::Exhausted` when both paths failed
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();

        let direct = self.fetch_direct(url).await;

        let Some(renderer) = &self.renderer else {
            return direct.map(|page| page.finished(started));
        };

        match direct {
            Ok(page) if looks_complete(&page.body, self.min_body_length) => {
                Ok(page.finished(started))
            }
            Ok(page) => {
                debug!("Direct response for {} looks incomplete, rendering", url);
                match renderer.render(url).await {
                    Ok(body) => Ok(FetchedPage {
                        body,
                        source: FetchSource::Rendered,
                        ..page
                    }
                    .finished(started)),
                    Err(e) => {
                        warn!("{}; keeping direct response", e);
                        Ok(page.finished(started))
                    }
                }
            }
            Err(direct_err) => {
                debug!("{}; trying browser render", direct_err);
                match renderer.render(url).await {
                    Ok(body) => Ok(FetchedPage {
                        requested_url: url.clone(),
                        final_url: url.clone(),
                        status_code: direct_err.status_code(),
                        body,
                        source: FetchSource::Rendered,
                        elapsed: started.elapsed(),
                    }),
                    Err(render_err) => Err(FetchError::Exhausted {
                        url: url.to_string(),
                        direct: Box::new(direct_err),
                        render: Box::new(render_err),
                    }),
                }
            }
        }
    }

    /// Performs the plain GET; non-2xx statuses are errors
    async fn fetch_direct(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, &e))?;

        Ok(FetchedPage {
            requested_url: url.clone(),
            final_url,
            status_code: Some(status.as_u16()),
            body,
            source: FetchSource::Direct,
            elapsed: started.elapsed(),
        })
    }
}

impl FetchedPage {
    fn finished(self, started: Instant) -> Self {
        Self {
            elapsed: started.elapsed(),
            ..self
        }
    }
}

/// Maps a reqwest error to a timeout or network failure
fn classify_error(url: &Url, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
