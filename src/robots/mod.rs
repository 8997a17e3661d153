//! Robots.txt handling module
//!
//! This module fetches and parses the robots.txt file at a site root. A missing
//! file or a failed fetch is reported as "not found", never as an error.

mod parser;

pub use parser::{robots_agent, ParsedRobots};

use reqwest::Client;
use tracing::debug;
use url::Url;

/// Returns the robots.txt URL for the host of `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// Fetches robots.txt for the host of `url`
///
/// # Returns
///
/// * `Some(ParsedRobots)` - the file was served with a success status
/// * `None` - absent, non-success status, or network failure
pub async fn fetch_robots(client: &Client, url: &Url) -> Option<ParsedRobots> {
    let robots_url = robots_url(url)?;

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("robots.txt fetch failed for {}: {}", robots_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        debug!(
            "robots.txt not found at {} (HTTP {})",
            robots_url,
            response.status().as_u16()
        );
        return None;
    }

    match response.text().await {
        Ok(body) => Some(ParsedRobots::from_content(&body)),
        Err(e) => {
            debug!("robots.txt body unreadable at {}: {}", robots_url, e);
            None
        }
    }
}
