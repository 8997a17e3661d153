//! Existence probes for links and images
//!
//! A probe only checks reachability: HEAD first, GET when the server refuses
//! HEAD. The body is never read.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Outcome of probing a single URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkProbe {
    pub url: String,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl LinkProbe {
    /// Returns true for an error status (>= 400) or a failed request
    pub fn is_broken(&self) -> bool {
        self.error.is_some() || self.status.is_some_and(|s| s >= 400)
    }
}

/// Probes `url` with a bounded timeout
///
/// Sends a HEAD request and retries with GET when the server answers 405 or
/// 501.
///
/// # Returns
///
/// A [`LinkProbe`] carrying the final status, or the error message when no
/// response arrived. Never fails.
pub async fn probe_url(client: &Client, url: &Url, timeout: Duration) -> LinkProbe {
    let result = match send_probe(client, url, timeout, true).await {
        Ok(status)
            if status == StatusCode::METHOD_NOT_ALLOWED
                || status == StatusCode::NOT_IMPLEMENTED =>
        {
            send_probe(client, url, timeout, false).await
        }
        other => other,
    };

    let probe = match result {
        Ok(status) => LinkProbe {
            url: url.to_string(),
            status: Some(status.as_u16()),
            error: None,
        },
        Err(e) => LinkProbe {
            url: url.to_string(),
            status: None,
            error: Some(describe(&e)),
        },
    };

    trace!("Probed {}: {:?} {:?}", probe.url, probe.status, probe.error);
    probe
}

/// Probes URLs at most once per run
#[derive(Debug)]
pub struct Prober {
    client: Client,
    timeout: Duration,
    results: HashMap<String, LinkProbe>,
}

impl Prober {
    /// Creates a prober with an empty result cache
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client shared with the fetcher
    /// * `timeout` - Timeout of each probe
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            results: HashMap::new(),
        }
    }

    /// Probes `url`, or returns the result recorded earlier in the run
    pub async fn probe(&mut self, url: &Url) -> LinkProbe {
        if let Some(cached) = self.results.get(url.as_str()) {
            return cached.clone();
        }

        let result = probe_url(&self.client, url, self.timeout).await;
        self.results.insert(url.to_string(), result.clone());
        result
    }

    /// Probes each URL in order and keeps the broken ones
    pub async fn broken(&mut self, urls: &[Url]) -> Vec<LinkProbe> {
        let mut broken = Vec::new();
        for url in urls {
            let result = self.probe(url).await;
            if result.is_broken() {
                broken.push(result);
            }
        }
        broken
    }

    /// Number of distinct URLs probed so far
    pub fn probed_count(&self) -> usize {
        self.results.len()
    }
}

async fn send_probe(
    client: &Client,
    url: &Url,
    timeout: Duration,
    head: bool,
) -> Result<StatusCode, reqwest::Error> {
    let request = if head {
        client.head(url.clone())
    } else {
        client.get(url.clone())
    };
    let response = request.timeout(timeout).send().await?;
    Ok(response.status())
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn probe(status: Option<u16>, error: Option<&str>) -> LinkProbe {
        LinkProbe {
            url: "https://example.com/".to_string(),
            status,
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_is_broken() {
        assert!(!probe(Some(200), None).is_broken());
        assert!(!probe(Some(301), None).is_broken());
        assert!(probe(Some(404), None).is_broken());
        assert!(probe(Some(500), None).is_broken());
        assert!(probe(None, Some("Request timeout")).is_broken());
    }

    #[tokio::test]
    async fn test_probe_status() {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = Client::new();
        let ok = Url::parse(&format!("{}/ok", server.uri())).unwrap();
        let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();

        let result = probe_url(&client, &ok, Duration::from_secs(5)).await;
        assert_eq!(result.status, Some(200));
        assert!(!result.is_broken());

        let result = probe_url(&client, &missing, Duration::from_secs(5)).await;
        assert_eq!(result.status, Some(404));
        assert!(result.is_broken());
    }

    #[tokio::test]
    async fn test_falls_back_to_get_when_head_refused() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/asset"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/asset"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/asset", server.uri())).unwrap();
        let result = probe_url(&Client::new(), &url, Duration::from_secs(5)).await;
        assert_eq!(result.status, Some(200));
    }

    #[tokio::test]
    async fn test_prober_probes_each_url_once() {
        let server = MockServer::start().await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/here"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gone = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        let here = Url::parse(&format!("{}/here", server.uri())).unwrap();
        let mut prober = Prober::new(Client::new(), Duration::from_secs(5));

        let broken = prober.broken(&[gone.clone(), here, gone]).await;
        assert_eq!(broken.len(), 2);
        assert_eq!(broken[0].status, Some(410));
        assert_eq!(prober.probed_count(), 2);
    }

    #[tokio::test]
    async fn test_connection_error_recorded() {
        let url = Url::parse("http://127.0.0.1:1/unreachable").unwrap();
        let result = probe_url(&Client::new(), &url, Duration::from_secs(2)).await;
        assert_eq!(result.status, None);
        assert!(result.error.is_some());
        assert!(result.is_broken());
    }
}
