//! Crawler coordinator - main audit orchestration logic
//!
//! This module contains the crawl loop that coordinates a whole audit run:
//! - Owning the frontier, duplication trackers and per-run caches
//! - Fetching each page, then extracting signals and discovering links
//! - Probing internal links and images
//! - Honoring robots.txt when configured
//! - Assembling the final report

use crate::audit::{
    extract, AuditReport, DuplicationTrackers, PageReport, Prober, RobotsSummary,
};
use crate::config::{Config, ExtractionMode};
use crate::crawler::discover::discover_in;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::robots::{fetch_robots, ParsedRobots};
use crate::state::RunState;
use crate::url::{normalize_key, CrawlTarget, SiteScope};
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use scraper::Html;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Runs audits with one configuration
///
/// The auditor itself holds no crawl state; every call to [`Auditor::run`]
/// starts from an empty frontier and empty trackers.
pub struct Auditor {
    config: Config,
    client: Client,
    fetcher: Fetcher,
}

impl Auditor {
    /// Creates a new auditor instance
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.fetcher)?;
        let fetcher = Fetcher::new(client.clone(), &config.fetcher);

        Ok(Self {
            config,
            client,
            fetcher,
        })
    }

    /// Returns the configuration every run of this auditor uses
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls the site of `start_url` and returns one report per crawled page
    ///
    /// The site is the host of `start_url`, the host it redirects to, and
    /// the configured extra domains.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute HTTP(S) URL crawled at depth 0
    ///
    /// # Returns
    ///
    /// * `Ok(AuditReport)` - Reports in crawl order, plus run metadata
    /// * `Err(AuditError)` - The run could not start
    ///
    /// # Errors
    ///
    /// Only an invalid start URL fails the run; page failures are recorded in
    /// the returned report.
    pub async fn run(&self, start_url: &str) -> Result<AuditReport> {
        let start = CrawlTarget::start(start_url)?;
        let scope = SiteScope::new(&start.url, &self.config.crawler.extra_domains)?;

        AuditRun::new(self, start, scope).execute().await
    }
}

/// Runs a complete audit with the given configuration
///
/// This is the main entry point for the audit. It:
/// 1. Builds the HTTP client and fetcher
/// 2. Crawls the site breadth-first from `start_url`
/// 3. Returns the accumulated report
///
/// # Arguments
///
/// * `config` - The audit configuration
/// * `start_url` - The URL the crawl starts from
///
/// # Errors
///
/// Fails if the HTTP client cannot be built or the start URL is invalid.
pub async fn run_audit(config: Config, start_url: &str) -> Result<AuditReport> {
    Auditor::new(config)?.run(start_url).await
}

/// State owned by a single run
struct AuditRun<'a> {
    auditor: &'a Auditor,
    start_url: String,
    scope: SiteScope,
    frontier: Frontier,
    trackers: DuplicationTrackers,
    /// robots.txt per origin; `None` when the site has none
    robots: HashMap<String, Option<ParsedRobots>>,
    prober: Prober,
    pages: Vec<PageReport>,
    state: RunState,
}

impl<'a> AuditRun<'a> {
    fn new(auditor: &'a Auditor, start: CrawlTarget, scope: SiteScope) -> Self {
        let probe_timeout = Duration::from_secs(auditor.config.extractor.probe_timeout_secs);

        Self {
            auditor,
            start_url: start.url.to_string(),
            scope,
            frontier: Frontier::new(start),
            trackers: DuplicationTrackers::new(),
            robots: HashMap::new(),
            prober: Prober::new(auditor.client.clone(), probe_timeout),
            pages: Vec::new(),
            state: RunState::Pending,
        }
    }

    fn config(&self) -> &'a Config {
        &self.auditor.config
    }

    async fn execute(mut self) -> Result<AuditReport> {
        self.state.transition(RunState::InProgress)?;

        let config = self.config();
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut truncated = false;

        info!(
            "Starting audit of {} ({:?} mode, max pages: {:?}, max depth: {:?})",
            self.start_url, config.extractor.mode, config.crawler.max_pages, config.crawler.max_depth
        );

        while let Some(target) = self.frontier.pop_next() {
            debug!("Processing URL: {} (depth {})", target.url, target.depth);

            let delay = self.process(target).await;

            let crawled = self.pages.len();
            if crawled % 10 == 0 {
                let rate = crawled as f64 / clock.elapsed().as_secs_f64().max(f64::EPSILON);
                info!(
                    "Progress: {} pages audited, {} in queue, {:.2} pages/sec",
                    crawled,
                    self.frontier.len(),
                    rate
                );
            }

            if config.crawler.max_pages.is_some_and(|max| crawled >= max) {
                truncated = !self.frontier.is_empty();
                if truncated {
                    info!(
                        "Page limit reached, {} URLs left unvisited",
                        self.frontier.len()
                    );
                }
                break;
            }

            if !self.frontier.is_empty() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.state.transition(RunState::Done)?;

        let duration = clock.elapsed();
        info!(
            "Audit completed: {} pages in {:?} ({} failed)",
            self.pages.len(),
            duration,
            self.pages.iter().filter(|p| p.outcome.is_error()).count()
        );

        Ok(AuditReport {
            start_url: self.start_url,
            mode: config.extractor.mode,
            started_at,
            finished_at: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            truncated,
            pending: self.frontier.len(),
            pages: self.pages,
        })
    }

    /// Processes a single URL and returns the delay to wait before the next one
    ///
    /// This method:
    /// 1. Loads robots.txt when it is needed
    /// 2. Skips the page if robots.txt forbids it and robots are respected
    /// 3. Fetches the page
    /// 4. Skips it when a redirect landed on an already audited URL
    /// 5. Records an error report, or audits the page and enqueues its links
    async fn process(&mut self, target: CrawlTarget) -> Duration {
        let config = self.config();
        let user_agent = config.fetcher.user_agent.as_str();
        let respect_robots = config.crawler.respect_robots;
        let full = config.extractor.mode == ExtractionMode::Full;

        let robots = if respect_robots || full {
            self.robots_for(&target.url).await
        } else {
            None
        };

        let crawl_delay = if respect_robots {
            robots.as_ref().and_then(|r| r.crawl_delay(user_agent))
        } else {
            None
        };
        let delay = iteration_delay(config.crawler.delay_ms, crawl_delay);

        let allowed = robots
            .as_ref()
            .map_or(true, |r| r.is_allowed(target.url.as_str(), user_agent));

        if respect_robots && !allowed {
            info!("URL {} disallowed by robots.txt", target.url);
            let summary = robots_summary(robots.as_ref(), allowed, None);
            self.pages.push(PageReport::disallowed(&target, summary));
            return delay;
        }

        match self.auditor.fetcher.fetch(&target.url).await {
            Ok(page) => {
                if target.depth == 0 && self.scope.add_host(&page.final_url) {
                    info!(
                        "Start URL redirected to {}, adding its host to the site",
                        page.final_url
                    );
                }

                let final_key = normalize_key(&page.final_url);
                if final_key != target.key && !self.frontier.mark_visited(&final_key) {
                    debug!(
                        "{} redirected to already audited {}, skipping",
                        target.url, page.final_url
                    );
                    return delay;
                }

                let mode = config.extractor.mode;
                let base_url = page.final_url.clone();

                let (mut analysis, discovered) = {
                    let document = Html::parse_document(&page.body);
                    let analysis = extract(
                        &page.body,
                        &document,
                        &base_url,
                        &self.scope,
                        &mut self.trackers,
                        mode,
                    );
                    let discovered = discover_in(
                        &document,
                        &base_url,
                        &self.scope,
                        config.crawler.query_policy,
                        target.depth + 1,
                    );
                    (analysis, discovered)
                };

                let image_sources = std::mem::take(&mut analysis.image_sources);
                let internal_links = std::mem::take(&mut analysis.internal_links);
                let meta_robots = analysis.meta_robots.take();

                let mut report = PageReport::audited(&target, &page, analysis);
                report.discovered_links = discovered.len();

                if full {
                    self.probe_page(&mut report, &image_sources, &internal_links)
                        .await;
                    report.robots = Some(robots_summary(robots.as_ref(), allowed, meta_robots));
                }

                let within_depth = config
                    .crawler
                    .max_depth
                    .map_or(true, |max| target.depth < max);
                if within_depth {
                    let added = discovered
                        .into_iter()
                        .map(|t| self.frontier.enqueue(t))
                        .filter(|&queued| queued)
                        .count();
                    debug!("{} new URLs queued from {}", added, target.url);
                }

                self.pages.push(report);
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", target.url, e);
                self.pages.push(PageReport::failed(&target, &e));
            }
        }

        delay
    }

    /// Checks the first images and every internal link of a page
    async fn probe_page(
        &mut self,
        report: &mut PageReport,
        image_sources: &[Url],
        internal_links: &[Url],
    ) {
        let extractor = &self.config().extractor;
        let sample = &image_sources[..image_sources.len().min(extractor.image_probe_limit)];

        if let Some(images) = report.images.as_mut() {
            images.probed = sample.len();
            images.broken_images = self.prober.broken(sample).await;
        }

        if extractor.probe_internal_links {
            report.internal_link_errors = self.prober.broken(internal_links).await;
        }
    }

    /// Returns robots.txt for the origin of `url`, fetching it once per run
    async fn robots_for(&mut self, url: &Url) -> Option<ParsedRobots> {
        let origin = url.origin().ascii_serialization();
        if let Some(cached) = self.robots.get(&origin) {
            return cached.clone();
        }

        let robots = fetch_robots(&self.auditor.client, url).await;
        debug!(
            "robots.txt for {}: {}",
            origin,
            if robots.is_some() { "found" } else { "not found" }
        );
        self.robots.insert(origin, robots.clone());
        robots
    }
}

/// Longest robots.txt Crawl-delay honored, in seconds
const MAX_CRAWL_DELAY_SECS: f64 = 60.0;

/// Picks the pause between two iterations of the crawl loop
///
/// # Arguments
///
/// * `delay_ms` - The configured fixed delay
/// * `crawl_delay` - robots.txt Crawl-delay in seconds, when robots are respected
///
/// # Returns
///
/// The larger of the two, with Crawl-delay capped at 60 seconds. Negative or
/// non-finite Crawl-delay values are ignored.
fn iteration_delay(delay_ms: u64, crawl_delay: Option<f64>) -> Duration {
    let base = Duration::from_millis(delay_ms);

    match crawl_delay.filter(|d| d.is_finite() && *d > 0.0) {
        Some(secs) => base.max(Duration::from_secs_f64(secs.min(MAX_CRAWL_DELAY_SECS))),
        None => base,
    }
}

fn robots_summary(
    robots: Option<&ParsedRobots>,
    page_allowed: bool,
    meta_robots: Option<String>,
) -> RobotsSummary {
    RobotsSummary {
        robots_txt_found: robots.is_some(),
        disallow: robots.map(|r| r.disallow_directives()).unwrap_or_default(),
        page_allowed,
        meta_robots,
    }
}
