//! Integration tests for the audit crawl
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, extract, discover and probe cycle end-to-end.

use site_audit::config::{Config, ExtractionMode, QueryPolicy};
use site_audit::crawler::FetchSource;
use site_audit::{run_audit, AuditReport, PageOutcome, PageReport};
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration without delays
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.delay_ms = 0;
    config.fetcher.timeout_secs = 5;
    config.extractor.probe_timeout_secs = 5;
    config
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{}</title>
        <meta name="description" content="Description of {}"></head>
        <body><h1>{}</h1>{}</body></html>"#,
        title, title, title, body
    )
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn page<'a>(report: &'a AuditReport, route: &str) -> &'a PageReport {
    report
        .pages
        .iter()
        .find(|p| p.url.ends_with(route))
        .unwrap_or_else(|| panic!("no report for {}", route))
}

#[tokio::test]
async fn test_two_page_cycle_is_crawled_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<p>Welcome home</p><a href="/about">About</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/about",
        html_page("About", r#"<p>About us</p><a href="/">Home</a>"#),
    )
    .await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(!report.truncated);
    assert_eq!(report.pages[0].depth, 0);
    assert_eq!(report.pages[0].title_text(), "Home");
    assert_eq!(report.pages[1].depth, 1);
    assert_eq!(report.pages[1].title_text(), "About");
    assert!(report
        .pages
        .iter()
        .all(|p| p.outcome == PageOutcome::Audited));
}

#[tokio::test]
async fn test_failing_start_url_yields_error_report() {
    let server = MockServer::start().await;

    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 1);
    let start = &report.pages[0];
    assert_eq!(start.outcome, PageOutcome::FetchFailed);
    let error = start.error.as_ref().unwrap();
    assert_eq!(error.kind, "http_status");
    assert_eq!(error.status, Some(500));
    assert!(start.title.is_none());
}

#[tokio::test]
async fn test_duplicate_title_flagged_on_second_page_only() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Shop", r#"<p>Front page</p><a href="/other">Other</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/other",
        html_page("Shop", "<p>Completely different words here</p>"),
    )
    .await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(!page(&report, "/").duplicates.title);
    let other = page(&report, "/other");
    assert!(other.duplicates.title);
    assert!(!other.duplicates.content);
}

#[tokio::test]
async fn test_broken_internal_link_is_reported() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<p>Links</p><a href="/gone">Gone</a>"#),
    )
    .await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    let home = page(&report, "/");
    assert_eq!(home.internal_link_errors.len(), 1);
    assert!(home.internal_link_errors[0].url.ends_with("/gone"));
    assert_eq!(home.internal_link_errors[0].status, Some(404));

    let gone = page(&report, "/gone");
    assert_eq!(gone.outcome, PageOutcome::FetchFailed);
}

#[tokio::test]
async fn test_robots_disallow_reported_and_respected() {
    let server = MockServer::start().await;

    Mock::given(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        html_page("Home", r#"<p>Links</p><a href="/private">Private</a>"#),
    )
    .await;
    mount_page(&server, "/private", html_page("Private", "<p>Secret</p>")).await;

    // Reported but not enforced by default
    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();
    let robots = page(&report, "/").robots.as_ref().unwrap();
    assert!(robots.robots_txt_found);
    assert_eq!(robots.disallow, vec!["/private".to_string()]);
    assert_eq!(page(&report, "/private").outcome, PageOutcome::Audited);
    assert!(!page(&report, "/private").robots.as_ref().unwrap().page_allowed);

    let mut config = create_test_config();
    config.crawler.respect_robots = true;
    let report = run_audit(config, &server.uri()).await.unwrap();
    let private = page(&report, "/private");
    assert_eq!(private.outcome, PageOutcome::Disallowed);
    assert!(private.title.is_none());
}

#[tokio::test]
async fn test_query_variants_collapse_to_one_page() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/list?page=1">One</a><a href="/list/?page=2">Two</a>"#,
        ),
    )
    .await;
    mount_page(&server, "/list", html_page("List", "<p>Items</p>")).await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(page(&report, "/list").url.ends_with("/list"));

    let mut config = create_test_config();
    config.crawler.query_policy = QueryPolicy::Preserve;
    let report = run_audit(config, &server.uri()).await.unwrap();
    assert_eq!(report.pages.len(), 2);
    assert!(report.pages[1].url.ends_with("/list?page=1"));
}

#[tokio::test]
async fn test_max_pages_truncates() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&server, route, html_page(route, "<p>Leaf</p>")).await;
    }

    let mut config = create_test_config();
    config.crawler.max_pages = Some(2);
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(report.truncated);
    assert_eq!(report.pending, 2);
}

#[tokio::test]
async fn test_max_depth_limits_discovery() {
    let server = MockServer::start().await;

    mount_page(&server, "/", html_page("Home", r#"<a href="/a">A</a>"#)).await;
    mount_page(&server, "/a", html_page("A", r#"<a href="/b">B</a>"#)).await;
    mount_page(&server, "/b", html_page("B", "<p>Deep</p>")).await;

    let mut config = create_test_config();
    config.crawler.max_depth = Some(1);
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(report.pages.iter().all(|p| p.depth <= 1));
}

#[tokio::test]
async fn test_broken_image_is_probed() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page(
            "Home",
            r#"<img src="/logo.png" alt="Logo"><img src="/missing.png">"#,
        ),
    )
    .await;
    Mock::given(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    let images = page(&report, "/").images.as_ref().unwrap();
    assert_eq!(images.total_images, 2);
    assert_eq!(images.images_without_alt, 1);
    assert_eq!(images.probed, 2);
    assert_eq!(images.broken_images.len(), 1);
    assert!(images.broken_images[0].url.ends_with("/missing.png"));
}

#[tokio::test]
async fn test_light_mode_skips_robots_and_probes() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<a href="/gone">Gone</a><img src="/missing.png">"#),
    )
    .await;

    let mut config = create_test_config();
    config.extractor.mode = ExtractionMode::Light;
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.mode, ExtractionMode::Light);
    let home = page(&report, "/");
    assert!(home.robots.is_none());
    assert!(home.metadata.is_none());
    assert!(home.internal_link_errors.is_empty());
    assert_eq!(home.images.as_ref().unwrap().probed, 0);
    assert_eq!(home.title_text(), "Home");
}

#[cfg(unix)]
#[tokio::test]
async fn test_incomplete_page_rendered_by_browser_command() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "<html><body></body></html>".to_string()).await;

    let mut config = create_test_config();
    config.fetcher.render_command = Some(vec![
        "sh".to_string(),
        "-c".to_string(),
        "echo '<html><head><title>Rendered</title></head><body><h1>Rendered</h1></body></html>'"
            .to_string(),
    ]);
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 1);
    let start = &report.pages[0];
    assert_eq!(start.outcome, PageOutcome::Audited);
    assert_eq!(start.title_text(), "Rendered");
    assert_eq!(start.http.as_ref().unwrap().source, FetchSource::Rendered);
}

#[tokio::test]
async fn test_start_redirect_to_other_host_keeps_crawling() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(path("/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("http://localhost:{}/home", port).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/home",
        html_page("Home", r#"<p>Welcome</p><a href="/about">About</a>"#),
    )
    .await;
    mount_page(&server, "/about", html_page("About", "<p>About us</p>")).await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    let start = &report.pages[0];
    assert_eq!(start.discovered_links, 1);
    assert_eq!(
        start.http.as_ref().unwrap().final_url,
        format!("http://localhost:{}/home", port)
    );
    assert_eq!(
        report.pages[1].url,
        format!("http://localhost:{}/about", port)
    );
    assert_eq!(report.pages[1].outcome, PageOutcome::Audited);
}

#[tokio::test]
async fn test_redirect_target_is_extracted_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<a href="/old">Old</a><a href="/new">New</a>"#),
    )
    .await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", html_page("New", "<p>Moved here</p>")).await;

    let report = run_audit(create_test_config(), &server.uri()).await.unwrap();

    let new_pages: Vec<&PageReport> = report
        .pages
        .iter()
        .filter(|p| {
            p.http
                .as_ref()
                .is_some_and(|h| h.final_url.ends_with("/new"))
        })
        .collect();
    assert_eq!(new_pages.len(), 1);
    assert!(new_pages[0].url.ends_with("/old"));
    assert_eq!(new_pages[0].title_text(), "New");
    assert!(!new_pages[0].duplicates.title);
    assert!(!new_pages[0].duplicates.content);
    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_delay_between_pages() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        html_page("Home", r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount_page(&server, "/a", html_page("A", "<p>First</p>")).await;
    mount_page(&server, "/b", html_page("B", "<p>Second</p>")).await;

    let mut config = create_test_config();
    config.crawler.delay_ms = 150;
    config.extractor.mode = ExtractionMode::Light;

    let started = std::time::Instant::now();
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 3);
    // Two pauses: none after the last page
    assert!(started.elapsed() >= std::time::Duration::from_millis(300));
}

#[tokio::test]
async fn test_robots_crawl_delay_slows_loop() {
    let server = MockServer::start().await;

    Mock::given(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1\n"))
        .mount(&server)
        .await;
    mount_page(&server, "/", html_page("Home", r#"<a href="/a">A</a>"#)).await;
    mount_page(&server, "/a", html_page("A", "<p>Leaf</p>")).await;

    let mut config = create_test_config();
    config.crawler.respect_robots = true;

    let started = std::time::Instant::now();
    let report = run_audit(config, &server.uri()).await.unwrap();

    assert_eq!(report.pages.len(), 2);
    assert!(started.elapsed() >= std::time::Duration::from_secs(1));
}
