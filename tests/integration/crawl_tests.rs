//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use help_harvest::config::{
    ChunkerConfig, Config, CrawlerConfig, OpenAiConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use help_harvest::crawler::Crawler;
use help_harvest::output::{compute_checksum, read_record, write_crawl_output, CrawlData, CrawlReport};
use help_harvest::{HarvestError, PageState};
use std::collections::HashSet;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server
fn create_test_config(origin: &str) -> Config {
    Config {
        site: SiteConfig {
            origin: origin.to_string(),
            scope_prefix: "/help".to_string(),
            excluded_markers: vec!["notion-academy".to_string()],
            seed: None,
        },
        crawler: CrawlerConfig {
            timeout_secs: 5,
            max_attempts: 3,
            backoff_base_ms: 1, // Very short for testing
            request_delay_ms: 0,
            max_pages: 100,
            max_depth: None,
            respect_robots: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        chunker: ChunkerConfig::default(),
        openai: OpenAiConfig::default(),
        output: OutputConfig::default(),
    }
}

/// Mounts an HTML page at `route`
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn links(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!("<html><body><nav>{}</nav></body></html>", anchors)
}

fn assert_disjoint(report: &CrawlReport) {
    let visited: HashSet<&String> = report.visited_urls.iter().collect();
    let failed: HashSet<&String> = report.failed_urls.iter().collect();
    let skipped: HashSet<&String> = report.skipped_urls.iter().collect();
    let pending: HashSet<&String> = report.pending_urls.iter().collect();

    assert!(visited.is_disjoint(&failed));
    assert!(visited.is_disjoint(&skipped));
    assert!(visited.is_disjoint(&pending));
    assert!(failed.is_disjoint(&skipped));
    assert!(failed.is_disjoint(&pending));
    assert!(skipped.is_disjoint(&pending));
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/help",
        &links(&["/help/a", "/help/b", "/pricing", "mailto:team@makenotion.com"]),
    )
    .await;
    mount_page(&server, "/help/a", &links(&["/help/a1", "/help", "/help/b?ref=a"])).await;
    mount_page(&server, "/help/b", &links(&["b1", "/help/a#top"])).await;
    mount_page(&server, "/help/a1", &links(&[])).await;
    mount_page(&server, "/help/b1", &links(&["../pricing"])).await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    let order: Vec<String> = outcome
        .state
        .visited()
        .iter()
        .map(|u| u.as_str().trim_start_matches(base.as_str()).to_string())
        .collect();
    // "b1" on /help/b resolves against the page to /help/b1
    assert_eq!(
        order,
        vec!["/help", "/help/a", "/help/b", "/help/a1", "/help/b1"]
    );

    assert_eq!(
        outcome.state.state_of(&format!("{}/pricing", base)),
        Some(PageState::Skipped)
    );
    assert_eq!(
        outcome.state.state_of("mailto:team@makenotion.com"),
        Some(PageState::Skipped)
    );

    let report = outcome.report();
    assert_eq!(report.visited_count, 5);
    assert_eq!(report.success_count, 5);
    assert_eq!(report.skipped_count, 2);
    assert_eq!(report.failed_count, 0);
    assert_eq!(report.root_url, format!("{}/help", base));
    assert_disjoint(&report);

    let mut sorted = report.visited_urls.clone();
    sorted.sort();
    assert_eq!(report.visited_urls, sorted);
}

#[tokio::test]
async fn test_failed_page_is_recorded_and_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/help", &links(&["/help/broken", "/help/ok"])).await;
    mount_page(&server, "/help/ok", &links(&[])).await;

    // Exhausts all three attempts
    Mock::given(method("GET"))
        .and(path("/help/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string(links(&["/help/hidden"])))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/help/hidden"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    let broken = format!("{}/help/broken", base);
    assert_eq!(outcome.state.state_of(&broken), Some(PageState::Failed));
    assert!(!outcome.pages.contains_key(&broken));

    let report = outcome.report();
    assert_eq!(report.failed_urls, vec![broken]);
    assert_eq!(report.visited_count, 2);
    assert_disjoint(&report);
}

#[tokio::test]
async fn test_not_found_fails_without_retry() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/help", &links(&["/help/gone"])).await;
    Mock::given(method("GET"))
        .and(path("/help/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(outcome.state.failed_count(), 1);
}

#[tokio::test]
async fn test_transient_failure_recovers() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/help", &links(&["/help/flaky"])).await;

    // First-mounted mock wins until its budget is used up
    Mock::given(method("GET"))
        .and(path("/help/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/help/flaky", "<main><article><p>Back</p></article></main>").await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    let flaky = format!("{}/help/flaky", base);
    assert_eq!(outcome.state.state_of(&flaky), Some(PageState::Visited));
    assert!(outcome.pages[&flaky].body.contains("Back"));
    assert_eq!(outcome.state.failed_count(), 0);
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /help/private"),
        )
        .mount(&server)
        .await;

    mount_page(&server, "/help", &links(&["/help/private/page", "/help/public"])).await;
    mount_page(&server, "/help/public", &links(&[])).await;
    Mock::given(method("GET"))
        .and(path("/help/private/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(
        outcome.state.state_of(&format!("{}/help/private/page", base)),
        Some(PageState::Skipped)
    );
    assert_eq!(outcome.state.visited_count(), 2);
}

#[tokio::test]
async fn test_huge_crawl_delay_does_not_abort_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1e30"))
        .mount(&server)
        .await;
    // A single page, so the pacer never has to wait
    mount_page(&server, "/help", &links(&[])).await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(outcome.state.visited_count(), 1);
    assert_eq!(outcome.pages.len(), 1);
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/help", &links(&[])).await;

    let mut config = create_test_config(&base);
    config.crawler.respect_robots = false;
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(outcome.state.visited_count(), 1);
}

#[tokio::test]
async fn test_excluded_sections_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/help",
        &links(&["/help/notion-academy/lesson-1", "/help/guides"]),
    )
    .await;
    mount_page(&server, "/help/guides", &links(&[])).await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(
        outcome.report().skipped_urls,
        vec![format!("{}/help/notion-academy/lesson-1", base)]
    );
}

#[tokio::test]
async fn test_seed_out_of_scope_makes_no_requests() {
    let server = MockServer::start().await;
    let base = server.uri();

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let result = crawler.run(&format!("{}/pricing", base)).await;

    assert!(matches!(result, Err(HarvestError::SeedOutOfScope { .. })));
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_page_cap_reports_pending() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/help", &links(&["/help/1", "/help/2", "/help/3"])).await;
    mount_page(&server, "/help/1", &links(&[])).await;

    let mut config = create_test_config(&base);
    config.crawler.max_pages = 2;
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    let report = outcome.report();
    assert_eq!(report.visited_count, 2);
    assert_eq!(report.pending_count, 2);
    assert_eq!(
        report.pending_urls,
        vec![format!("{}/help/2", base), format!("{}/help/3", base)]
    );
    assert_disjoint(&report);
}

#[tokio::test]
async fn test_max_depth() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/help", &links(&["/help/one"])).await;
    mount_page(&server, "/help/one", &links(&["/help/two"])).await;

    let mut config = create_test_config(&base);
    config.crawler.max_depth = Some(1);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    assert_eq!(outcome.state.visited_count(), 2);
    assert_eq!(
        outcome.state.state_of(&format!("{}/help/two", base)),
        Some(PageState::Skipped)
    );
}

#[tokio::test]
async fn test_crawl_output_roundtrip() {
    let server = MockServer::start().await;
    let base = server.uri();
    let body = "<html><body><main><article><p>Hello</p></article></main></body></html>";
    mount_page(&server, "/help", body).await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();

    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("raw");
    write_crawl_output(&out_dir, &outcome.into_data()).unwrap();

    let report: CrawlReport = read_record(&out_dir.join("report.json")).unwrap();
    let data: CrawlData = read_record(&out_dir.join("data.json")).unwrap();

    assert_eq!(data.report, report);
    let page = &data.results[&format!("{}/help", base)];
    assert_eq!(page.status_code, 200);
    assert_eq!(page.body, body);
    assert_eq!(page.checksum, compute_checksum(body));
    assert_eq!(report.start_time.len(), "2024-01-01 00:00:00.000000".len());
}
