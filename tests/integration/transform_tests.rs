//! Integration tests for the transform stage
//!
//! These tests crawl a wiremock site, persist the corpus, read it back and
//! chunk it, checking the records written at each step.

use help_harvest::chunker::ExtractionError;
use help_harvest::config::{
    ChunkerConfig, Config, CrawlerConfig, OpenAiConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use help_harvest::crawler::Crawler;
use help_harvest::output::{
    load_report, read_record, write_crawl_output, write_transform_output, CrawlData, Report,
    TransformData, TransformReport,
};
use help_harvest::{transform, HtmlChunker, OpenAiChunker};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(origin: &str) -> Config {
    Config {
        site: SiteConfig {
            origin: origin.to_string(),
            scope_prefix: "/help".to_string(),
            excluded_markers: vec![],
            seed: None,
        },
        crawler: CrawlerConfig {
            backoff_base_ms: 1,
            ..CrawlerConfig::default()
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

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Mounts a four-page help site; /help/c has no main content
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/help",
        r#"<html><body>
            <nav><a href="/help/a">A</a><a href="/help/b">B</a><a href="/help/c">C</a></nav>
            <main><article><h1>Help centre</h1><p>Start here</p></article></main>
        </body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/help/a",
        r#"<html><body><main><article>
            <h2>Lists</h2><ul><li>First</li><li>Second</li></ul>
        </article></main></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/help/b",
        r#"<html><body><main><article>
            <aside><p>On this page</p></aside>
            <p>Sharing basics</p>
        </article></main></body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/help/c",
        r#"<html><body><div><p>Redirecting...</p></div></body></html>"#,
    )
    .await;
}

#[tokio::test]
async fn test_crawl_then_chunk() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_site(&server).await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let outcome = crawler.run(&format!("{}/help", base)).await.unwrap();
    assert_eq!(outcome.pages.len(), 4);

    let dir = TempDir::new().unwrap();
    let raw_dir = dir.path().join("raw");
    let processed_dir = dir.path().join("processed");
    write_crawl_output(&raw_dir, &outcome.into_data()).unwrap();

    let corpus: CrawlData = read_record(&raw_dir.join("data.json")).unwrap();
    let chunker = HtmlChunker::from_config(&config.chunker);

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = {
        let _guard = tracing::subscriber::set_default(subscriber);
        transform(&corpus, &chunker, None).await
    };

    let skip_lines: Vec<String> = logs
        .contents()
        .lines()
        .filter(|line| line.contains("Skipping page"))
        .map(str::to_string)
        .collect();
    assert_eq!(skip_lines.len(), 1);
    assert!(skip_lines[0].contains(&format!("{}/help/c", base)));
    assert!(skip_lines[0].contains(&ExtractionError::MissingMain.to_string()));

    let report = result.report();
    assert_eq!(report.total_count, 4);
    assert_eq!(report.success_count, 3);
    assert_eq!(report.skipped_urls, vec![format!("{}/help/c", base)]);

    write_transform_output(&processed_dir, &result.into_data()).unwrap();
    let data: TransformData = read_record(&processed_dir.join("data.json")).unwrap();

    assert_eq!(
        data.results[&format!("{}/help", base)],
        vec!["Help centre\nStart here".to_string()]
    );
    assert_eq!(
        data.results[&format!("{}/help/a", base)],
        vec!["Lists\nFirst\nSecond".to_string()]
    );
    assert_eq!(
        data.results[&format!("{}/help/b", base)],
        vec!["Sharing basics".to_string()]
    );
    assert!(!data.results.contains_key(&format!("{}/help/c", base)));

    let stored: TransformReport = read_record(&processed_dir.join("report.json")).unwrap();
    assert_eq!(stored, data.report);

    match load_report(&processed_dir.join("report.json")).unwrap() {
        Report::Transform(r) => assert_eq!(r.success_count, 3),
        other => panic!("expected a transform report, got {:?}", other),
    }
    match load_report(&raw_dir.join("data.json")).unwrap() {
        Report::Crawl(r) => assert_eq!(r.visited_count, 4),
        other => panic!("expected a crawl report, got {:?}", other),
    }
}

#[tokio::test]
async fn test_legacy_field_names_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let legacy = json!({
        "metadata": {
            "root_url": "https://notion.so/help",
            "visited_count": 1,
            "skipped_count": 0,
            "success_count": 1,
            "failed_count": 0,
            "visited_urls": ["https://notion.so/help"],
            "skipped_urls": [],
            "failed_urls": [],
            "elapsed_time": 1.5,
            "start_time": "2024-01-01 10:00:00.000000",
            "end_time": "2024-01-01 10:00:01.500000"
        },
        "results": {
            "https://notion.so/help": {
                "status_code": 200,
                "checksum": "ignored",
                "html_body": "<main><article><p>Legacy</p></article></main>"
            }
        }
    });
    std::fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

    let corpus: CrawlData = read_record(&path).unwrap();
    assert_eq!(corpus.report.pending_count, 0);

    let result = transform(&corpus, &HtmlChunker::default(), None).await;
    assert_eq!(result.chunks["https://notion.so/help"][0].text, "Legacy");
}

#[tokio::test]
async fn test_remote_chunker_over_corpus() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    let base = site.uri();
    mount_site(&site).await;

    let content = json!({"results": ["Chunk one", "Chunk two"]}).to_string();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })))
        .expect(3)
        .mount(&api)
        .await;

    let config = create_test_config(&base);
    let mut crawler = Crawler::new(&config).unwrap();
    let corpus = crawler.run(&format!("{}/help", base)).await.unwrap().into_data();

    let openai = OpenAiConfig {
        base_url: format!("{}/v1", api.uri()),
        ..OpenAiConfig::default()
    };
    let chunker = OpenAiChunker::new(&openai, "test-key", 780).unwrap();
    let result = transform(&corpus, &chunker, None).await;

    assert_eq!(result.chunks.len(), 3);
    assert_eq!(result.chunk_count(), 6);
    assert_eq!(result.skipped, vec![format!("{}/help/c", base)]);
}
