//! Transform stage: crawl corpus to chunk corpus
//!
//! Every page is run through content extraction and then through a chunk
//! parser. A page that fails either step is logged and recorded as skipped;
//! the rest of the batch carries on.

use crate::chunker::{extract_content, Chunk, ChunkParser};
use crate::output::{
    elapsed_seconds, format_timestamp, CrawlData, RawPage, TransformData, TransformReport,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// The result of a transform run
#[derive(Debug)]
pub struct TransformOutcome {
    /// Chunks per successfully processed URL
    pub chunks: BTreeMap<String, Vec<Chunk>>,

    /// URLs that failed extraction or parsing, in corpus order
    pub skipped: Vec<String>,

    /// Number of pages considered
    pub total: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl TransformOutcome {
    /// Builds the transform report
    pub fn report(&self) -> TransformReport {
        TransformReport {
            total_count: self.total,
            success_count: self.chunks.len(),
            skipped_count: self.skipped.len(),
            success_urls: self.chunks.keys().cloned().collect(),
            skipped_urls: self.skipped.clone(),
            elapsed_time: elapsed_seconds(self.elapsed),
            start_time: format_timestamp(&self.started_at),
            end_time: format_timestamp(&self.finished_at),
        }
    }

    /// Total number of chunks produced
    pub fn chunk_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// Consumes the outcome, returning the persisted chunk record
    pub fn into_data(self) -> TransformData {
        let report = self.report();
        let results = self
            .chunks
            .into_iter()
            .map(|(url, chunks)| (url, chunks.into_iter().map(|c| c.text).collect()))
            .collect();

        TransformData { report, results }
    }
}

/// Chunks every page of a crawl corpus
///
/// # Arguments
///
/// * `corpus` - The raw pages from a crawl
/// * `parser` - The chunk parser applied to each content fragment
/// * `targets` - When set, only these URLs are processed (absent ones are ignored)
///
/// # Returns
///
/// The chunks per URL plus the skipped URLs. Per-page failures never abort
/// the run.
pub async fn transform(
    corpus: &CrawlData,
    parser: &dyn ChunkParser,
    targets: Option<&[String]>,
) -> TransformOutcome {
    let started_at = Utc::now();
    let start_time = Instant::now();

    let pages: Vec<(&String, &RawPage)> = corpus
        .results
        .iter()
        .filter(|(url, _)| targets.map_or(true, |t| t.iter().any(|target| target == *url)))
        .collect();

    tracing::info!(
        pages = pages.len(),
        parser = parser.name(),
        "Starting transform"
    );

    let mut chunks = BTreeMap::new();
    let mut skipped = Vec::new();

    for (url, page) in &pages {
        match chunk_page(page, url, parser).await {
            Ok(page_chunks) => {
                tracing::debug!(url = %url, chunks = page_chunks.len(), "Chunked page");
                chunks.insert(url.to_string(), page_chunks);
            }
            Err(reason) => {
                tracing::warn!(url = %url, reason = %reason, "Skipping page");
                skipped.push(url.to_string());
            }
        }
    }

    let elapsed = start_time.elapsed();
    tracing::info!(
        success = chunks.len(),
        skipped = skipped.len(),
        "Transform completed in {:?}",
        elapsed
    );

    TransformOutcome {
        chunks,
        skipped,
        total: pages.len(),
        started_at,
        finished_at: Utc::now(),
        elapsed,
    }
}

/// Extracts and chunks one page
async fn chunk_page(
    page: &RawPage,
    url: &str,
    parser: &dyn ChunkParser,
) -> Result<Vec<Chunk>, crate::HarvestError> {
    let fragments = extract_content(&page.body)?;

    let mut page_chunks = Vec::new();
    for fragment in &fragments {
        page_chunks.extend(parser.parse(fragment, url).await?);
    }
    Ok(page_chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::{ChunkerError, HtmlChunker};
    use crate::output::CrawlReport;
    use async_trait::async_trait;

    fn corpus(pages: &[(&str, &str)]) -> CrawlData {
        CrawlData {
            report: CrawlReport {
                root_url: "https://notion.so/help".to_string(),
                visited_count: pages.len(),
                skipped_count: 0,
                success_count: pages.len(),
                failed_count: 0,
                pending_count: 0,
                visited_urls: pages.iter().map(|(u, _)| u.to_string()).collect(),
                skipped_urls: vec![],
                failed_urls: vec![],
                pending_urls: vec![],
                elapsed_time: 0.0,
                start_time: String::new(),
                end_time: String::new(),
            },
            results: pages
                .iter()
                .map(|(url, body)| (url.to_string(), RawPage::new(200, body.to_string())))
                .collect(),
        }
    }

    /// Fails for fragments mentioning "boom"
    struct FlakyParser;

    #[async_trait]
    impl ChunkParser for FlakyParser {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn parse(&self, fragment: &str, url: &str) -> Result<Vec<Chunk>, ChunkerError> {
            if fragment.contains("boom") {
                return Err(ChunkerError::MalformedResponse("boom".to_string()));
            }
            Ok(vec![Chunk::from_text("ok", url)])
        }
    }

    #[tokio::test]
    async fn test_extraction_failure_is_skipped() {
        let data = corpus(&[
            ("https://notion.so/help/a", "<main><article><p>A</p></article></main>"),
            ("https://notion.so/help/b", "<body><p>no main</p></body>"),
        ]);

        let outcome = transform(&data, &HtmlChunker::default(), None).await;
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.skipped, vec!["https://notion.so/help/b"]);
        assert_eq!(outcome.chunks["https://notion.so/help/a"][0].text, "A");
    }

    #[tokio::test]
    async fn test_parser_failure_is_skipped() {
        let data = corpus(&[
            ("https://notion.so/help/a", "<main><article><p>fine</p></article></main>"),
            ("https://notion.so/help/b", "<main><article><p>boom</p></article></main>"),
        ]);

        let outcome = transform(&data, &FlakyParser, None).await;
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.skipped, vec!["https://notion.so/help/b"]);
    }

    #[tokio::test]
    async fn test_empty_article_is_success_with_no_chunks() {
        let data = corpus(&[(
            "https://notion.so/help/blank",
            "<main><article><aside>toc only</aside></article></main>",
        )]);

        let outcome = transform(&data, &HtmlChunker::default(), None).await;
        assert!(outcome.skipped.is_empty());
        assert!(outcome.chunks["https://notion.so/help/blank"].is_empty());
        assert_eq!(outcome.report().success_count, 1);
    }

    #[tokio::test]
    async fn test_targets_filter() {
        let data = corpus(&[
            ("https://notion.so/help/a", "<main><article><p>A</p></article></main>"),
            ("https://notion.so/help/b", "<main><article><p>B</p></article></main>"),
        ]);
        let targets = vec![
            "https://notion.so/help/b".to_string(),
            "https://notion.so/help/absent".to_string(),
        ];

        let outcome = transform(&data, &HtmlChunker::default(), Some(&targets)).await;
        assert_eq!(outcome.total, 1);
        assert_eq!(
            outcome.chunks.keys().collect::<Vec<_>>(),
            vec!["https://notion.so/help/b"]
        );
    }

    #[tokio::test]
    async fn test_into_data_keeps_chunk_texts() {
        let data = corpus(&[(
            "https://notion.so/help/a",
            "<main><article><h1>Title</h1><p>Body</p></article><article><p>Second</p></article></main>",
        )]);

        let outcome = transform(&data, &HtmlChunker::default(), None).await;
        assert_eq!(outcome.chunk_count(), 2);

        let out = outcome.into_data();
        assert_eq!(
            out.results["https://notion.so/help/a"],
            vec!["Title\nBody".to_string(), "Second".to_string()]
        );
        assert_eq!(out.report.success_urls, vec!["https://notion.so/help/a"]);
    }
}
