//! Serializable crawl and transform records
//!
//! These are the shapes written to `report.json` and `data.json`. Reports are
//! built once at the end of a run and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;

/// Timestamp layout used in every report (UTC, microsecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Formats a UTC timestamp for a report
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use help_harvest::output::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
/// assert_eq!(format_timestamp(&at), "2024-05-01 08:30:00.000000");
/// ```
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Elapsed wall time in seconds, rounded to two decimals
pub fn elapsed_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// Hex SHA-256 digest of a page body
pub fn compute_checksum(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// A fetched page, keyed by its canonical URL in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    /// HTTP status code of the successful response
    pub status_code: u16,

    /// Hex SHA-256 digest of `body`
    pub checksum: String,

    /// Raw markup
    #[serde(alias = "html_body")]
    pub body: String,
}

impl RawPage {
    /// Creates a page record, computing its checksum
    pub fn new(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            checksum: compute_checksum(&body),
            body,
        }
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub root_url: String,

    pub visited_count: usize,
    pub skipped_count: usize,
    pub success_count: usize,
    pub failed_count: usize,

    /// URLs left in the queue when the page cap stopped the crawl
    #[serde(default)]
    pub pending_count: usize,

    pub visited_urls: Vec<String>,
    pub skipped_urls: Vec<String>,
    pub failed_urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_urls: Vec<String>,

    /// Wall time in seconds
    pub elapsed_time: f64,

    pub start_time: String,
    pub end_time: String,
}

/// The persisted raw corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlData {
    #[serde(alias = "metadata")]
    pub report: CrawlReport,

    pub results: BTreeMap<String, RawPage>,
}

/// Summary of one transform run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    /// Pages considered (after target filtering)
    pub total_count: usize,
    pub success_count: usize,
    pub skipped_count: usize,

    pub success_urls: Vec<String>,
    pub skipped_urls: Vec<String>,

    /// Wall time in seconds
    pub elapsed_time: f64,

    pub start_time: String,
    pub end_time: String,
}

/// The persisted chunk corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    #[serde(alias = "metadata")]
    pub report: TransformReport,

    /// Chunk texts per URL, in page order
    pub results: BTreeMap<String, Vec<String>>,
}
