//! Statistics display for persisted reports
//!
//! This module provides functionality for loading a crawl or transform report
//! from disk and printing a summary of it.

use crate::output::records::{CrawlReport, TransformReport};
use crate::output::storage::{read_record, StorageError};
use serde::Deserialize;
use std::path::Path;

/// Either kind of persisted report
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Crawl(CrawlReport),
    Transform(TransformReport),
}

/// Loads a report record from disk
///
/// Accepts both `report.json` and a whole `data.json` (whose `report` or
/// legacy `metadata` key holds the report).
///
/// # Arguments
///
/// * `path` - Path to the JSON file
///
/// # Returns
///
/// * `Ok(Report)` - Successfully loaded report
/// * `Err(StorageError)` - Failed to read or recognise the file
pub fn load_report(path: &Path) -> Result<Report, StorageError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Envelope {
        Wrapped {
            #[serde(alias = "metadata")]
            report: Report,
        },
        Bare(Report),
    }

    let envelope: Envelope = read_record(path)?;
    Ok(match envelope {
        Envelope::Wrapped { report } => report,
        Envelope::Bare(report) => report,
    })
}

/// Share of `part` in `total`, as a percentage
fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &Report) {
    match report {
        Report::Crawl(report) => print_crawl_report(report),
        Report::Transform(report) => print_transform_report(report),
    }
}

/// Prints crawl statistics to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Root URL: {}", report.root_url);
    println!("  Started: {} UTC", report.start_time);
    println!("  Finished: {} UTC", report.end_time);
    println!("  Elapsed: {:.2}s", report.elapsed_time);
    println!();

    let attempted = report.visited_count + report.failed_count;
    println!("Pages:");
    println!("  Visited: {}", report.visited_count);
    println!("  Failed: {}", report.failed_count);
    println!("  Skipped: {}", report.skipped_count);
    if report.pending_count > 0 {
        println!("  Pending (page cap reached): {}", report.pending_count);
    }
    println!();

    if !report.failed_urls.is_empty() {
        println!("Failed URLs ({}):", report.failed_urls.len());
        for url in &report.failed_urls {
            println!("  - {}", url);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        percentage(report.success_count, attempted),
        report.success_count,
        attempted
    );
}

/// Prints transform statistics to stdout
pub fn print_transform_report(report: &TransformReport) {
    println!("=== Transform Statistics ===\n");

    println!("Overview:");
    println!("  Started: {} UTC", report.start_time);
    println!("  Finished: {} UTC", report.end_time);
    println!("  Elapsed: {:.2}s", report.elapsed_time);
    println!();

    println!("Pages:");
    println!("  Total: {}", report.total_count);
    println!("  Chunked: {}", report.success_count);
    println!("  Skipped: {}", report.skipped_count);
    println!();

    if !report.skipped_urls.is_empty() {
        println!("Skipped URLs ({}):", report.skipped_urls.len());
        for url in &report.skipped_urls {
            println!("  - {}", url);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages chunked)",
        percentage(report.success_count, report.total_count),
        report.success_count,
        report.total_count
    );
}
