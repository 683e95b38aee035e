//! Output module for persisted crawl and transform records
//!
//! This module handles:
//! - The report and data record shapes
//! - Reading and writing records as JSON
//! - Printing report statistics

mod records;
pub mod stats;
mod storage;

pub use records::{
    compute_checksum, elapsed_seconds, format_timestamp, CrawlData, CrawlReport, RawPage,
    TransformData, TransformReport, TIMESTAMP_FORMAT,
};
pub use stats::{load_report, print_report, Report};
pub use storage::{
    read_record, write_crawl_output, write_record, write_transform_output, StorageError,
    DATA_FILE, REPORT_FILE,
};
