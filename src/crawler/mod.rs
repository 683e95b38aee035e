//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML link extraction
//! - Request pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, CrawlOutcome, Crawler};
pub use fetcher::{
    build_http_client, fetch_once, retry_with_backoff, FetchError, Fetcher, Page, RetryPolicy,
};
pub use parser::extract_hrefs;
pub use scheduler::{effective_delay, Pacer, MAX_CRAWL_DELAY};
