//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the lifecycle of a single URL (discovered, queued, visited, failed, skipped)
//! - `CrawlState`: the FIFO work queue plus the visited, failed and skipped sets

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::{CrawlState, QueuedUrl};
pub use page_state::PageState;
