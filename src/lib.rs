//! Help-Harvest: a documentation-site dataset builder
//!
//! This crate crawls a help centre breadth-first from a single seed URL and
//! turns the fetched pages into size-bounded text chunks ready for embedding.

pub mod chunker;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod transform;
pub mod url;

use thiserror::Error;

/// Main error type for Help-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL is outside the crawl scope: {url}")]
    SeedOutOfScope { url: String },

    #[error("Seed URL is disallowed by robots.txt: {url}")]
    SeedDisallowed { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] chunker::ExtractionError),

    #[error("Chunker error: {0}")]
    Chunker(#[from] chunker::ChunkerError),

    #[error("Storage error: {0}")]
    Storage(#[from] output::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Help-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use chunker::{Chunk, ChunkParser, HtmlChunker, Node, OpenAiChunker};
pub use config::Config;
pub use crawler::{CrawlOutcome, Crawler};
pub use state::{CrawlState, PageState};
pub use transform::{transform, TransformOutcome};
pub use url::{CanonicalUrl, SiteScope};
