//! Configuration module for Help-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use help_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {} from {}", config.site.origin, config.site.seed_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ChunkerConfig, Config, CrawlerConfig, OpenAiConfig, OutputConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, read_api_key};
