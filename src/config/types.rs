use serde::Deserialize;

/// Main configuration structure for Help-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub chunker: ChunkerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The documentation site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host every canonical URL is rebuilt on
    pub origin: String,

    /// Path prefix of in-scope pages
    #[serde(rename = "scope-prefix")]
    pub scope_prefix: String,

    /// Path markers excluding a sub-section from the scope
    #[serde(rename = "excluded-markers", default)]
    pub excluded_markers: Vec<String>,

    /// Seed URL (defaults to origin + scope prefix)
    #[serde(default)]
    pub seed: Option<String>,
}

impl SiteConfig {
    /// Returns the configured seed, or origin + scope prefix when none is set
    pub fn seed_url(&self) -> String {
        match &self.seed {
            Some(seed) => seed.clone(),
            None => format!(
                "{}{}",
                self.origin.trim_end_matches('/'),
                self.scope_prefix
            ),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Attempts per URL before it is recorded as failed
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff between attempts (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Minimum time between consecutive requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed (unbounded when absent)
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Whether robots.txt on the origin is honoured
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_attempts: 3,
            backoff_base_ms: 1000,
            request_delay_ms: 0,
            max_pages: 10_000,
            max_depth: None,
            respect_robots: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Native chunker configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Tags captured as text nodes
    pub tags: Vec<String>,

    /// Tags whose adjacent runs are merged and never split
    #[serde(rename = "inseparable-tags")]
    pub inseparable_tags: Vec<String>,

    /// Target chunk length (characters)
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Slack allowed above the target before a chunk is closed
    #[serde(rename = "chunk-size-buffer")]
    pub chunk_size_buffer: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            tags: ["h1", "h2", "h3", "h4", "h5", "h6", "p", "li"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            inseparable_tags: vec!["li".to_string()],
            chunk_size: 750,
            chunk_size_buffer: 30,
        }
    }
}

/// Remote (OpenAI-compatible) chunker configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat model name
    pub model: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the crawl report and raw corpus
    #[serde(rename = "raw-dir")]
    pub raw_dir: String,

    /// Directory receiving the transform report and chunks
    #[serde(rename = "processed-dir")]
    pub processed_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: "datasets/raw".to_string(),
            processed_dir: "datasets/processed".to_string(),
        }
    }
}
