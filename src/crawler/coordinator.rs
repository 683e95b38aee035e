//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop, which:
//! - Validates the seed against the site scope
//! - Loads robots.txt once for the origin
//! - Pops URLs in strict FIFO order and fetches them one at a time
//! - Classifies every discovered href as queued or skipped
//! - Produces the raw page corpus and the crawl report

use crate::config::{Config, CrawlerConfig};
use crate::crawler::parser::extract_hrefs;
use crate::crawler::scheduler::{effective_delay, Pacer};
use crate::crawler::Fetcher;
use crate::output::{elapsed_seconds, format_timestamp, CrawlData, CrawlReport, RawPage};
use crate::robots::{fetch_robots, ParsedRobots};
use crate::state::CrawlState;
use crate::url::{CanonicalUrl, SiteScope};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use url::Url;

/// The result of a completed crawl run
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Canonical seed URL
    pub root_url: String,

    /// Final crawl state
    pub state: CrawlState,

    /// Fetched pages keyed by canonical URL
    pub pages: BTreeMap<String, RawPage>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    /// Builds the crawl report
    pub fn report(&self) -> CrawlReport {
        let pending = self.state.pending();

        CrawlReport {
            root_url: self.root_url.clone(),
            visited_count: self.state.visited_count(),
            skipped_count: self.state.skipped_count(),
            success_count: self.pages.len(),
            failed_count: self.state.failed_count(),
            pending_count: pending.len(),
            visited_urls: self.state.sorted_visited(),
            skipped_urls: self.state.sorted_skipped(),
            failed_urls: self.state.sorted_failed(),
            pending_urls: pending,
            elapsed_time: elapsed_seconds(self.elapsed),
            start_time: format_timestamp(&self.started_at),
            end_time: format_timestamp(&self.finished_at),
        }
    }

    /// Consumes the outcome, returning the persisted corpus record
    pub fn into_data(self) -> CrawlData {
        CrawlData {
            report: self.report(),
            results: self.pages,
        }
    }
}

/// Main crawler structure
///
/// Owns the crawl scope, the fetcher and the pacer. A crawl runs on a single
/// task with exactly one request in flight.
pub struct Crawler {
    scope: SiteScope,
    fetcher: Fetcher,
    pacer: Pacer,
    config: CrawlerConfig,
    agent: String,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(HarvestError)` - The origin or HTTP client is invalid
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let scope = SiteScope::from_config(&config.site)?;
        let fetcher = Fetcher::from_config(&config.crawler, &config.user_agent)?;
        Ok(Self::with_fetcher(config, scope, fetcher))
    }

    /// Creates a crawler around an existing fetcher
    pub fn with_fetcher(config: &Config, scope: SiteScope, fetcher: Fetcher) -> Self {
        Self {
            scope,
            fetcher,
            pacer: Pacer::new(Duration::from_millis(config.crawler.request_delay_ms)),
            config: config.crawler.clone(),
            agent: config.user_agent.crawler_name.clone(),
        }
    }

    /// The crawl scope
    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }

    /// Runs a breadth-first crawl from `seed`
    ///
    /// The seed is checked before any network access. Individual page
    /// failures are recorded in the outcome and never abort the run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The corpus and final state
    /// * `Err(HarvestError::SeedOutOfScope)` - The seed is not in scope
    /// * `Err(HarvestError::SeedDisallowed)` - robots.txt forbids the seed
    /// * `Err(HarvestError::UrlError)` - The seed is not an absolute HTTP(S) URL
    pub async fn run(&mut self, seed: &str) -> Result<CrawlOutcome, HarvestError> {
        if !self.scope.is_in_scope(seed)? {
            return Err(HarvestError::SeedOutOfScope {
                url: seed.to_string(),
            });
        }
        let root = self.scope.canonicalize(seed)?;

        let started_at = Utc::now();
        let start_time = Instant::now();
        tracing::info!(seed = %root, "Starting crawl");

        let robots = if self.config.respect_robots {
            fetch_robots(&self.fetcher, self.scope.origin(), &self.agent).await
        } else {
            ParsedRobots::allow_all(&self.agent)
        };
        if !robots.is_allowed(root.as_str()) {
            return Err(HarvestError::SeedDisallowed {
                url: root.into_string(),
            });
        }
        self.pacer
            .raise_min_delay(effective_delay(self.pacer.min_delay(), robots.crawl_delay()));

        let mut state = CrawlState::with_seed(root.clone());
        let mut pages = BTreeMap::new();

        while !state.is_queue_empty() {
            if state.attempted_count() >= self.config.max_pages {
                tracing::warn!(
                    max_pages = self.config.max_pages,
                    pending = state.queued_count(),
                    "Page cap reached, stopping crawl"
                );
                break;
            }

            let Some(next) = state.pop_next() else {
                break;
            };
            tracing::debug!(url = %next.url, depth = next.depth, "Processing URL");

            self.pacer.wait_turn().await;
            let page = match self.fetcher.fetch(next.url.as_str()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        url = %next.url,
                        attempts = e.attempts(),
                        reason = %e,
                        "Marking page as failed"
                    );
                    state.mark_failed(&next.url);
                    continue;
                }
            };
            state.mark_fetched(&next.url);

            let base = self.link_base(&next.url);
            let hrefs = extract_hrefs(&page.body);
            self.discover(&mut state, &hrefs, &base, next.depth + 1, &robots);

            pages.insert(
                next.url.into_string(),
                RawPage::new(page.status_code, page.body),
            );

            let attempted = state.attempted_count();
            if attempted % 10 == 0 {
                let rate = attempted as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages fetched, {} queued, {} skipped, {:.2} pages/sec",
                    attempted,
                    state.queued_count(),
                    state.skipped_count(),
                    rate
                );
            }
        }

        let elapsed = start_time.elapsed();
        tracing::info!(
            visited = state.visited_count(),
            failed = state.failed_count(),
            skipped = state.skipped_count(),
            "Crawl completed in {:?}",
            elapsed
        );

        Ok(CrawlOutcome {
            root_url: root.into_string(),
            state,
            pages,
            started_at,
            finished_at: Utc::now(),
            elapsed,
        })
    }

    /// The URL relative links on a fetched page resolve against
    ///
    /// Falls back to the origin if the canonical URL does not parse back.
    fn link_base(&self, page: &CanonicalUrl) -> Url {
        match page.to_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    url = %page,
                    reason = %e,
                    "Resolving links against the origin instead of the page"
                );
                self.scope.origin().clone()
            }
        }
    }

    /// Classifies the hrefs found on one page
    ///
    /// Hrefs that cannot be canonicalized are recorded raw as skipped. Known
    /// URLs are ignored. The rest are enqueued if they are in scope, allowed
    /// by robots.txt and within the depth cap, and skipped otherwise.
    fn discover(
        &self,
        state: &mut CrawlState,
        hrefs: &[String],
        base: &Url,
        depth: u32,
        robots: &ParsedRobots,
    ) {
        for href in hrefs {
            let url = match self.scope.canonicalize_from(href, base) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(href = %href, reason = %e, "Failed to extract a canonical URL");
                    state.mark_skipped(href.as_str());
                    continue;
                }
            };

            if state.is_known(&url) {
                continue;
            }

            if !self.scope.contains(&url) {
                tracing::trace!(url = %url, "Out of scope");
                state.mark_skipped(url.into_string());
                continue;
            }

            if !robots.is_allowed(url.as_str()) {
                tracing::debug!(url = %url, "Disallowed by robots.txt");
                state.mark_skipped(url.into_string());
                continue;
            }

            if self.config.max_depth.is_some_and(|max| depth > max) {
                tracing::debug!(url = %url, depth, "Beyond max depth");
                state.mark_skipped(url.into_string());
                continue;
            }

            state.enqueue(url, depth);
        }
    }
}

/// Runs a complete crawl from the configured seed
///
/// # Example
///
/// ```no_run
/// use help_harvest::config::load_config;
/// use help_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(&config).await?;
/// println!("{} pages", outcome.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlOutcome, HarvestError> {
    let mut crawler = Crawler::new(config)?;
    crawler.run(&config.site.seed_url()).await
}
