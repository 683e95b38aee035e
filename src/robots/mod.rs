//! Robots.txt handling module
//!
//! The crawl stays on one origin, so robots.txt is fetched once at the start
//! of a run. Any failure to fetch it falls back to allowing everything.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::Fetcher;
use url::Url;

/// Fetches and parses robots.txt for the crawl origin
///
/// # Arguments
///
/// * `fetcher` - The fetcher used for the crawl
/// * `origin` - The site origin
/// * `agent` - The crawler's product token
///
/// # Returns
///
/// The parsed rules, or [`ParsedRobots::allow_all`] if robots.txt is missing
/// or cannot be fetched.
pub async fn fetch_robots(fetcher: &Fetcher, origin: &Url, agent: &str) -> ParsedRobots {
    let robots_url = match origin.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL for {}: {}", origin, e);
            return ParsedRobots::allow_all(agent);
        }
    };

    match fetcher.fetch(robots_url.as_str()).await {
        Ok(page) => {
            tracing::info!(url = %robots_url, bytes = page.body.len(), "Loaded robots.txt");
            ParsedRobots::from_content(&page.body, agent)
        }
        Err(e) => {
            tracing::info!(url = %robots_url, reason = %e, "No usable robots.txt, allowing all");
            ParsedRobots::allow_all(agent)
        }
    }
}
