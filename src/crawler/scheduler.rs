//! Request pacing for the single-site crawl
//!
//! The crawl talks to one origin, so pacing is a single "last request"
//! timestamp and a minimum spacing between requests. The spacing is the
//! larger of the configured request delay and the robots.txt crawl delay.

use std::time::{Duration, Instant};

/// Upper bound on a robots.txt crawl delay
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(30);

/// Enforces a minimum delay between consecutive requests
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Minimum spacing between two requests
    min_delay: Duration,

    /// When the previous request was sent
    last_request_time: Option<Instant>,

    /// Number of requests sent so far
    request_count: u64,
}

impl Pacer {
    /// Creates a pacer with the given minimum spacing
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request_time: None,
            request_count: 0,
        }
    }

    /// The spacing currently enforced
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Raises the spacing to at least `delay`
    pub fn raise_min_delay(&mut self, delay: Duration) {
        self.min_delay = self.min_delay.max(delay);
    }

    /// Number of requests recorded
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Calculates the time until the next request may be sent
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_delay {
            Some(self.min_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request was sent at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Waits until the next request may be sent, then records it
    pub async fn wait_turn(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Pacing next request, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }
}

/// Calculates the effective delay between requests
///
/// This takes the maximum of:
/// - The configured request delay
/// - The robots.txt crawl delay (if specified), capped at [`MAX_CRAWL_DELAY`]
///
/// # Arguments
///
/// * `request_delay` - The configured request delay
/// * `robots_delay_secs` - Crawl-delay from robots.txt, in seconds
pub fn effective_delay(request_delay: Duration, robots_delay_secs: Option<f64>) -> Duration {
    let robots_delay = robots_delay_secs
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_or(MAX_CRAWL_DELAY, |delay| delay.min(MAX_CRAWL_DELAY))
        })
        .unwrap_or(Duration::ZERO);

    request_delay.max(robots_delay)
}
