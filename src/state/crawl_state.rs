//! Crawl state: the FIFO work queue and the three terminal sets
//!
//! A URL belongs to at most one of queued, visited and failed, and a URL that
//! is skipped is never in any of the other three. Once a URL has left the
//! queue it can never be enqueued again.

use crate::state::PageState;
use crate::url::CanonicalUrl;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// A URL waiting in the work queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The canonical URL to fetch
    pub url: CanonicalUrl,

    /// Link distance from the seed (the seed is depth 0)
    pub depth: u32,
}

/// Single-owner crawl state
#[derive(Debug, Default)]
pub struct CrawlState {
    queue: VecDeque<QueuedUrl>,
    queued: HashSet<CanonicalUrl>,
    visited: Vec<CanonicalUrl>,
    visited_set: HashSet<CanonicalUrl>,
    failed: BTreeSet<CanonicalUrl>,
    skipped: BTreeSet<String>,
}

impl CrawlState {
    /// Creates an empty crawl state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a crawl state whose queue holds only the seed
    pub fn with_seed(seed: CanonicalUrl) -> Self {
        let mut state = Self::new();
        state.enqueue(seed, 0);
        state
    }

    /// Returns the state of a URL, or None if it has never been classified
    ///
    /// `url` may be a canonical URL or a raw href recorded as skipped.
    pub fn state_of(&self, url: &str) -> Option<PageState> {
        if self.queued.contains(url) {
            Some(PageState::Queued)
        } else if self.visited_set.contains(url) {
            Some(PageState::Visited)
        } else if self.failed.contains(url) {
            Some(PageState::Failed)
        } else if self.skipped.contains(url) {
            Some(PageState::Skipped)
        } else {
            None
        }
    }

    /// Returns true if the URL is queued, visited, failed or skipped
    pub fn is_known(&self, url: &CanonicalUrl) -> bool {
        self.state_of(url.as_str()).is_some()
    }

    /// Appends a URL to the tail of the queue
    ///
    /// # Returns
    ///
    /// * `true` - The URL was enqueued
    /// * `false` - The URL was already known and the state is unchanged
    pub fn enqueue(&mut self, url: CanonicalUrl, depth: u32) -> bool {
        if self.is_known(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Pops the oldest queued URL and marks it visited
    ///
    /// The URL only joins the ordered [`visited`](Self::visited) list once
    /// [`mark_fetched`](Self::mark_fetched) confirms it.
    pub fn pop_next(&mut self) -> Option<QueuedUrl> {
        let next = self.queue.pop_front()?;
        self.queued.remove(&next.url);
        self.visited_set.insert(next.url.clone());
        Some(next)
    }

    /// Appends a popped URL whose fetch succeeded to the visit order
    pub fn mark_fetched(&mut self, url: &CanonicalUrl) {
        debug_assert!(self.visited_set.contains(url));
        self.visited.push(url.clone());
    }

    /// Moves a popped URL whose fetch was exhausted into the failed set
    pub fn mark_failed(&mut self, url: &CanonicalUrl) {
        debug_assert!(self
            .state_of(url.as_str())
            .map_or(false, |s| s.can_transition_to(PageState::Failed)));

        self.visited_set.remove(url);
        self.failed.insert(url.clone());
    }

    /// Records a URL (or raw href) as skipped
    ///
    /// # Returns
    ///
    /// * `true` - The URL was newly recorded as skipped
    /// * `false` - The URL was already classified
    pub fn mark_skipped(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.state_of(&url).is_some() {
            return false;
        }
        self.skipped.insert(url)
    }

    /// Returns true when no URL is waiting to be fetched
    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Successfully fetched URLs in the order they were fetched
    pub fn visited(&self) -> &[CanonicalUrl] {
        &self.visited
    }

    /// Number of popped URLs that have not failed
    pub fn visited_count(&self) -> usize {
        self.visited_set.len()
    }

    /// Number of URLs whose fetch failed
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of skipped URLs and hrefs
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of URLs still waiting in the queue
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Number of URLs popped from the queue so far
    pub fn attempted_count(&self) -> usize {
        self.visited_set.len() + self.failed.len()
    }

    /// Visited URLs in lexicographic order
    pub fn sorted_visited(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.visited_set.iter().map(|u| u.to_string()).collect();
        urls.sort();
        urls
    }

    /// Failed URLs in lexicographic order
    pub fn sorted_failed(&self) -> Vec<String> {
        self.failed.iter().map(|u| u.to_string()).collect()
    }

    /// Skipped URLs and hrefs in lexicographic order
    pub fn sorted_skipped(&self) -> Vec<String> {
        self.skipped.iter().cloned().collect()
    }

    /// URLs still queued, in queue order
    pub fn pending(&self) -> Vec<String> {
        self.queue.iter().map(|q| q.url.to_string()).collect()
    }
}
