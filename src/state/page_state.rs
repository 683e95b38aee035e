/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a URL can be in during the crawl process.
use std::fmt;

/// Represents the current state of a URL in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL has been seen in a page but not yet classified
    Discovered,

    /// URL is in the work queue waiting to be fetched
    Queued,

    // ===== Terminal States =====
    /// URL was popped from the queue and fetched successfully
    Visited,

    /// Fetch failed after exhausting the retry budget
    Failed,

    /// URL is unparseable or outside the crawl scope
    Skipped,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (URL may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Discovered | Self::Queued)
    }

    /// Returns true if this state triggers link discovery
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if a URL may move from this state to `next`
    ///
    /// `Discovered → Queued | Skipped`, `Queued → Visited`, `Visited → Failed`
    /// (a visited URL whose fetch is exhausted). Terminal dead ends never move.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Queued)
                | (Self::Discovered, Self::Skipped)
                | (Self::Queued, Self::Visited)
                | (Self::Visited, Self::Failed)
        )
    }

    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Queued => "queued",
            Self::Visited => "visited",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
