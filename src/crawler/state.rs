//! Breadth-first crawl frontier

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting in the frontier together with its link depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: Url,
    pub depth: u32,
}

/// Frontier and visited set for one crawl invocation
///
/// A URL enters the queue at most once (`seen`) and is handed out for
/// fetching at most once (`visited`). Because the queue is FIFO and children
/// are enqueued one level deeper than their parent, depths come out in
/// non-decreasing order.
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    seen: HashSet<String>,
    queue: VecDeque<QueuedUrl>,
}

impl CrawlState {
    /// Creates a frontier seeded with the start URL at depth 0
    pub fn new(start: Url) -> Self {
        let mut state = Self::default();
        state.enqueue(start, 0);
        state
    }

    /// Adds a URL unless it was enqueued before
    ///
    /// # Returns
    ///
    /// `true` if the URL was added
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        tracing::trace!("Queued {} at depth {}", url, depth);
        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Pops the next unvisited URL and marks it visited
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        while let Some(queued) = self.queue.pop_front() {
            if self.visited.insert(queued.url.as_str().to_string()) {
                return Some(queued);
            }
        }
        None
    }

    /// Number of distinct URLs ever enqueued, start URL included
    pub fn discovered(&self) -> usize {
        self.seen.len()
    }

    /// Number of URLs handed out for fetching
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    /// URLs still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
