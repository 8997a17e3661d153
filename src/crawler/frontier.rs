//! Breadth-first crawl frontier
//!
//! The frontier owns the work queue and the visited set. A key is never in
//! both at once, and is never queued twice.

use crate::url::CrawlTarget;
use std::collections::{HashSet, VecDeque};

/// FIFO work queue plus the set of keys already processed
#[derive(Debug, Default)]
pub struct Frontier {
    /// Targets waiting to be crawled, in discovery order
    queue: VecDeque<CrawlTarget>,

    /// Keys currently in `queue`
    queued: HashSet<String>,

    /// Keys already dequeued and processed
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier seeded with the start target
    pub fn new(start: CrawlTarget) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(start);
        frontier
    }

    /// Adds a target unless its key is already queued or visited
    ///
    /// # Returns
    ///
    /// `true` if the target was added
    pub fn enqueue(&mut self, target: CrawlTarget) -> bool {
        if self.visited.contains(&target.key) || self.queued.contains(&target.key) {
            return false;
        }

        self.queued.insert(target.key.clone());
        self.queue.push_back(target);
        true
    }

    /// Takes the oldest target and marks its key visited
    ///
    /// Targets whose key was visited in the meantime are skipped.
    pub fn pop_next(&mut self) -> Option<CrawlTarget> {
        while let Some(target) = self.queue.pop_front() {
            self.queued.remove(&target.key);
            if self.visited.insert(target.key.clone()) {
                return Some(target);
            }
            tracing::trace!("Skipping already visited {}", target.key);
        }
        None
    }

    /// Marks a key visited without dequeuing a target for it
    ///
    /// Used for the final URL of a redirect: any queued target with the same
    /// key is dropped so the document is not extracted twice.
    ///
    /// # Returns
    ///
    /// `true` if the key had not been visited before
    pub fn mark_visited(&mut self, key: &str) -> bool {
        if self.queued.remove(key) {
            self.queue.retain(|t| t.key != key);
        }
        self.visited.insert(key.to_string())
    }

    /// Returns true if the key was already processed
    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// Number of targets waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if no target is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of keys processed so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
