//! The crawl frontier: FIFO work queue with set-backed deduplication.
//!
//! A URL moves through exactly one path: queued → seen (at dequeue time), or
//! straight to rejected when link scoring turns it down. The `persisted` set
//! holds URLs recorded by previous runs of the same collection so they are
//! never re-enqueued.

use std::collections::{HashSet, VecDeque};

use docharvest_shared::CrawlSummary;

/// Work set of one crawl run. Mutated only by the engine between fetch
/// phases, never concurrently.
#[derive(Debug, Default)]
pub struct Frontier {
    to_visit: VecDeque<String>,
    queued: HashSet<String>,
    seen: Vec<String>,
    seen_set: HashSet<String>,
    rejected: Vec<String>,
    rejected_set: HashSet<String>,
    persisted: HashSet<String>,
}

impl Frontier {
    /// Create a frontier holding just the canonical seed URL.
    pub fn new(seed: String, persisted: HashSet<String>) -> Self {
        let mut frontier = Self {
            persisted,
            ..Self::default()
        };
        frontier.queued.insert(seed.clone());
        frontier.to_visit.push_back(seed);
        frontier
    }

    /// Pop up to `batch_size` not-yet-seen URLs from the front of the queue.
    ///
    /// Each chosen URL is inserted into `seen` at the moment it is chosen —
    /// this is the dedup barrier that keeps in-flight fetches from
    /// re-enqueueing themselves.
    pub fn next_batch(&mut self, batch_size: usize) -> Vec<String> {
        let mut batch = Vec::new();
        while batch.len() < batch_size {
            let Some(url) = self.to_visit.pop_front() else {
                break;
            };
            self.queued.remove(&url);
            if !self.seen_set.insert(url.clone()) {
                continue;
            }
            self.seen.push(url.clone());
            batch.push(url);
        }
        batch
    }

    /// Membership test run on every discovered link before scoring:
    /// anything already seen, queued, rejected, or recorded by a prior run
    /// is skipped silently.
    pub fn known(&self, url: &str) -> bool {
        self.seen_set.contains(url)
            || self.queued.contains(url)
            || self.rejected_set.contains(url)
            || self.persisted.contains(url)
    }

    /// Append an approved link to the back of the queue.
    pub fn enqueue(&mut self, url: String) {
        if self.queued.insert(url.clone()) {
            self.to_visit.push_back(url);
        }
    }

    /// Record a link that failed scoring.
    pub fn reject(&mut self, url: String) {
        if self.rejected_set.insert(url.clone()) {
            self.rejected.push(url);
        }
    }

    /// True when nothing is left to visit.
    pub fn is_empty(&self) -> bool {
        self.to_visit.is_empty()
    }

    /// Number of URLs dequeued so far.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Consume the frontier into the run summary.
    pub fn into_summary(self) -> CrawlSummary {
        CrawlSummary {
            seen: self.seen,
            to_visit: self.to_visit.into_iter().collect(),
            rejected: self.rejected,
        }
    }
}
