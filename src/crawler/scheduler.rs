//! Scheduler for the breadth-first crawl frontier
//!
//! This module handles:
//! - The FIFO queue of (URL, depth) entries awaiting traversal
//! - The visited set of URLs already processed as primary documents
//! - The claimed set of URLs whose fetch has been started
//!
//! Visiting and claiming are kept apart: a sub-resource is claimed when its
//! fetch is dispatched but only visited when it is later dequeued as a primary
//! document. Both sets only grow.

use crate::config::CrawlBudget;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,

    /// Depth of the discovering document plus one; the seed is at depth 0
    pub depth: u32,
}

/// Owns the frontier, the visited set and the claimed set
#[derive(Debug, Default)]
pub struct Scheduler {
    frontier: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    visit_order: Vec<String>,
    claimed: HashSet<String>,
}

impl Scheduler {
    /// Creates a scheduler whose frontier holds only the seed at depth 0
    pub fn new(seed: Url) -> Self {
        let mut scheduler = Self::default();
        scheduler.push(seed, 0);
        scheduler
    }

    /// Appends an entry to the frontier tail
    pub fn push(&mut self, url: Url, depth: u32) {
        self.frontier.push_back(FrontierEntry { url, depth });
    }

    /// Pops the next entry to process and marks it visited
    ///
    /// Entries that were already visited or that lie deeper than the budget
    /// allows are discarded without being returned.
    pub fn next_entry(&mut self, budget: &CrawlBudget) -> Option<FrontierEntry> {
        while let Some(entry) = self.frontier.pop_front() {
            if self.visited.contains(entry.url.as_str()) {
                tracing::trace!("Skipping already visited {}", entry.url);
                continue;
            }
            if !budget.allows_depth(entry.depth) {
                tracing::trace!("Skipping {} at depth {}", entry.url, entry.depth);
                continue;
            }

            self.visited.insert(entry.url.to_string());
            self.visit_order.push(entry.url.to_string());
            return Some(entry);
        }
        None
    }

    /// Claims a URL for fetching
    ///
    /// Returns false if the URL was claimed before, in which case it must not
    /// be fetched again.
    pub fn claim(&mut self, url: &Url) -> bool {
        self.claimed.insert(url.to_string())
    }

    /// URLs processed as primary documents, in visit order
    pub fn visited_urls(&self) -> &[String] {
        &self.visit_order
    }

    pub fn visited_count(&self) -> usize {
        self.visit_order.len()
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }
}
