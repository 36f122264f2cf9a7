//! Scheduler for managing the crawl frontier and budget
//!
//! This module handles:
//! - Priority queue management for targets to fetch
//! - The visited set, so each normalized URL is fetched at most once
//! - Depth and page budget enforcement
//! - Tracking in-flight targets so workers know when the crawl is over

use crate::state::{SkipReason, TargetKind};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use url::Url;

/// A normalized URL scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: Url,

    /// Link distance from the root; assets carry their page's depth
    pub depth: u32,

    pub kind: TargetKind,
}

impl CrawlTarget {
    pub fn page(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            kind: TargetKind::Page,
        }
    }

    pub fn asset(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            kind: TargetKind::Asset,
        }
    }
}

/// A target in the frontier with ordering information
#[derive(Debug, Clone)]
struct QueuedTarget {
    target: CrawlTarget,

    /// Priority value (lower is higher priority)
    priority: u32,

    /// Insertion order, for FIFO among equal priorities
    sequence: u64,
}

impl QueuedTarget {
    /// Assets of already-fetched pages go first, then pages by depth
    fn priority_for(target: &CrawlTarget) -> u32 {
        match target.kind {
            TargetKind::Asset => 0,
            TargetKind::Page => target.depth.saturating_add(1),
        }
    }
}

// Lower priority values, then lower sequence numbers, are popped first from the BinaryHeap
impl Ord for QueuedTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTarget {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedTarget {}

/// Depth and page limits for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    pub max_depth: u32,
    pub max_pages: u32,

    /// Pages that have entered fetching
    pub pages_fetched: u32,
}

impl CrawlBudget {
    pub fn new(max_depth: u32, max_pages: u32) -> Self {
        Self {
            max_depth,
            max_pages,
            pages_fetched: 0,
        }
    }

    pub fn allows_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    pub fn is_exhausted(&self) -> bool {
        self.pages_fetched >= self.max_pages
    }

    pub fn pages_remaining(&self) -> u32 {
        self.max_pages.saturating_sub(self.pages_fetched)
    }
}

/// What a worker should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextTarget {
    /// Fetch this target; the worker must call [`Scheduler::complete`] afterwards
    Ready(CrawlTarget),

    /// Dequeued but not fetched
    Skipped(CrawlTarget, SkipReason),

    /// Frontier is empty but other workers may still discover targets
    Wait,

    /// Frontier is empty and nothing is in flight
    Finished,
}

/// Scheduler manages the frontier, visited set and budget
///
/// A single scheduler is shared by all workers behind a mutex, so the
/// visited check-and-insert in [`Scheduler::offer`] is atomic with respect
/// to other workers.
#[derive(Debug)]
pub struct Scheduler {
    frontier: BinaryHeap<QueuedTarget>,
    visited: HashSet<Url>,
    budget: CrawlBudget,
    in_flight: usize,
    next_sequence: u64,
}

impl Scheduler {
    pub fn new(max_depth: u32, max_pages: u32) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            visited: HashSet::new(),
            budget: CrawlBudget::new(max_depth, max_pages),
            in_flight: 0,
            next_sequence: 0,
        }
    }

    /// Adds the root page at depth 0
    pub fn seed(&mut self, root: Url) -> Result<(), SkipReason> {
        self.offer(CrawlTarget::page(root, 0))
    }

    /// Offers a normalized target to the frontier
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The target was accepted and marked visited
    /// * `Err(SkipReason)` - The target was rejected; the visited set is
    ///   unchanged unless it was already present
    pub fn offer(&mut self, target: CrawlTarget) -> Result<(), SkipReason> {
        if !self.budget.allows_depth(target.depth) {
            return Err(SkipReason::DepthExceeded);
        }

        if target.kind == TargetKind::Page && self.budget.is_exhausted() {
            return Err(SkipReason::BudgetExceeded);
        }

        if !self.visited.insert(target.url.clone()) {
            return Err(SkipReason::AlreadyVisited);
        }

        let queued = QueuedTarget {
            priority: QueuedTarget::priority_for(&target),
            sequence: self.next_sequence,
            target,
        };
        self.next_sequence += 1;
        self.frontier.push(queued);

        Ok(())
    }

    /// Pops the next target
    ///
    /// Pages that reach the head of the queue after the page budget is
    /// exhausted are returned as [`NextTarget::Skipped`]. Assets are still
    /// fetched.
    pub fn next_target(&mut self) -> NextTarget {
        let Some(queued) = self.frontier.pop() else {
            return if self.in_flight > 0 {
                NextTarget::Wait
            } else {
                NextTarget::Finished
            };
        };

        let target = queued.target;

        if target.kind == TargetKind::Page {
            if self.budget.is_exhausted() {
                return NextTarget::Skipped(target, SkipReason::BudgetExceeded);
            }
            self.budget.pages_fetched += 1;
        }

        self.in_flight += 1;
        NextTarget::Ready(target)
    }

    /// Marks a previously returned [`NextTarget::Ready`] target as done
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn budget(&self) -> &CrawlBudget {
        &self.budget
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }
}
