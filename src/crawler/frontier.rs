//! Crawl frontier: pending listing pages and the visited set
//!
//! The frontier is a LIFO stack, so the crawl is depth-first. Children are
//! pushed in reverse document order so they are popped in document order.

use crate::url::canonical_key;
use std::collections::HashSet;
use url::Url;

/// Position of a page in the site hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Index of years
    Root,
    /// Index of issue dates within a year
    Year,
    /// One page of results for an issue date
    IssueDate,
    /// A single patent
    Detail,
}

impl Level {
    /// Level of the links found on a page of this level
    pub fn child(&self) -> Option<Level> {
        match self {
            Self::Root => Some(Self::Year),
            Self::Year => Some(Self::IssueDate),
            Self::IssueDate => Some(Self::Detail),
            Self::Detail => None,
        }
    }
}

/// A page waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub level: Level,
    pub url: Url,
}

impl Task {
    pub fn new(level: Level, url: Url) -> Self {
        Self { level, url }
    }
}

/// Pending tasks plus every URL visited so far
#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<Task>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the root task
    pub fn new(root: Url) -> Self {
        Self {
            stack: vec![Task::new(Level::Root, root)],
            visited: HashSet::new(),
        }
    }

    /// Queues a single task to be popped next
    pub fn push(&mut self, task: Task) {
        self.stack.push(task);
    }

    /// Queues the links of one page so the first link is popped first
    pub fn push_children(&mut self, level: Level, urls: Vec<Url>) {
        self.stack
            .extend(urls.into_iter().rev().map(|url| Task::new(level, url)));
    }

    /// Takes the next task
    pub fn pop(&mut self) -> Option<Task> {
        self.stack.pop()
    }

    /// Records a URL as visited
    ///
    /// Returns false if it (or an equivalent spelling) was visited before.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(canonical_key(url))
    }

    /// Number of distinct URLs visited
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
