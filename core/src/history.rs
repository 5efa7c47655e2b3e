//! Bounded snapshot history.
//!
//! Insertion-ordered, oldest first. Reads consume from the newest end;
//! capacity overflow evicts from the oldest end.

use crate::{
    error::{RewindError, RewindResult},
    snapshot::Snapshot,
};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 12;

/// Largest capacity a config may ask for.
pub const MAX_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl History {
    /// Create an empty history. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot, evicting the oldest entry on overflow.
    /// Returns the evicted snapshot, if any.
    pub fn push(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        self.entries.push_back(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Remove and return the most recently pushed snapshot.
    pub fn pop_newest(&mut self) -> RewindResult<Snapshot> {
        self.entries.pop_back().ok_or(RewindError::EmptyHistory)
    }

    pub fn newest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting oldest-first if the history is over it.
    /// Returns the number of evicted entries.
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity.max(1);
        let excess = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..excess);
        excess
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
