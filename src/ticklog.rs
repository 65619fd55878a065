// src/ticklog.rs

use std::collections::VecDeque;

/// Bounded append-only diagnostic log, owned by the caller and lent to each
/// tick. Oldest entries are dropped once capacity is reached, so a long run
/// cannot grow without bound.
pub struct TickLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl TickLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(|s| s.as_str())
    }
}
