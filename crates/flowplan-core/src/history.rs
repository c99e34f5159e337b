//! Bounded undo/redo stacks.

use std::collections::VecDeque;

use flowplan_domain::HistoryAction;

/// Maximum number of actions retained on each stack.
pub const HISTORY_LIMIT: usize = 15;

/// Whether a mutation is recorded on the undo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    #[default]
    Record,
    /// Apply without touching either stack (replays, remote restores).
    Skip,
}

/// Most-recent-first stack that silently evicts its oldest entry when full.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<HistoryAction>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_LIMIT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, action: HistoryAction) {
        self.entries.push_front(action);
        self.entries.truncate(self.capacity);
    }

    pub fn pop(&mut self) -> Option<HistoryAction> {
        self.entries.pop_front()
    }

    pub fn peek(&self) -> Option<&HistoryAction> {
        self.entries.front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// Iterates from the most recent action to the oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryAction> {
        self.entries.iter()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
