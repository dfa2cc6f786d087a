//! # Undo/Redo Stack
//!
//! Bounded stack of document snapshots.
//!
//! ## Design
//!
//! - Snapshots are whole forests of shared nodes, so pushing one is a vector
//!   of `Arc` clones, not a deep copy
//! - Pushing past the cap evicts the oldest entry first
//! - A cap of 0 means unlimited
//!
//! ## Example
//!
//! ```rust
//! use stencil_editor::UndoStack;
//!
//! let mut stack = UndoStack::with_max_levels(2);
//! stack.push("a");
//! stack.push("b");
//! stack.push("c");
//!
//! assert_eq!(stack.len(), 2);
//! assert_eq!(stack.pop(), Some("c"));
//! assert_eq!(stack.pop(), Some("b"));
//! assert_eq!(stack.pop(), None);
//! ```

use std::collections::VecDeque;

/// Bounded LIFO stack with FIFO eviction
#[derive(Debug, Clone, PartialEq)]
pub struct UndoStack<T> {
    /// Oldest first, most recent last
    entries: VecDeque<T>,

    /// Maximum number of levels (0 = unlimited)
    max_levels: usize,
}

impl<T> UndoStack<T> {
    /// Create a stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_levels,
        }
    }

    /// Push an entry, evicting the oldest if the cap is exceeded
    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);

        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            self.entries.pop_front();
        }
    }

    /// Pop the most recent entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    /// The most recent entry
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from oldest to most recent
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::with_max_levels(crate::state::DEFAULT_HISTORY_LIMIT)
    }
}
