//! Bounded, newest-first history lists.

use std::collections::VecDeque;
use std::fmt;

use cmdtree_types::color::Severity;

/// A history list capped at `limit` entries. New entries go to the front;
/// the oldest fall off the back.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    limit: usize,
}

impl<T> BoundedHistory<T> {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn push_front(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the capacity, dropping the oldest entries if needed.
    /// Returns whether any entries were dropped.
    pub fn set_limit(&mut self, limit: usize) -> bool {
        self.limit = limit.max(1);
        let before = self.entries.len();
        self.entries.truncate(self.limit);
        self.entries.len() != before
    }

    pub fn front(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Returns whether there was anything to clear.
    pub fn clear(&mut self) -> bool {
        let had_entries = !self.entries.is_empty();
        self.entries.clear();
        had_entries
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

impl<T: PartialEq> BoundedHistory<T> {
    /// Push unless `entry` equals the current front. Returns whether it was
    /// added.
    pub fn push_front_unique(&mut self, entry: T) -> bool {
        if self.entries.front() == Some(&entry) {
            return false;
        }
        self.push_front(entry);
        true
    }
}

/// One line of console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub severity: Severity,
}

impl OutputLine {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Normal => f.write_str(&self.text),
            other => write!(f, "{}: {}", other.label(), self.text),
        }
    }
}
