//! Undo/redo stack of full scene snapshots
//!
//! Every entry holds a complete serialized scene. Restoring an entry replaces
//! the whole graph, which trades memory for not having to invert individual
//! edits.

use crate::constants::history::DEFAULT_LIMIT;

use super::document::GraphDocument;

/// One step of the edit history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub description: String,
    pub snapshot: GraphDocument,
    pub set_modified: bool,
}

/// Bounded snapshot stack with a cursor on the current step
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<HistoryEntry>,
    current_step: Option<usize>,
    limit: usize,
}

impl History {
    /// Creates an empty history holding at most `limit` entries
    pub fn new(limit: usize) -> Self {
        Self {
            stack: Vec::new(),
            current_step: None,
            limit: limit.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.current_step = None;
    }

    /// Pushes an entry after the cursor.
    ///
    /// Entries beyond the cursor (the redo branch) are dropped first. When the
    /// stack is full the oldest entry is evicted.
    pub fn push(&mut self, entry: HistoryEntry) {
        match self.current_step {
            Some(step) => self.stack.truncate(step + 1),
            None => self.stack.clear(),
        }

        if self.stack.len() >= self.limit {
            self.stack.remove(0);
        }

        self.stack.push(entry);
        self.current_step = Some(self.stack.len() - 1);
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current_step, Some(step) if step > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.current_step {
            Some(step) => step + 1 < self.stack.len(),
            None => false,
        }
    }

    /// Moves the cursor one entry back and returns the entry to restore
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        let step = self.current_step? - 1;
        self.current_step = Some(step);
        self.stack.get(step)
    }

    /// Moves the cursor one entry forward and returns the entry to restore
    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        let step = self.current_step? + 1;
        self.current_step = Some(step);
        self.stack.get(step)
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.current_step.and_then(|step| self.stack.get(step))
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Changes the capacity, evicting the oldest entries if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        let excess = self.stack.len().saturating_sub(self.limit);
        if excess > 0 {
            self.stack.drain(..excess);
            self.current_step = self.current_step.map(|step| step.saturating_sub(excess));
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(description: &str) -> HistoryEntry {
        HistoryEntry {
            description: description.to_string(),
            snapshot: GraphDocument::default(),
            set_modified: false,
        }
    }

    fn descriptions(history: &History) -> Vec<&str> {
        history
            .entries()
            .iter()
            .map(|e| e.description.as_str())
            .collect()
    }

    #[test]
    fn test_empty_history_is_a_no_op() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.step_back().is_none());
        assert!(history.step_forward().is_none());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_cursor_moves() {
        let mut history = History::default();
        history.push(entry("a"));
        history.push(entry("b"));
        history.push(entry("c"));

        assert_eq!(history.step_back().unwrap().description, "b");
        assert_eq!(history.step_back().unwrap().description, "a");
        assert!(history.step_back().is_none());
        assert_eq!(history.step_forward().unwrap().description, "b");
        assert_eq!(history.step_forward().unwrap().description, "c");
        assert!(history.step_forward().is_none());
    }

    #[test]
    fn test_push_prunes_redo_branch() {
        let mut history = History::default();
        history.push(entry("a"));
        history.push(entry("b"));
        history.push(entry("c"));
        history.step_back();
        history.step_back();

        history.push(entry("d"));
        assert_eq!(descriptions(&history), vec!["a", "d"]);
        assert!(!history.can_redo());
        assert_eq!(history.current_step(), Some(1));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::new(3);
        for name in ["a", "b", "c", "d", "e"] {
            history.push(entry(name));
        }
        assert_eq!(descriptions(&history), vec!["c", "d", "e"]);
        assert_eq!(history.current_step(), Some(2));
        assert_eq!(history.current().unwrap().description, "e");
    }

    #[test]
    fn test_shrinking_limit_rebases_cursor() {
        let mut history = History::new(10);
        for name in ["a", "b", "c", "d"] {
            history.push(entry(name));
        }
        history.set_limit(2);
        assert_eq!(descriptions(&history), vec!["c", "d"]);
        assert_eq!(history.current().unwrap().description, "d");
    }
}
