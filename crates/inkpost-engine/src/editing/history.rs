use std::collections::VecDeque;

/// A restorable editor state.
///
/// Selections are stored as plain-text offsets because node identities do
/// not survive re-parsing the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub markup: String,
    pub selection: Option<(usize, usize)>,
}

/// Bounded undo and redo stacks. Recording a new entry drops the redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth,
        }
    }

    /// Remembers the state from before a mutation.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.push_undo(entry);
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        if self.depth == 0 {
            return;
        }
        if self.undo.back() == Some(&entry) {
            return;
        }
        self.undo.push_back(entry);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
    }

    /// Swaps `current` for the previous state.
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let next = self.redo.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(markup: &str) -> HistoryEntry {
        HistoryEntry {
            markup: markup.to_string(),
            selection: None,
        }
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = History::new(10);
        history.record(entry("a"));
        assert_eq!(history.undo(entry("b")), Some(entry("a")));
        assert!(!history.can_undo());
        assert_eq!(history.redo(entry("a")), Some(entry("b")));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new(10);
        history.record(entry("a"));
        history.undo(entry("b"));
        history.record(entry("a"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut history = History::new(2);
        for markup in ["a", "b", "c"] {
            history.record(entry(markup));
        }
        assert_eq!(history.undo(entry("d")), Some(entry("c")));
        assert_eq!(history.undo(entry("c")), Some(entry("b")));
        assert_eq!(history.undo(entry("b")), None);
    }

    #[test]
    fn test_zero_depth_disables_history() {
        let mut history = History::new(0);
        history.record(entry("a"));
        assert!(!history.can_undo());
    }
}
