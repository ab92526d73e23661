//! Snapshot-based undo/redo.
//!
//! Each entry is the portable text of the whole document plus the caret, taken around every
//! mutating operation. Restoring an entry rebuilds and reformats the document from its text.
//! Consecutive identical snapshots are stored once.

/// Default maximum number of stored snapshots.
pub const DEFAULT_MAX_UNDO: usize = 1000;

/// Document text and caret at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    /// Portable text of the document.
    pub text: String,
    /// Zero-based line index of the caret.
    pub caret_line: usize,
    /// Caret offset on that line.
    pub caret_offset: usize,
}

/// Linear history with a movable present position.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<HistorySnapshot>,
    /// Index of the entry matching the present state. Meaningless while `entries` is empty.
    current: usize,
    max_undo: usize,
}

impl HistoryStack {
    /// Empty history keeping at most `max_undo` snapshots.
    pub fn new(max_undo: usize) -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            max_undo: max_undo.max(1),
        }
    }

    /// Record `snapshot` as the present, discarding any redo entries.
    ///
    /// Returns `false` if it equals the present entry. Nothing is stored then, and redo
    /// entries are kept.
    pub fn save(&mut self, snapshot: HistorySnapshot) -> bool {
        if let Some(present) = self.entries.get(self.current) {
            if *present == snapshot {
                return false;
            }
            self.entries.truncate(self.current + 1);
        }

        self.entries.push(snapshot);
        if self.entries.len() > self.max_undo {
            self.entries.remove(0);
        }
        self.current = self.entries.len() - 1;
        tracing::trace!(depth = self.current, "history snapshot saved");
        true
    }

    /// Step back. `present` is saved first when its text differs from the present entry, so
    /// unsaved edits are not lost to redo. An empty history stays empty.
    pub fn undo(&mut self, present: HistorySnapshot) -> Option<HistorySnapshot> {
        let entry = self.entries.get(self.current)?;
        if entry.text != present.text {
            self.save(present);
        }
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        tracing::debug!(depth = self.current, "undo");
        self.entries.get(self.current).cloned()
    }

    /// Step forward.
    pub fn redo(&mut self) -> Option<HistorySnapshot> {
        if self.current + 1 >= self.entries.len() {
            return None;
        }
        self.current += 1;
        tracing::debug!(depth = self.current, "redo");
        self.entries.get(self.current).cloned()
    }

    /// Whether an undo would restore an earlier entry.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Whether a redo is available.
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Entries before the present.
    pub fn undo_depth(&self) -> usize {
        if self.entries.is_empty() {
            0
        } else {
            self.current
        }
    }

    /// Entries after the present.
    pub fn redo_depth(&self) -> usize {
        self.entries.len().saturating_sub(self.current + 1)
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = 0;
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str) -> HistorySnapshot {
        HistorySnapshot {
            text: text.to_string(),
            caret_line: 0,
            caret_offset: text.chars().count(),
        }
    }

    #[test]
    fn test_duplicate_snapshots_are_collapsed() {
        let mut history = HistoryStack::default();
        assert!(history.save(snap("a")));
        assert!(!history.save(snap("a")));
        assert!(history.save(snap("ab")));
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_undo_saves_unrecorded_present() {
        let mut history = HistoryStack::default();
        history.save(snap("a"));
        // "ab" was never saved; undo records it so redo can return to it.
        assert_eq!(history.undo(snap("ab")), Some(snap("a")));
        assert_eq!(history.redo(), Some(snap("ab")));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_save_discards_redo() {
        let mut history = HistoryStack::default();
        history.save(snap("a"));
        history.save(snap("b"));
        history.undo(snap("b"));
        assert!(history.can_redo());
        history.save(snap("c"));
        assert!(!history.can_redo());
        assert_eq!(history.undo(snap("c")), Some(snap("a")));
    }

    #[test]
    fn test_duplicate_save_keeps_redo() {
        let mut history = HistoryStack::default();
        history.save(snap("a"));
        history.save(snap("b"));
        history.undo(snap("b"));
        assert!(!history.save(snap("a")));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(snap("b")));
    }

    #[test]
    fn test_undo_past_bottom_is_none() {
        let mut history = HistoryStack::default();
        assert_eq!(history.undo(snap("")), None);
        assert_eq!(history.undo(snap("")), None);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_oldest_entry_dropped_at_capacity() {
        let mut history = HistoryStack::new(3);
        for text in ["a", "b", "c", "d"] {
            history.save(snap(text));
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(snap("d")), Some(snap("c")));
        assert_eq!(history.undo(snap("c")), Some(snap("b")));
        assert_eq!(history.undo(snap("b")), None);
    }
}
