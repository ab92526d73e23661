//! Editor State Interface
//!
//! Structured, read-only views of a session for frontends, plus the change records delivered
//! to subscribers.
//!
//! # Example
//!
//! ```rust
//! use line_editor_core::{EditorSession, MonospaceOracle, StateChangeType};
//! use std::sync::{Arc, Mutex};
//!
//! let mut session = EditorSession::new("hello", MonospaceOracle::new(40)).unwrap();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! session.subscribe(move |change| {
//!     sink.lock().unwrap().push(change.change_type);
//! });
//!
//! session.insert_text("!").unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![StateChangeType::DocumentModified]);
//! assert!(session.get_document_state().is_dirty);
//! ```

/// Document state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    /// Number of lines (never zero).
    pub line_count: usize,
    /// Characters of portable text, newlines included.
    pub char_count: usize,
    /// Whether the text differs from the clean baseline.
    pub is_dirty: bool,
    /// Session version number (incremented on every change)
    pub version: u64,
}

/// Undo/redo stack state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRedoState {
    /// Can undo
    pub can_undo: bool,
    /// Can redo
    pub can_redo: bool,
    /// Undo stack depth
    pub undo_depth: usize,
    /// Redo stack depth
    pub redo_depth: usize,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// A new document replaced the old one
    DocumentLoaded,
    /// Document content modified
    DocumentModified,
    /// Cursor moved or selection changed
    CursorMoved,
    /// Viewport re-measured
    ViewportChanged,
    /// Undo or redo restored a snapshot
    HistoryRestored,
}

/// State change record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// Dirty flag after the change
    pub is_dirty: bool,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(
        change_type: StateChangeType,
        old_version: u64,
        new_version: u64,
        is_dirty: bool,
    ) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            is_dirty,
        }
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;
