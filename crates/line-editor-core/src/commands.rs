//! Command Interface Layer
//!
//! A unified command enum for hosts that prefer dispatching data over calling methods. Every
//! command maps onto one [`EditorSession`](crate::EditorSession) operation.
//!
//! # Example
//!
//! ```rust
//! use line_editor_core::{Command, EditCommand, EditorSession, MonospaceOracle};
//!
//! let mut session = EditorSession::new("", MonospaceOracle::new(80)).unwrap();
//!
//! session
//!     .execute(Command::Edit(EditCommand::InsertText {
//!         text: "# Title".to_string(),
//!     }))
//!     .unwrap();
//! session.execute(Command::Edit(EditCommand::InsertNewLine)).unwrap();
//!
//! assert_eq!(session.portable_text(), "# Title\n");
//! ```

use crate::cursor::Movement;
use crate::document::TextPoint;
use crate::layout::VisualPosition;

/// Text editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert text at the caret, replacing the selection. May contain newlines.
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Split the caret line at the caret.
    InsertNewLine,
    /// Insert a raw line directly below the caret line.
    InsertBelow {
        /// Raw line text.
        text: String,
    },
    /// Backspace: delete the selection, else one character before the caret.
    DeleteBefore,
    /// Delete key: delete the selection, else one character after the caret.
    DeleteAfter,
    /// Delete from the caret back to the start of the previous word.
    DeleteWordBefore,
    /// Delete from the caret to the end of the next word.
    DeleteWordAfter,
    /// Delete the current selection (no-op when collapsed).
    DeleteSelection,
    /// Move the lines covered by the selection up by one.
    ShiftLinesUp,
    /// Move the lines covered by the selection down by one.
    ShiftLinesDown,
    /// Undo last edit operation
    Undo,
    /// Redo last undone operation
    Redo,
}

/// Cursor & selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Move the caret, collapsing the selection.
    Move(Movement),
    /// Move the focus, extending the selection.
    Select(Movement),
    /// Place a collapsed caret (clamped to the document).
    SetCaret {
        /// Caret location.
        point: TextPoint,
    },
    /// Place a collapsed caret by wrapped row and column.
    SetCaretVisual {
        /// Zero-based line index.
        line: usize,
        /// Wrapped row within the line.
        row: usize,
        /// Column within the row.
        column: usize,
    },
    /// Set selection range
    SetSelection {
        /// Fixed end.
        anchor: TextPoint,
        /// Moving end.
        focus: TextPoint,
    },
    /// Select the whole document.
    SelectAll,
    /// Collapse the selection onto its focus.
    Collapse,
}

/// View commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// Re-measure the viewport through the width oracle.
    Resize,
    /// Switch to a monospace grid `columns` cells wide and re-measure.
    SetMonospaceColumns {
        /// Grid width in cells (must be greater than 0).
        columns: usize,
    },
    /// Get the caret's wrapped row and column.
    GetCaretVisual,
    /// Get the portable text of the selection.
    GetSelectedText,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands
    Edit(EditCommand),
    /// Cursor command
    Cursor(CursorCommand),
    /// View commands
    View(ViewCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Success, no return value
    Success,
    /// Undo/redo outcome: whether a snapshot was restored.
    Restored(bool),
    /// Success, returns text
    Text(String),
    /// Success, returns the new measure
    Measure(usize),
    /// Success, returns a wrapped position
    Visual(VisualPosition),
}
