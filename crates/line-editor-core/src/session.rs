//! Editing session.
//!
//! [`EditorSession`] owns one document together with its caret, format pass, viewport and
//! history. Every mutating operation runs as one atomic history step, re-formats whatever it
//! dirtied before returning, and then notifies subscribers once.
//!
//! # Example
//!
//! ```rust
//! use line_editor_core::{EditorSession, MonospaceOracle, TextPoint};
//!
//! let mut session = EditorSession::new("# Title\nsome text", MonospaceOracle::new(80)).unwrap();
//! assert_eq!(session.document().lines()[1].indent(), 2);
//!
//! session.set_caret(TextPoint::new(1, usize::MAX));
//! session.insert_new_line().unwrap();
//! session.insert_text("- x").unwrap();
//!
//! let item = &session.document().lines()[2];
//! assert_eq!(item.list_level(), Some(1));
//! assert_eq!(item.indent(), 2);
//!
//! session.undo().unwrap();
//! assert_eq!(session.portable_text(), "# Title\nsome text\n");
//! ```

use crate::classifiers::{ClassifierSet, DEFAULT_INDENT_WIDTH};
use crate::clipboard::Clipboard;
use crate::commands::{Command, CommandResult, CursorCommand, EditCommand, ViewCommand};
use crate::cursor::{CaretPosition, Cursor, Movement, Selection};
use crate::document::{ContextReach, Document, LineId, TextPoint, char_slice, split_at_char};
use crate::error::EngineError;
use crate::format::{FormatPass, FormatReport, FormatScope};
use crate::history::{DEFAULT_MAX_UNDO, HistorySnapshot, HistoryStack};
use crate::layout::{
    DEFAULT_MAX_PROBE_LEN, LineMetrics, MonospaceOracle, Viewport, VisualPosition, WidthOracle,
};
use crate::line_ending::{self, LineEnding};
use crate::state::{
    DocumentState, StateChange, StateChangeCallback, StateChangeType, UndoRedoState,
};

/// Session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    /// Indentation added per heading level.
    pub indent_width: usize,
    /// Maximum number of history snapshots kept.
    pub max_undo: usize,
    /// Longest probe handed to the width oracle.
    pub max_probe_len: usize,
    /// Line ending used by [`EditorSession::export_text`] when the loaded text had none.
    pub line_ending: LineEnding,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            max_undo: DEFAULT_MAX_UNDO,
            max_probe_len: DEFAULT_MAX_PROBE_LEN,
            line_ending: LineEnding::Lf,
        }
    }
}

/// One document being edited.
///
/// Owns the [`Document`], the [`Cursor`], the [`FormatPass`] (classifiers and context), the
/// [`Viewport`] measure cache and the [`HistoryStack`]. Sessions are independent of each other.
pub struct EditorSession {
    document: Document,
    cursor: Cursor,
    format_pass: FormatPass,
    viewport: Viewport,
    history: HistoryStack,
    options: EditorOptions,
    line_ending: LineEnding,
    callbacks: Vec<StateChangeCallback>,
    command_history: Vec<Command>,
    version: u64,
    clean_text: String,
    atomic_depth: usize,
    last_format: FormatReport,
}

impl EditorSession {
    /// Load `text` with default options.
    pub fn new(text: &str, oracle: impl WidthOracle + 'static) -> Result<Self, EngineError> {
        Self::with_options(text, oracle, EditorOptions::default())
    }

    /// Load `text` with explicit options.
    pub fn with_options(
        text: &str,
        oracle: impl WidthOracle + 'static,
        options: EditorOptions,
    ) -> Result<Self, EngineError> {
        let mut format_pass = FormatPass::new(ClassifierSet::standard(options.indent_width));
        let mut document = Document::from_text(&line_ending::normalize(text));
        let last_format = format_pass.run(&mut document, FormatScope::All, None)?;
        let cursor = Cursor::collapsed(document_start(&document));
        let clean_text = document.to_portable_text();

        Ok(Self {
            document,
            cursor,
            format_pass,
            viewport: Viewport::new(Box::new(oracle), options.max_probe_len),
            history: HistoryStack::new(options.max_undo),
            options,
            line_ending: detect_line_ending(text, options.line_ending),
            callbacks: Vec::new(),
            command_history: Vec::new(),
            version: 0,
            clean_text,
            atomic_depth: 0,
            last_format,
        })
    }

    /// Replace the document with `text`. History is cleared and the new text is clean.
    pub fn load_document(&mut self, text: &str) -> Result<(), EngineError> {
        let mut document = Document::from_text(&line_ending::normalize(text));
        self.last_format = self
            .format_pass
            .run(&mut document, FormatScope::All, None)?;
        self.cursor = Cursor::collapsed(document_start(&document));
        self.clean_text = document.to_portable_text();
        self.document = document;
        self.history.clear();
        self.line_ending = detect_line_ending(text, self.options.line_ending);
        self.notify(StateChangeType::DocumentLoaded);
        Ok(())
    }

    // ---- queries -------------------------------------------------------------------------

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The caret/selection.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Options the session was created with.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Cached characters-per-row.
    pub fn measure(&self) -> usize {
        self.viewport.measure()
    }

    /// Session version, bumped by every notification.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// What the most recent format pass touched.
    pub fn last_format_report(&self) -> &FormatReport {
        &self.last_format
    }

    /// Line ending applied by [`export_text`](Self::export_text).
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Change the export line ending.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Whole document as LF-separated wrappable text.
    pub fn portable_text(&self) -> String {
        self.document.to_portable_text()
    }

    /// Portable text between two points.
    pub fn portable_text_range(&self, start: TextPoint, end: TextPoint) -> String {
        self.document.portable_text(start, end)
    }

    /// Portable text with the session's line ending applied, for persistence.
    pub fn export_text(&self) -> String {
        self.line_ending.apply_to_text(&self.portable_text())
    }

    /// The caret (focus endpoint).
    pub fn caret(&self) -> CaretPosition {
        self.cursor.focus()
    }

    /// The caret as a line index and offset.
    pub fn caret_point(&self) -> TextPoint {
        TextPoint::new(self.caret_index(), self.cursor.focus().offset)
    }

    /// The caret's wrapped row and column.
    pub fn caret_visual(&self) -> VisualPosition {
        let point = self.caret_point();
        self.line_metrics(point.line)
            .map(|metrics| metrics.offset_to_visual(point.offset))
            .unwrap_or_default()
    }

    /// Geometry of the line at `index` at the current measure.
    pub fn line_metrics(&self, index: usize) -> Option<LineMetrics> {
        self.document
            .line(index)
            .map(|line| LineMetrics::of(line, self.viewport.measure()))
    }

    /// Portable text of the selection; empty when collapsed.
    pub fn selected_text(&self) -> String {
        if self.cursor.is_collapsed() {
            return String::new();
        }
        match self.cursor.selection().ordered_points(&self.document) {
            Some((start, end)) => self.document.portable_text(start, end),
            None => String::new(),
        }
    }

    /// Whether the text differs from the last clean baseline.
    pub fn is_dirty(&self) -> bool {
        self.document.to_portable_text() != self.clean_text
    }

    /// Make the current text the clean baseline (call after persisting).
    pub fn mark_clean(&mut self) {
        self.clean_text = self.document.to_portable_text();
    }

    /// Line/char counts, dirty flag and version.
    pub fn get_document_state(&self) -> DocumentState {
        let text = self.document.to_portable_text();
        DocumentState {
            line_count: self.document.len(),
            char_count: text.chars().count(),
            is_dirty: text != self.clean_text,
            version: self.version,
        }
    }

    /// History depths.
    pub fn get_undo_redo_state(&self) -> UndoRedoState {
        UndoRedoState {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
        }
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Subscribe to state changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    // ---- viewport ------------------------------------------------------------------------

    /// Re-measure after the host viewport changed size.
    pub fn resize_viewport(&mut self) -> usize {
        let measure = self.viewport.resize();
        self.notify(StateChangeType::ViewportChanged);
        measure
    }

    /// Replace the width oracle and re-measure.
    pub fn set_oracle(&mut self, oracle: impl WidthOracle + 'static) -> usize {
        let measure = self.viewport.set_oracle(Box::new(oracle));
        self.notify(StateChangeType::ViewportChanged);
        measure
    }

    // ---- caret ---------------------------------------------------------------------------

    /// Place a collapsed caret, clamping the point into the document.
    pub fn set_caret(&mut self, point: TextPoint) {
        self.cursor.set(self.position_at(point));
        self.notify(StateChangeType::CursorMoved);
    }

    /// Place a collapsed caret on a line by id. Unknown ids are ignored.
    pub fn set_caret_position(&mut self, position: CaretPosition) {
        let Some(line) = self.document.line_by_id(position.line) else {
            return;
        };
        let offset = position.offset.min(line.selectable_length());
        self.cursor.set(CaretPosition::new(position.line, offset));
        self.notify(StateChangeType::CursorMoved);
    }

    /// Place a collapsed caret by wrapped row and column on the line at `line_index`.
    pub fn set_caret_visual(&mut self, line_index: usize, row: usize, column: usize) {
        let index = line_index.min(self.document.len().saturating_sub(1));
        let Some(metrics) = self.line_metrics(index) else {
            return;
        };
        let offset = metrics.visual_to_offset(row, column);
        self.set_caret(TextPoint::new(index, offset));
    }

    /// Set anchor and focus (both clamped).
    pub fn set_selection(&mut self, anchor: TextPoint, focus: TextPoint) {
        let selection = Selection::new(self.position_at(anchor), self.position_at(focus));
        self.cursor.set_selection(selection);
        self.notify(StateChangeType::CursorMoved);
    }

    /// Select from the start of the first line to the end of the last.
    pub fn select_all(&mut self) {
        let last = self.document.len().saturating_sub(1);
        self.set_selection(TextPoint::new(0, 0), TextPoint::new(last, usize::MAX));
    }

    /// Collapse the selection onto its focus.
    pub fn collapse_selection(&mut self) {
        self.cursor.collapse();
        self.notify(StateChangeType::CursorMoved);
    }

    /// Move the caret, collapsing any selection.
    pub fn move_caret(&mut self, movement: Movement) {
        let measure = self.viewport.measure();
        self.cursor.move_by(&self.document, measure, movement, false);
        self.notify(StateChangeType::CursorMoved);
    }

    /// Move the focus, keeping the anchor.
    pub fn select(&mut self, movement: Movement) {
        let measure = self.viewport.measure();
        self.cursor.move_by(&self.document, measure, movement, true);
        self.notify(StateChangeType::CursorMoved);
    }

    // ---- history -------------------------------------------------------------------------

    /// Run `action` as one undo step: snapshot before, run, snapshot after.
    ///
    /// Nested calls join the outermost step. Notifications raised inside are suppressed.
    ///
    /// The outermost step notifies subscribers once: `DocumentModified` if the text changed,
    /// otherwise `CursorMoved` if only the caret did.
    pub fn run_atomic<T>(&mut self, action: impl FnOnce(&mut Self) -> T) -> T {
        let before = (self.atomic_depth == 0).then(|| self.snapshot());
        if let Some(before) = &before {
            self.history.save(before.clone());
        }
        self.atomic_depth += 1;
        let result = action(self);
        self.atomic_depth -= 1;

        if let Some(before) = before {
            let after = self.snapshot();
            let change_type = if after.text != before.text {
                Some(StateChangeType::DocumentModified)
            } else if after != before {
                Some(StateChangeType::CursorMoved)
            } else {
                None
            };
            self.history.save(after);
            if let Some(change_type) = change_type {
                self.notify(change_type);
            }
        }
        result
    }

    /// Restore the previous snapshot. Returns `false` at the bottom of the stack.
    pub fn undo(&mut self) -> Result<bool, EngineError> {
        let present = self.snapshot();
        let Some(snapshot) = self.history.undo(present) else {
            return Ok(false);
        };
        self.restore(snapshot)?;
        self.notify(StateChangeType::HistoryRestored);
        Ok(true)
    }

    /// Restore the next snapshot. Returns `false` when nothing was undone.
    pub fn redo(&mut self) -> Result<bool, EngineError> {
        let Some(snapshot) = self.history.redo() else {
            return Ok(false);
        };
        self.restore(snapshot)?;
        self.notify(StateChangeType::HistoryRestored);
        Ok(true)
    }

    // ---- edits ---------------------------------------------------------------------------

    /// Insert `text` at the caret, replacing the selection. Newlines split lines.
    ///
    /// The caret ends up the same number of characters from the end of its line as before.
    pub fn insert_text(&mut self, text: &str) -> Result<(), EngineError> {
        let text = line_ending::normalize(text).into_owned();
        if text.is_empty() {
            return Ok(());
        }
        self.run_atomic(|session| session.insert_text_inner(&text))
    }

    /// Split the caret line at the caret; the caret moves to the start of the new line's text.
    pub fn insert_new_line(&mut self) -> Result<(), EngineError> {
        self.run_atomic(|session| {
            session.delete_selection_inner()?;
            let index = session.caret_index();
            let Some(line) = session.document.line(index) else {
                return Ok(());
            };
            let at = line.text_index(session.cursor.focus().offset);
            let (head, tail) = split_at_char(line.text(), at);
            let (head, tail) = (head.to_string(), tail.to_string());

            session.set_line_text(index, head);
            let new_id = session.document.insert_line(index + 1, &tail);
            session.reformat(FormatScope::Dirty)?;
            session.place_caret_at_indent(new_id);
            Ok(())
        })
    }

    /// Insert `raw_line` as a new line directly below the caret line; the caret moves to its end.
    pub fn insert_below(&mut self, raw_line: &str) -> Result<(), EngineError> {
        let raw = line_ending::normalize(raw_line).into_owned();
        self.run_atomic(|session| {
            let index = session.caret_index();
            let mut last = None;
            for (i, piece) in raw.split('\n').enumerate() {
                last = Some(session.document.insert_line(index + 1 + i, piece));
            }
            session.reformat(FormatScope::Dirty)?;
            if let Some(id) = last {
                session.place_caret_from_end(id, 0);
            }
            Ok(())
        })
    }

    /// Backspace.
    pub fn delete_before(&mut self) -> Result<(), EngineError> {
        self.run_atomic(|session| {
            if !session.cursor.is_collapsed() {
                return session.delete_selection_inner();
            }
            let index = session.caret_index();
            let Some(line) = session.document.line(index) else {
                return Ok(());
            };
            let at = line.text_index(session.cursor.focus().offset);
            if at > 0 {
                let id = line.id();
                let chars_after = line.wrappable_length() - at;
                let text = line.text();
                let joined = format!(
                    "{}{}",
                    char_slice(text, 0, at - 1),
                    char_slice(text, at, usize::MAX)
                );
                session.set_line_text(index, joined);
                session.reformat(FormatScope::Dirty)?;
                session.place_caret_from_end(id, chars_after);
                Ok(())
            } else if index > 0 {
                session.join_with_next(index - 1)
            } else {
                Ok(())
            }
        })
    }

    /// Forward delete.
    pub fn delete_after(&mut self) -> Result<(), EngineError> {
        self.run_atomic(|session| {
            if !session.cursor.is_collapsed() {
                return session.delete_selection_inner();
            }
            let index = session.caret_index();
            let Some(line) = session.document.line(index) else {
                return Ok(());
            };
            let at = line.text_index(session.cursor.focus().offset);
            let length = line.wrappable_length();
            if at < length {
                let id = line.id();
                let text = line.text();
                let joined = format!(
                    "{}{}",
                    char_slice(text, 0, at),
                    char_slice(text, at + 1, usize::MAX)
                );
                session.set_line_text(index, joined);
                session.reformat(FormatScope::Dirty)?;
                session.place_caret_from_end(id, length - at - 1);
                Ok(())
            } else if index + 1 < session.document.len() {
                session.join_with_next(index)
            } else {
                Ok(())
            }
        })
    }

    /// Delete back to the start of the previous word (crossing lines).
    pub fn delete_word_before(&mut self) -> Result<(), EngineError> {
        self.delete_word(Movement::WordStart)
    }

    /// Delete forward to the end of the next word (crossing lines).
    pub fn delete_word_after(&mut self) -> Result<(), EngineError> {
        self.delete_word(Movement::WordEnd)
    }

    /// Delete the current selection. No-op when collapsed.
    pub fn delete_selection(&mut self) -> Result<(), EngineError> {
        self.run_atomic(Self::delete_selection_inner)
    }

    /// Delete an explicit selection, collapsing the caret at its start.
    pub fn delete_selection_explicit(&mut self, selection: Selection) -> Result<(), EngineError> {
        self.run_atomic(|session| session.delete_selection_explicit_inner(selection))
    }

    /// Move the selected lines (or the caret line) above their upper neighbour.
    ///
    /// Lines are only moved; indentation is refreshed by the next format pass.
    pub fn shift_lines_up(&mut self) -> Result<bool, EngineError> {
        self.run_atomic(|session| {
            let (first, last) = session.selected_line_span();
            let moved = session.document.move_block_up(first, last + 1);
            if moved {
                session.mark_moved_dirty(first - 1, last);
            }
            Ok(moved)
        })
    }

    /// Move the selected lines (or the caret line) below their lower neighbour.
    pub fn shift_lines_down(&mut self) -> Result<bool, EngineError> {
        self.run_atomic(|session| {
            let (first, last) = session.selected_line_span();
            let moved = session.document.move_block_down(first, last + 1);
            if moved {
                session.mark_moved_dirty(first, last + 1);
            }
            Ok(moved)
        })
    }

    // ---- clipboard -----------------------------------------------------------------------

    /// Copy the selection's portable text. Returns `false` when nothing is selected.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) -> bool {
        if self.cursor.is_collapsed() {
            return false;
        }
        clipboard.write_text(&self.selected_text());
        true
    }

    /// Copy, then delete the selection.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, EngineError> {
        if !self.copy(clipboard) {
            return Ok(false);
        }
        self.delete_selection()?;
        Ok(true)
    }

    /// Insert the clipboard text (any line-ending convention) at the caret.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) -> Result<bool, EngineError> {
        let Some(text) = clipboard.read_text() else {
            return Ok(false);
        };
        self.insert_text(&text)?;
        Ok(true)
    }

    // ---- commands ------------------------------------------------------------------------

    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, EngineError> {
        self.command_history.push(command.clone());
        match command {
            Command::Edit(edit) => self.execute_edit(edit),
            Command::Cursor(cursor) => Ok(self.execute_cursor(cursor)),
            Command::View(view) => self.execute_view(view),
        }
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, EngineError> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            results.push(self.execute(command)?);
        }
        Ok(results)
    }

    /// Get command history
    pub fn get_command_history(&self) -> &[Command] {
        &self.command_history
    }

    fn execute_edit(&mut self, command: EditCommand) -> Result<CommandResult, EngineError> {
        match command {
            EditCommand::InsertText { text } => self.insert_text(&text)?,
            EditCommand::InsertNewLine => self.insert_new_line()?,
            EditCommand::InsertBelow { text } => self.insert_below(&text)?,
            EditCommand::DeleteBefore => self.delete_before()?,
            EditCommand::DeleteAfter => self.delete_after()?,
            EditCommand::DeleteWordBefore => self.delete_word_before()?,
            EditCommand::DeleteWordAfter => self.delete_word_after()?,
            EditCommand::DeleteSelection => self.delete_selection()?,
            EditCommand::ShiftLinesUp => {
                self.shift_lines_up()?;
            }
            EditCommand::ShiftLinesDown => {
                self.shift_lines_down()?;
            }
            EditCommand::Undo => return Ok(CommandResult::Restored(self.undo()?)),
            EditCommand::Redo => return Ok(CommandResult::Restored(self.redo()?)),
        }
        Ok(CommandResult::Success)
    }

    fn execute_cursor(&mut self, command: CursorCommand) -> CommandResult {
        match command {
            CursorCommand::Move(movement) => self.move_caret(movement),
            CursorCommand::Select(movement) => self.select(movement),
            CursorCommand::SetCaret { point } => self.set_caret(point),
            CursorCommand::SetCaretVisual { line, row, column } => {
                self.set_caret_visual(line, row, column)
            }
            CursorCommand::SetSelection { anchor, focus } => self.set_selection(anchor, focus),
            CursorCommand::SelectAll => self.select_all(),
            CursorCommand::Collapse => self.collapse_selection(),
        }
        CommandResult::Success
    }

    fn execute_view(&mut self, command: ViewCommand) -> Result<CommandResult, EngineError> {
        match command {
            ViewCommand::Resize => Ok(CommandResult::Measure(self.resize_viewport())),
            ViewCommand::SetMonospaceColumns { columns } => {
                if columns == 0 {
                    return Err(EngineError::InvalidCommand(
                        "monospace viewport needs at least one column".to_string(),
                    ));
                }
                Ok(CommandResult::Measure(
                    self.set_oracle(MonospaceOracle::new(columns)),
                ))
            }
            ViewCommand::GetCaretVisual => Ok(CommandResult::Visual(self.caret_visual())),
            ViewCommand::GetSelectedText => Ok(CommandResult::Text(self.selected_text())),
        }
    }

    // ---- internals -----------------------------------------------------------------------

    fn notify(&mut self, change_type: StateChangeType) {
        if self.atomic_depth > 0 {
            return;
        }
        let old_version = self.version;
        self.version += 1;
        let change = StateChange::new(change_type, old_version, self.version, self.is_dirty());
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }

    fn caret_index(&self) -> usize {
        self.document
            .index_of(self.cursor.focus().line)
            .unwrap_or(0)
    }

    /// Clamp a point into the document and resolve its line id.
    fn position_at(&self, point: TextPoint) -> CaretPosition {
        let index = point.line.min(self.document.len().saturating_sub(1));
        match self.document.line(index) {
            Some(line) => CaretPosition::new(line.id(), point.offset.min(line.selectable_length())),
            None => self.cursor.focus(),
        }
    }

    fn snapshot(&self) -> HistorySnapshot {
        let point = self.caret_point();
        HistorySnapshot {
            text: self.document.to_portable_text(),
            caret_line: point.line,
            caret_offset: point.offset,
        }
    }

    fn restore(&mut self, snapshot: HistorySnapshot) -> Result<(), EngineError> {
        let mut document = Document::from_text(&snapshot.text);
        self.last_format = self
            .format_pass
            .run(&mut document, FormatScope::All, None)?;
        self.document = document;
        let caret = self.position_at(TextPoint::new(snapshot.caret_line, snapshot.caret_offset));
        self.cursor.set(caret);
        Ok(())
    }

    fn reformat(&mut self, scope: FormatScope) -> Result<(), EngineError> {
        self.last_format = self
            .format_pass
            .run(&mut self.document, scope, Some(&mut self.cursor))?;
        let fallback = document_start(&self.document);
        self.cursor.clamp_to(&self.document, fallback);
        Ok(())
    }

    fn set_line_text(&mut self, index: usize, text: String) {
        if let Some(line) = self.document.line_mut(index) {
            line.set_text(text);
        }
    }

    /// Collapse the caret `chars_after` characters before the end of line `id`.
    fn place_caret_from_end(&mut self, id: LineId, chars_after: usize) {
        if let Some(line) = self.document.line_by_id(id) {
            let offset = line.selectable_length() - chars_after.min(line.wrappable_length());
            self.cursor.set(CaretPosition::new(id, offset));
        }
    }

    fn place_caret_at_indent(&mut self, id: LineId) {
        if let Some(line) = self.document.line_by_id(id) {
            self.cursor.set(CaretPosition::new(id, line.indent()));
        }
    }

    fn insert_text_inner(&mut self, text: &str) -> Result<(), EngineError> {
        self.delete_selection_inner()?;
        let index = self.caret_index();
        let Some(line) = self.document.line(index) else {
            return Ok(());
        };
        let id = line.id();
        let at = line.text_index(self.cursor.focus().offset);
        let (head, tail) = split_at_char(line.text(), at);
        let (head, tail) = (head.to_string(), tail.to_string());
        let chars_after = tail.chars().count();

        let mut pieces = text.split('\n');
        let first = pieces.next().unwrap_or_default();
        let rest: Vec<&str> = pieces.collect();

        let target = match rest.split_last() {
            None => {
                self.set_line_text(index, format!("{head}{first}{tail}"));
                id
            }
            Some((last, middle)) => {
                self.set_line_text(index, format!("{head}{first}"));
                let mut at_index = index;
                for piece in middle {
                    at_index += 1;
                    self.document.insert_line(at_index, piece);
                }
                self.document
                    .insert_line(at_index + 1, &format!("{last}{tail}"))
            }
        };

        self.reformat(FormatScope::Dirty)?;
        self.place_caret_from_end(target, chars_after);
        Ok(())
    }

    /// Append line `index + 1` to line `index`. Always re-formats the whole document.
    fn join_with_next(&mut self, index: usize) -> Result<(), EngineError> {
        let (Some(upper), Some(lower)) = (self.document.line(index), self.document.line(index + 1))
        else {
            return Ok(());
        };
        let id = upper.id();
        let joined = format!("{}{}", upper.text(), lower.text());
        let chars_after = lower.wrappable_length();

        self.set_line_text(index, joined);
        self.document.remove_line(index + 1);
        self.reformat(FormatScope::All)?;
        self.place_caret_from_end(id, chars_after);
        Ok(())
    }

    fn delete_word(&mut self, movement: Movement) -> Result<(), EngineError> {
        self.run_atomic(|session| {
            if !session.cursor.is_collapsed() {
                return session.delete_selection_inner();
            }
            let mut probe = session.cursor;
            probe.move_by(&session.document, session.viewport.measure(), movement, true);
            session.delete_selection_explicit_inner(probe.selection())
        })
    }

    fn delete_selection_inner(&mut self) -> Result<(), EngineError> {
        if self.cursor.is_collapsed() {
            return Ok(());
        }
        self.delete_selection_explicit_inner(self.cursor.selection())
    }

    fn delete_selection_explicit_inner(&mut self, selection: Selection) -> Result<(), EngineError> {
        let Some((start, end)) = selection.ordered_points(&self.document) else {
            return Ok(());
        };
        let (Some(first), Some(last)) = (self.document.line(start.line), self.document.line(end.line))
        else {
            return Ok(());
        };
        let first_id = first.id();
        let from = first.text_index(start.offset);
        let to = last.text_index(end.offset);

        if start.line == end.line && from >= to {
            let offset = start.offset.min(first.selectable_length());
            self.cursor.set(CaretPosition::new(first_id, offset));
            return Ok(());
        }

        let head = char_slice(first.text(), 0, from).to_string();
        let tail = char_slice(last.text(), to, usize::MAX).to_string();
        let chars_after = tail.chars().count();

        let mut reach = ContextReach::Line;
        if end.line > start.line {
            let removed = self.document.drain_lines(start.line + 1, end.line + 1);
            reach = removed
                .iter()
                .map(|line| ContextReach::of(line.line_type()))
                .max()
                .unwrap_or(ContextReach::Line);
        }

        self.set_line_text(start.line, format!("{head}{tail}"));
        self.document.mark_dirty_after(start.line, reach);
        self.reformat(FormatScope::Dirty)?;
        self.place_caret_from_end(first_id, chars_after);
        Ok(())
    }

    /// First and last line index covered by the selection (or the caret line).
    fn selected_line_span(&self) -> (usize, usize) {
        match self.cursor.selection().ordered_points(&self.document) {
            Some((start, end)) => (start.line, end.line),
            None => {
                let index = self.caret_index();
                (index, index)
            }
        }
    }

    /// Flag lines `first..=last` and everything their new context reaches.
    fn mark_moved_dirty(&mut self, first: usize, last: usize) {
        for index in first..=last {
            self.document.mark_dirty(index);
        }
        self.document.mark_dirty_after(last, ContextReach::UntilHeading);
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("lines", &self.document.len())
            .field("cursor", &self.cursor)
            .field("viewport", &self.viewport)
            .field("options", &self.options)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

fn document_start(document: &Document) -> CaretPosition {
    match document.line(0) {
        Some(line) => CaretPosition::new(line.id(), line.indent()),
        None => CaretPosition::new(LineId::default(), 0),
    }
}

fn detect_line_ending(text: &str, fallback: LineEnding) -> LineEnding {
    if text.contains('\n') {
        LineEnding::detect_in_text(text)
    } else {
        fallback
    }
}
