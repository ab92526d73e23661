#![warn(missing_docs)]
//! Line Editor Core - Headless Line-Oriented Outline Editing Engine
//!
//! # Overview
//!
//! `line-editor-core` edits plain-text outline documents line by line. Every line is classified
//! into a semantic type (heading, list item, metadata, blank, paragraph), its indentation is
//! computed from the lines above it, and carets are mapped between linear character offsets and
//! soft-wrapped (row, column) positions. It does not render anything: the host supplies a
//! [`WidthOracle`] that reports how text wraps and draws the formatted lines itself.
//!
//! # Core Features
//!
//! - **Line Classification**: pluggable [`LineClassifier`]s tried in a fixed order
//! - **Incremental Formatting**: only dirty lines and the lines their context reaches are re-indented
//! - **Soft Wrapping Math**: exact offset <-> visual conversion with indented continuation rows
//! - **Caret Model**: anchor/focus selection, ideal column, word and block navigation
//! - **Snapshot History**: one undo step per logical edit, with atomic grouping
//! - **State Tracking**: Version number mechanism and Change Notifications system
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & Session                │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  History (snapshots) · Cursor (navigation)  │  ← Editing State
//! ├─────────────────────────────────────────────┤
//! │  Layout (measure, offset <-> visual)        │  ← Text Layout
//! ├─────────────────────────────────────────────┤
//! │  Format Pass (classify, parse, indent)      │  ← Formatting
//! ├─────────────────────────────────────────────┤
//! │  Document (lines with stable ids)           │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use line_editor_core::{EditorSession, LineType, MonospaceOracle, Movement};
//!
//! let mut session = EditorSession::new("### Title\nbody", MonospaceOracle::new(80)).unwrap();
//!
//! let lines = session.document().lines();
//! assert_eq!(lines[0].section_level(), Some(3));
//! assert_eq!(lines[1].indent(), 6);
//!
//! session.move_caret(Movement::BlockEnd);
//! session.insert_text(" text").unwrap();
//! assert_eq!(session.portable_text(), "### Title\nbody text");
//! assert_eq!(session.document().lines()[1].line_type(), LineType::Paragraph);
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Lines, line ids and portable text
//! - [`classifiers`] - Line classifiers and the trial order
//! - [`format`] - Two-phase format pass and its carry-forward context
//! - [`layout`] - Width oracle, measure cache and wrap geometry
//! - [`cursor`] - Caret, selection and movements
//! - [`history`] - Undo/redo snapshots
//! - [`commands`] - Unified command interface
//! - [`state`] - State queries and change notifications
//! - [`session`] - The editing session tying it all together

pub mod classifiers;
pub mod clipboard;
pub mod commands;
pub mod cursor;
pub mod document;
pub mod error;
pub mod format;
pub mod history;
pub mod inline;
pub mod layout;
pub mod line_ending;
pub mod session;
pub mod state;

pub use classifiers::{
    BlankClassifier, Capture, ClassifierSet, DEFAULT_INDENT_WIDTH, HeadingClassifier,
    LineClassifier, ListClassifier, MetaClassifier, ParagraphClassifier,
};
pub use clipboard::{Clipboard, MemoryClipboard};
pub use commands::{Command, CommandResult, CursorCommand, EditCommand, ViewCommand};
pub use cursor::{CaretPosition, Cursor, CursorState, Movement, Selection};
pub use document::{
    ContextReach, Document, Line, LineId, LineKind, LineType, ListKind, ListMarker, MetaTag,
    TextPoint,
};
pub use error::EngineError;
pub use format::{FormatContext, FormatPass, FormatReport, FormatScope, load_document};
pub use history::{HistorySnapshot, HistoryStack};
pub use inline::{InlineSegment, scan_segments};
pub use layout::{
    LineMetrics, MonospaceOracle, UNBOUNDED_MEASURE, Viewport, VisualPosition, WidthOracle,
};
pub use line_ending::LineEnding;
pub use session::{EditorOptions, EditorSession};
pub use state::{
    DocumentState, StateChange, StateChangeCallback, StateChangeType, UndoRedoState,
};
