//! Two-phase format pass.
//!
//! 1. **Classify + parse** every dirty line (or every line for [`FormatScope::All`]). When a
//!    line's parsed data changes in a way that affects the context of later lines (a heading
//!    appears, a list item changes depth, ...), the following lines up to the next reset
//!    boundary are marked dirty as well.
//! 2. **Format**: walk the document top to bottom, calling `format` on dirty lines and
//!    `update_context` on every line. Each line's indentation depends on all lines above it,
//!    so this phase is strictly sequential.
//!
//! A caret sitting on a reformatted line is shifted by that line's length delta so it keeps
//! pointing at the same character.

use crate::classifiers::ClassifierSet;
use crate::cursor::Cursor;
use crate::document::{ContextReach, Document, LineId};
use crate::error::EngineError;

/// Width assumed for list levels that were skipped (e.g. depth 3 directly under depth 1).
const SKIPPED_LEVEL_WIDTH: usize = 2;

/// Carry-forward state propagated line by line during phase 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatContext {
    /// Indentation contributed by the enclosing heading.
    pub indent_from_heading: usize,
    /// Indentation contributed by the enclosing list item (where its content starts).
    pub indent_from_list: usize,
    /// Content indentation per list depth (index 0 is depth 1), relative to the heading indent.
    pub list_indent_stack: Vec<usize>,
    /// Last ordinal per list depth; 0 after an unordered item.
    pub list_order_stack: Vec<usize>,
}

impl FormatContext {
    /// Enter a new section: heading indent replaced, all list state cleared.
    pub fn enter_section(&mut self, indent_from_heading: usize) {
        self.indent_from_heading = indent_from_heading;
        self.reset_list();
    }

    /// Clear list indentation and numbering, keeping the heading indent.
    pub fn reset_list(&mut self) {
        self.indent_from_list = 0;
        self.list_indent_stack.clear();
        self.list_order_stack.clear();
    }

    /// Indentation (relative to the heading indent) of an item at `depth`.
    ///
    /// Depth 1 starts at 0; deeper items start where the shallower item's content starts.
    pub fn list_self_indent(&self, depth: usize) -> usize {
        let depth = depth.max(1);
        if depth == 1 {
            return 0;
        }
        match self.list_indent_stack.get(depth - 2) {
            Some(indent) => *indent,
            None => {
                let known = self.list_indent_stack.len();
                let last = self.list_indent_stack.last().copied().unwrap_or(0);
                last + SKIPPED_LEVEL_WIDTH * (depth - 1 - known)
            }
        }
    }

    /// Ordinal the next ordered item at `depth` receives.
    pub fn next_ordinal(&self, depth: usize) -> usize {
        let depth = depth.max(1);
        self.list_order_stack
            .get(depth - 1)
            .copied()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Record a list item at `depth` whose prefix is `marker_len` characters long.
    ///
    /// Deeper indentation and numbering entries are discarded.
    pub fn enter_list_item(&mut self, depth: usize, marker_len: usize, ordinal: Option<usize>) {
        let depth = depth.max(1);
        let self_indent = self.list_self_indent(depth);

        self.list_indent_stack.truncate(depth - 1);
        while self.list_indent_stack.len() < depth - 1 {
            let last = self.list_indent_stack.last().copied().unwrap_or(0);
            self.list_indent_stack.push(last + SKIPPED_LEVEL_WIDTH);
        }
        self.list_indent_stack.push(self_indent + marker_len);

        self.list_order_stack.truncate(depth);
        self.list_order_stack.resize(depth, 0);
        self.list_order_stack[depth - 1] = ordinal.unwrap_or(0);

        self.indent_from_list = self_indent + marker_len;
    }
}

/// Which lines phase 1 re-parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatScope {
    /// Every line.
    All,
    /// Only lines flagged dirty (plus whatever their changes cascade into).
    Dirty,
}

/// What the last format pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatReport {
    /// Number of lines classified and parsed in phase 1.
    pub reparsed: usize,
    /// Lines formatted in phase 2, in document order.
    pub formatted: Vec<LineId>,
}

/// Runs classification and formatting over a document.
#[derive(Debug, Default)]
pub struct FormatPass {
    classifiers: ClassifierSet,
    context: FormatContext,
}

impl FormatPass {
    /// Create a pass over the given classifier set.
    pub fn new(classifiers: ClassifierSet) -> Self {
        Self {
            classifiers,
            context: FormatContext::default(),
        }
    }

    /// Split `raw` into lines and fully format them.
    pub fn load(&mut self, raw: &str) -> Result<Document, EngineError> {
        let normalized = crate::line_ending::normalize(raw);
        let mut document = Document::from_text(&normalized);
        self.run(&mut document, FormatScope::All, None)?;
        Ok(document)
    }

    /// Run both phases. `cursor` endpoints on reformatted lines track their character.
    pub fn run(
        &mut self,
        document: &mut Document,
        scope: FormatScope,
        mut cursor: Option<&mut Cursor>,
    ) -> Result<FormatReport, EngineError> {
        if scope == FormatScope::All {
            document.mark_all_dirty();
        }

        let mut report = FormatReport::default();

        // Phase 1: classify + parse. Cascades only ever mark lines below `index`.
        for index in 0..document.len() {
            let Some(line) = document.line_mut(index) else {
                break;
            };
            if !line.is_dirty() {
                continue;
            }
            let before = line.kind().clone();
            self.classifiers.classify(line, index)?;
            report.reparsed += 1;

            if *line.kind() != before {
                let reach = ContextReach::of(before.line_type())
                    .max(ContextReach::of(line.line_type()));
                document.mark_dirty_after(index, reach);
            }
        }

        // Phase 2: sequential format + context propagation.
        self.context = FormatContext::default();
        for (index, line) in document.lines_mut().iter_mut().enumerate() {
            let Some(classifier) = self.classifiers.for_type(line.line_type()) else {
                return Err(EngineError::UnclassifiableLine {
                    index,
                    text: line.text().to_string(),
                });
            };

            if line.is_dirty() {
                let delta = classifier.format(line, &self.context);
                if delta != 0 {
                    tracing::trace!(index, delta, "line length changed during format");
                    if let Some(cursor) = cursor.as_deref_mut() {
                        cursor.shift_on_line(line.id(), delta, line.selectable_length());
                    }
                }
                line.set_dirty(false);
                report.formatted.push(line.id());
            }

            classifier.update_context(line, &mut self.context);
        }

        tracing::debug!(
            reparsed = report.reparsed,
            formatted = report.formatted.len(),
            lines = document.len(),
            "format pass finished"
        );
        Ok(report)
    }
}

/// Load a document with the standard classifier set.
pub fn load_document(raw: &str) -> Result<Document, EngineError> {
    FormatPass::default().load(raw)
}
