//! Caret and selection.
//!
//! A [`Cursor`] has an *anchor* and a *focus*. When both are equal the cursor is collapsed
//! (a plain caret); otherwise it spans a range. Movements always act on the focus; "move"
//! variants collapse the anchor onto it, "select" variants leave the anchor in place.
//!
//! Endpoints reference lines by [`LineId`], so they survive lines being inserted or removed
//! above them.

use crate::document::{Document, Line, LineId, LineType, TextPoint};
use crate::layout::LineMetrics;

/// A caret endpoint: a line and an offset on it (indent included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretPosition {
    /// Line the caret sits on.
    pub line: LineId,
    /// Offset within `0..=selectable_length`.
    pub offset: usize,
}

impl CaretPosition {
    /// Create a new caret position.
    pub fn new(line: LineId, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// Collapsed or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Anchor and focus coincide.
    Collapsed,
    /// Anchor and focus differ.
    Range,
}

/// Anchor/focus pair describing a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Fixed end.
    pub anchor: CaretPosition,
    /// Moving end.
    pub focus: CaretPosition,
}

impl Selection {
    /// Create a selection.
    pub fn new(anchor: CaretPosition, focus: CaretPosition) -> Self {
        Self { anchor, focus }
    }

    /// Both endpoints as index-based points in document order, or `None` if an endpoint's
    /// line no longer exists.
    pub fn ordered_points(&self, document: &Document) -> Option<(TextPoint, TextPoint)> {
        let anchor = point_of(document, self.anchor)?;
        let focus = point_of(document, self.focus)?;
        Some(if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        })
    }
}

fn point_of(document: &Document, position: CaretPosition) -> Option<TextPoint> {
    let index = document.index_of(position.line)?;
    Some(TextPoint::new(index, position.offset))
}

/// Caret movements. Word and block movements cross line boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// One character left, skipping the indent.
    Left,
    /// One character right, skipping the indent.
    Right,
    /// One visual row up.
    Up,
    /// One visual row down.
    Down,
    /// Start of the current visual row.
    Home,
    /// End of the current visual row.
    End,
    /// Start of the previous word.
    WordStart,
    /// End of the next word.
    WordEnd,
    /// Start of the current (or previous) block of non-blank lines.
    BlockStart,
    /// End of the current (or next) block of non-blank lines.
    BlockEnd,
}

/// Anchor, focus and the column vertical movement tries to return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    anchor: CaretPosition,
    focus: CaretPosition,
    ideal_column: Option<usize>,
}

impl Cursor {
    /// A collapsed cursor at `position`.
    pub fn collapsed(position: CaretPosition) -> Self {
        Self {
            anchor: position,
            focus: position,
            ideal_column: None,
        }
    }

    /// Fixed end of the selection.
    pub fn anchor(&self) -> CaretPosition {
        self.anchor
    }

    /// Moving end of the selection; the caret.
    pub fn focus(&self) -> CaretPosition {
        self.focus
    }

    /// Both endpoints.
    pub fn selection(&self) -> Selection {
        Selection::new(self.anchor, self.focus)
    }

    /// Visual column remembered across vertical movement.
    pub fn ideal_column(&self) -> Option<usize> {
        self.ideal_column
    }

    /// Whether anchor equals focus.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Collapsed or range.
    pub fn state(&self) -> CursorState {
        if self.is_collapsed() {
            CursorState::Collapsed
        } else {
            CursorState::Range
        }
    }

    /// Collapse onto `position`.
    pub fn set(&mut self, position: CaretPosition) {
        *self = Self::collapsed(position);
    }

    /// Replace both endpoints.
    pub fn set_selection(&mut self, selection: Selection) {
        self.anchor = selection.anchor;
        self.focus = selection.focus;
        self.ideal_column = None;
    }

    /// Collapse a range, keeping the focus.
    pub fn collapse(&mut self) {
        self.anchor = self.focus;
    }

    /// Shift endpoints on `line` by `delta`, clamped to `0..=max_offset`.
    pub(crate) fn shift_on_line(&mut self, line: LineId, delta: isize, max_offset: usize) {
        for endpoint in [&mut self.anchor, &mut self.focus] {
            if endpoint.line == line {
                endpoint.offset = endpoint
                    .offset
                    .saturating_add_signed(delta)
                    .min(max_offset);
            }
        }
    }

    /// Clamp endpoints to their lines. Endpoints on vanished lines move to `fallback`.
    pub(crate) fn clamp_to(&mut self, document: &Document, fallback: CaretPosition) {
        for endpoint in [&mut self.anchor, &mut self.focus] {
            match document.line_by_id(endpoint.line) {
                Some(line) => endpoint.offset = endpoint.offset.min(line.selectable_length()),
                None => *endpoint = fallback,
            }
        }
    }

    /// Apply `movement` to the focus. With `extend` the anchor stays; otherwise it follows.
    pub fn move_by(
        &mut self,
        document: &Document,
        measure: usize,
        movement: Movement,
        extend: bool,
    ) {
        let Some(index) = document.index_of(self.focus.line) else {
            return;
        };
        let (target, ideal) = resolve(
            document,
            measure,
            index,
            self.focus.offset,
            self.ideal_column,
            movement,
        );
        let Some(line) = document.line(target.line) else {
            return;
        };
        self.focus = CaretPosition::new(line.id(), target.offset);
        if !extend {
            self.anchor = self.focus;
        }
        self.ideal_column = Some(ideal);
    }
}

/// Target point and the new ideal column for a movement from `(index, offset)`.
fn resolve(
    document: &Document,
    measure: usize,
    index: usize,
    offset: usize,
    ideal: Option<usize>,
    movement: Movement,
) -> (TextPoint, usize) {
    let last = document.len().saturating_sub(1);
    let Some(line) = document.line(index) else {
        return (TextPoint::new(index, offset), ideal.unwrap_or(offset));
    };
    let metrics = LineMetrics::of(line, measure);
    let offset = offset.min(line.selectable_length());
    let here = metrics.offset_to_visual(offset);

    let target = match movement {
        Movement::Left => {
            if offset > line.indent() {
                TextPoint::new(index, offset - 1)
            } else if index > 0 {
                end_of(document, index - 1)
            } else {
                TextPoint::new(index, offset)
            }
        }
        Movement::Right => {
            if offset < line.indent() {
                TextPoint::new(index, line.indent())
            } else if offset < line.selectable_length() {
                TextPoint::new(index, offset + 1)
            } else if index < last {
                start_of(document, index + 1)
            } else {
                TextPoint::new(index, offset)
            }
        }
        Movement::Up | Movement::Down => {
            let column = ideal.unwrap_or(here.column);
            let up = movement == Movement::Up;
            let target = vertical(document, measure, index, here.row, column, up);
            return (target, column);
        }
        Movement::Home => {
            let row_start = metrics.visual_to_offset(here.row, line.indent());
            TextPoint::new(index, row_start)
        }
        Movement::End => {
            // A row boundary offset belongs to the next row, so stop one short of it.
            let row_end = if here.row < metrics.last_row_index() {
                line.indent() + (here.row + 1) * metrics.apparent_measure() - 1
            } else {
                line.selectable_length()
            };
            TextPoint::new(index, row_end)
        }
        Movement::WordStart => {
            let at = line.text_index(offset);
            if at == 0 {
                if index > 0 {
                    end_of(document, index - 1)
                } else {
                    TextPoint::new(index, line.indent())
                }
            } else {
                TextPoint::new(index, line.indent() + word_start_before(line.text(), at))
            }
        }
        Movement::WordEnd => {
            let at = line.text_index(offset);
            if offset >= line.selectable_length() {
                if index < last {
                    start_of(document, index + 1)
                } else {
                    TextPoint::new(index, line.selectable_length())
                }
            } else {
                TextPoint::new(index, line.indent() + word_end_after(line.text(), at))
            }
        }
        Movement::BlockStart => block_start(document, index, offset),
        Movement::BlockEnd => block_end(document, index, offset),
    };

    let column = document
        .line(target.line)
        .map(|line| LineMetrics::of(line, measure).offset_to_visual(target.offset).column)
        .unwrap_or(target.offset);
    (target, column)
}

fn start_of(document: &Document, index: usize) -> TextPoint {
    TextPoint::new(index, document.line(index).map(Line::indent).unwrap_or(0))
}

fn end_of(document: &Document, index: usize) -> TextPoint {
    TextPoint::new(
        index,
        document
            .line(index)
            .map(Line::selectable_length)
            .unwrap_or(0),
    )
}

fn vertical(
    document: &Document,
    measure: usize,
    index: usize,
    row: usize,
    column: usize,
    up: bool,
) -> TextPoint {
    let metrics_at = |i: usize| document.line(i).map(|line| LineMetrics::of(line, measure));
    let Some(metrics) = metrics_at(index) else {
        return TextPoint::new(index, column);
    };

    if up {
        if row > 0 {
            return TextPoint::new(index, metrics.visual_to_offset(row - 1, column));
        }
        if index == 0 {
            return start_of(document, index);
        }
        let Some(above) = metrics_at(index - 1) else {
            return start_of(document, index);
        };
        TextPoint::new(index - 1, above.visual_to_offset(above.last_row_index(), column))
    } else {
        if row < metrics.last_row_index() {
            return TextPoint::new(index, metrics.visual_to_offset(row + 1, column));
        }
        if index + 1 >= document.len() {
            return end_of(document, index);
        }
        let Some(below) = metrics_at(index + 1) else {
            return end_of(document, index);
        };
        TextPoint::new(index + 1, below.visual_to_offset(0, column))
    }
}

/// Character index of the start of the word ending at or before `at`.
pub(crate) fn word_start_before(text: &str, at: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = at.min(chars.len());
    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    while i > 0 && !chars[i - 1].is_whitespace() {
        i -= 1;
    }
    i
}

/// Character index of the end of the word starting at or after `at`.
pub(crate) fn word_end_after(text: &str, at: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = at.min(chars.len());
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    while i < chars.len() && !chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn is_blank(document: &Document, index: usize) -> bool {
    document
        .line(index)
        .is_some_and(|line| line.line_type() == LineType::Blank)
}

fn block_start(document: &Document, index: usize, offset: usize) -> TextPoint {
    let mut i = index;
    let at_first = i == 0 || is_blank(document, i - 1);
    let at_start = offset <= start_of(document, i).offset;
    if is_blank(document, i) || (at_first && at_start) {
        if i == 0 {
            return start_of(document, 0);
        }
        i -= 1;
        while i > 0 && is_blank(document, i) {
            i -= 1;
        }
    }
    while i > 0 && !is_blank(document, i - 1) {
        i -= 1;
    }
    start_of(document, i)
}

fn block_end(document: &Document, index: usize, offset: usize) -> TextPoint {
    let last = document.len().saturating_sub(1);
    let mut i = index;
    let at_last = i == last || is_blank(document, i + 1);
    let at_end = offset >= end_of(document, i).offset;
    if is_blank(document, i) || (at_last && at_end) {
        if i == last {
            return end_of(document, last);
        }
        i += 1;
        while i < last && is_blank(document, i) {
            i += 1;
        }
    }
    while i < last && !is_blank(document, i + 1) {
        i += 1;
    }
    end_of(document, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        let text = "alpha  beta gamma";
        assert_eq!(word_end_after(text, 0), 5);
        assert_eq!(word_end_after(text, 5), 11);
        assert_eq!(word_start_before(text, 11), 7);
        assert_eq!(word_start_before(text, 7), 0);
        assert_eq!(word_start_before(text, 0), 0);
        assert_eq!(word_end_after(text, 17), 17);
    }

    #[test]
    fn test_shift_on_line_clamps() {
        let mut doc = Document::from_text("abc");
        doc.lines_mut()[0].set_dirty(false);
        let id = doc.lines()[0].id();
        let mut cursor = Cursor::collapsed(CaretPosition::new(id, 1));
        cursor.shift_on_line(id, -5, 3);
        assert_eq!(cursor.focus().offset, 0);
        cursor.shift_on_line(id, 10, 3);
        assert_eq!(cursor.focus().offset, 3);
        assert!(cursor.is_collapsed());
    }

    #[test]
    fn test_collapse_keeps_focus() {
        let doc = Document::from_text("abc\ndef");
        let a = CaretPosition::new(doc.lines()[0].id(), 1);
        let b = CaretPosition::new(doc.lines()[1].id(), 2);
        let mut cursor = Cursor::collapsed(a);
        cursor.set_selection(Selection::new(a, b));
        assert_eq!(cursor.state(), CursorState::Range);
        assert_eq!(
            cursor.selection().ordered_points(&doc),
            Some((TextPoint::new(0, 1), TextPoint::new(1, 2)))
        );
        cursor.collapse();
        assert_eq!(cursor.focus(), b);
        assert_eq!(cursor.anchor(), b);
    }
}
