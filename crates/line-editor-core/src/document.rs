//! Document model.
//!
//! A [`Document`] is an ordered list of [`Line`]s. Every line carries a stable [`LineId`] so
//! carets and snapshots can address it directly, without walking any tree.
//!
//! Lines store their *wrappable* text only: leading whitespace is dropped when the line is
//! parsed and the visible indentation is recomputed by the format pass every time. Offsets
//! used by carets include that indentation:
//!
//! ```text
//! offset: 0 1 2 3 4 5 6
//!         ␣ ␣ t e x t |
//!         └indent┘└ wrappable ┘
//! ```

use crate::inline::InlineSegment;

/// Stable identifier of a line within one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

impl LineId {
    /// Raw numeric value (unique within the owning document).
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Semantic type of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineType {
    /// `#`..`######` section heading.
    Heading,
    /// Ordered or unordered list item.
    List,
    /// `#+key: value` metadata line.
    Meta,
    /// All-whitespace line.
    Blank,
    /// Anything else.
    Paragraph,
}

/// Whether a list item is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+` bullet.
    Unordered,
    /// `<int>.` marker, renumbered by the format pass.
    Ordered,
}

/// The marker of a list item (after the nesting setters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    /// Bullet character.
    Bullet(char),
    /// Ordinal number.
    Ordinal(usize),
}

impl ListMarker {
    /// List kind of this marker.
    pub fn kind(self) -> ListKind {
        match self {
            Self::Bullet(_) => ListKind::Unordered,
            Self::Ordinal(_) => ListKind::Ordered,
        }
    }

    /// Marker as written in the line text (without the trailing space).
    pub fn render(self) -> String {
        match self {
            Self::Bullet(ch) => ch.to_string(),
            Self::Ordinal(n) => format!("{n}."),
        }
    }
}

/// Renderer hint for recognized metadata keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaTag {
    /// `title`
    Title,
    /// `author`
    Author,
    /// `date`
    Date,
    /// `tags`
    Tags,
    /// `id`
    Id,
    /// `created`
    Created,
    /// Any other key. Still rendered.
    Unknown,
}

impl MetaTag {
    /// Map a metadata key (case-insensitive) to its tag.
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "title" => Self::Title,
            "author" => Self::Author,
            "date" => Self::Date,
            "tags" => Self::Tags,
            "id" => Self::Id,
            "created" => Self::Created,
            _ => Self::Unknown,
        }
    }
}

/// Type-specific parsed data of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Heading with its section level (1..=6).
    Heading {
        /// Number of `#` markers.
        level: usize,
    },
    /// List item.
    List {
        /// Nesting depth, `setter count + 1`.
        level: usize,
        /// Number of nesting-setter characters before the marker.
        setters: usize,
        /// The item marker.
        marker: ListMarker,
    },
    /// Metadata line.
    Meta {
        /// Key between `#+` and `:`.
        key: String,
        /// Value after `: `.
        value: String,
        /// Renderer hint.
        tag: MetaTag,
    },
    /// Blank line.
    Blank,
    /// Paragraph (catch-all).
    Paragraph,
}

impl LineKind {
    /// The line type this data belongs to.
    pub fn line_type(&self) -> LineType {
        match self {
            Self::Heading { .. } => LineType::Heading,
            Self::List { .. } => LineType::List,
            Self::Meta { .. } => LineType::Meta,
            Self::Blank => LineType::Blank,
            Self::Paragraph => LineType::Paragraph,
        }
    }
}

/// One logical line of the document.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    text: String,
    kind: LineKind,
    indent: usize,
    segments: Vec<InlineSegment>,
    dirty: bool,
}

impl Line {
    fn new(id: LineId, text: &str) -> Self {
        Self {
            id,
            text: text.to_string(),
            kind: LineKind::Paragraph,
            indent: 0,
            segments: Vec::new(),
            dirty: true,
        }
    }

    /// Stable id.
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Wrappable text (no indentation).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parsed type-specific data.
    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// Semantic type.
    pub fn line_type(&self) -> LineType {
        self.kind.line_type()
    }

    /// Indentation computed by the last format pass.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Number of characters in the wrappable text.
    pub fn wrappable_length(&self) -> usize {
        self.text.chars().count()
    }

    /// `indent + wrappable_length`: the largest valid caret offset on this line.
    pub fn selectable_length(&self) -> usize {
        self.indent + self.wrappable_length()
    }

    /// Rendered inline runs.
    pub fn segments(&self) -> &[InlineSegment] {
        &self.segments
    }

    /// Whether the line waits for the next format pass.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Section level for headings.
    pub fn section_level(&self) -> Option<usize> {
        match self.kind {
            LineKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    /// Nesting depth for list items.
    pub fn list_level(&self) -> Option<usize> {
        match self.kind {
            LineKind::List { level, .. } => Some(level),
            _ => None,
        }
    }

    /// List kind for list items.
    pub fn list_kind(&self) -> Option<ListKind> {
        match self.kind {
            LineKind::List { marker, .. } => Some(marker.kind()),
            _ => None,
        }
    }

    /// Marker for list items.
    pub fn list_marker(&self) -> Option<ListMarker> {
        match self.kind {
            LineKind::List { marker, .. } => Some(marker),
            _ => None,
        }
    }

    /// Key and value for metadata lines.
    pub fn meta(&self) -> Option<(&str, &str)> {
        match &self.kind {
            LineKind::Meta { key, value, .. } => Some((key, value)),
            _ => None,
        }
    }

    /// Character index into [`text`](Self::text) for a caret offset, clamped to the text.
    pub fn text_index(&self, offset: usize) -> usize {
        offset
            .saturating_sub(self.indent)
            .min(self.wrappable_length())
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
        self.dirty = true;
    }

    pub(crate) fn set_parsed(&mut self, text: String, kind: LineKind, segments: Vec<InlineSegment>) {
        self.text = text;
        self.kind = kind;
        self.segments = segments;
    }

    #[cfg(test)]
    pub(crate) fn set_kind(&mut self, kind: LineKind) {
        self.kind = kind;
    }

    pub(crate) fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}

/// How far an edit's context change reaches down the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextReach {
    /// Only the edited line.
    Line,
    /// Following lines up to the next Heading or Blank line (list context).
    UntilBlankOrHeading,
    /// Following lines up to the next Heading line (heading context).
    UntilHeading,
}

impl ContextReach {
    /// Reach implied by a line of the given type appearing or disappearing.
    pub fn of(line_type: LineType) -> Self {
        match line_type {
            LineType::Heading => Self::UntilHeading,
            LineType::List | LineType::Blank => Self::UntilBlankOrHeading,
            LineType::Meta | LineType::Paragraph => Self::Line,
        }
    }
}

/// A (line index, caret offset) pair used to address portable-text ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPoint {
    /// Zero-based line index.
    pub line: usize,
    /// Caret offset on that line (includes indentation).
    pub offset: usize,
}

impl TextPoint {
    /// Create a new point.
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// Ordered, mutable sequence of lines. Never empty.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,
    next_id: u64,
}

impl Document {
    /// Split LF-normalized text into unformatted lines, all marked dirty.
    ///
    /// `N` newlines produce `N + 1` lines, so an empty input still has one line.
    pub fn from_text(text: &str) -> Self {
        let mut document = Self {
            lines: Vec::new(),
            next_id: 0,
        };
        for raw in text.split('\n') {
            let line = document.new_line(raw);
            document.lines.push(line);
        }
        document
    }

    fn new_line(&mut self, text: &str) -> Line {
        let id = LineId(self.next_id);
        self.next_id += 1;
        Line::new(id, text)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line at `index`.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub(crate) fn line_mut(&mut self, index: usize) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Current index of the line with `id`.
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    /// Line with `id`.
    pub fn line_by_id(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Insert a new dirty line holding `text` at `index` (clamped to the end).
    pub(crate) fn insert_line(&mut self, index: usize, text: &str) -> LineId {
        let line = self.new_line(text);
        let id = line.id;
        let index = index.min(self.lines.len());
        self.lines.insert(index, line);
        id
    }

    /// Remove the line at `index`. The last remaining line is never removed.
    pub(crate) fn remove_line(&mut self, index: usize) -> Option<Line> {
        if self.lines.len() <= 1 || index >= self.lines.len() {
            return None;
        }
        Some(self.lines.remove(index))
    }

    /// Remove lines in `start..end`, keeping at least one line.
    pub(crate) fn drain_lines(&mut self, start: usize, end: usize) -> Vec<Line> {
        let end = end.min(self.lines.len());
        if start >= end {
            return Vec::new();
        }
        let keep_one = end - start == self.lines.len();
        let end = if keep_one { end - 1 } else { end };
        self.lines.drain(start..end).collect()
    }

    /// Swap the block `start..end` with the line just above it.
    pub(crate) fn move_block_up(&mut self, start: usize, end: usize) -> bool {
        if start == 0 || end > self.lines.len() || start >= end {
            return false;
        }
        self.lines[start - 1..end].rotate_left(1);
        true
    }

    /// Swap the block `start..end` with the line just below it.
    pub(crate) fn move_block_down(&mut self, start: usize, end: usize) -> bool {
        if end >= self.lines.len() || start >= end {
            return false;
        }
        self.lines[start..=end].rotate_right(1);
        true
    }

    /// Mark the line at `index` dirty.
    pub fn mark_dirty(&mut self, index: usize) {
        if let Some(line) = self.lines.get_mut(index) {
            line.dirty = true;
        }
    }

    /// Mark every line dirty.
    pub fn mark_all_dirty(&mut self) {
        for line in &mut self.lines {
            line.dirty = true;
        }
    }

    /// Mark the lines after `index` dirty until the boundary implied by `reach`.
    ///
    /// The boundary line itself is left alone: it resets the context it bounds.
    pub fn mark_dirty_after(&mut self, index: usize, reach: ContextReach) {
        if reach == ContextReach::Line {
            return;
        }
        for line in self.lines.iter_mut().skip(index + 1) {
            let stop = match line.line_type() {
                LineType::Heading => true,
                LineType::Blank => reach == ContextReach::UntilBlankOrHeading,
                _ => false,
            };
            if stop {
                break;
            }
            line.dirty = true;
        }
    }

    /// Indices of all lines currently waiting for a format pass.
    pub fn dirty_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.dirty)
            .map(|(index, _)| index)
            .collect()
    }

    /// The whole document as newline-separated wrappable text.
    pub fn to_portable_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Portable text between two caret points (start inclusive, end exclusive).
    ///
    /// Points are ordered and clamped first. Computed indentation is never included.
    pub fn portable_text(&self, start: TextPoint, end: TextPoint) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let last = self.lines.len() - 1;
        let start_line = start.line.min(last);
        let end_line = end.line.min(last);

        let mut out = String::new();
        for index in start_line..=end_line {
            let line = &self.lines[index];
            let from = if index == start_line {
                line.text_index(start.offset)
            } else {
                0
            };
            let to = if index == end_line {
                line.text_index(end.offset)
            } else {
                line.wrappable_length()
            };
            if index > start_line {
                out.push('\n');
            }
            out.push_str(char_slice(&line.text, from, to.max(from)));
        }
        out
    }
}

/// Byte offset of the `char_index`-th character (clamped to the end of `text`).
pub(crate) fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Slice `text` by character indices.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}

/// Split `text` at a character index.
pub(crate) fn split_at_char(text: &str, char_index: usize) -> (&str, &str) {
    text.split_at(byte_offset(text, char_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_keeps_trailing_empty_line() {
        let doc = Document::from_text("a\nb\n");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.line(2).map(Line::text), Some(""));
        assert!(doc.lines().iter().all(Line::is_dirty));
    }

    #[test]
    fn test_line_ids_are_unique_and_stable() {
        let mut doc = Document::from_text("a\nb");
        let b = doc.line(1).map(Line::id);
        let inserted = doc.insert_line(0, "z");
        assert_ne!(Some(inserted), b);
        assert_eq!(doc.index_of(b.unwrap_or(inserted)), Some(2));
    }

    #[test]
    fn test_last_line_is_never_removed() {
        let mut doc = Document::from_text("only");
        assert!(doc.remove_line(0).is_none());
        assert_eq!(doc.drain_lines(0, 1).len(), 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_move_block() {
        let mut doc = Document::from_text("a\nb\nc\nd");
        assert!(doc.move_block_up(1, 3));
        assert_eq!(doc.to_portable_text(), "b\nc\na\nd");
        assert!(doc.move_block_down(0, 2));
        assert_eq!(doc.to_portable_text(), "a\nb\nc\nd");
        assert!(!doc.move_block_up(0, 1));
        assert!(!doc.move_block_down(3, 4));
    }

    #[test]
    fn test_portable_text_range_excludes_indent() {
        let mut doc = Document::from_text("hello\nworld");
        if let Some(line) = doc.line_mut(1) {
            line.set_indent(2);
        }
        // Offset 3 on line 1 is text index 1 ("o").
        let text = doc.portable_text(TextPoint::new(0, 2), TextPoint::new(1, 3));
        assert_eq!(text, "llo\nw");
        // Reversed points are ordered first.
        let reversed = doc.portable_text(TextPoint::new(1, 3), TextPoint::new(0, 2));
        assert_eq!(reversed, text);
    }

    #[test]
    fn test_mark_dirty_after_stops_at_boundaries() {
        let mut doc = Document::from_text("# h\npara\n\nmore\n# next\ntail");
        doc.lines_mut()[0].set_kind(LineKind::Heading { level: 1 });
        doc.lines_mut()[2].set_kind(LineKind::Blank);
        doc.lines_mut()[4].set_kind(LineKind::Heading { level: 1 });
        for line in doc.lines_mut() {
            line.set_dirty(false);
        }

        doc.mark_dirty_after(0, ContextReach::UntilBlankOrHeading);
        assert_eq!(doc.dirty_lines(), vec![1]);

        doc.mark_dirty_after(0, ContextReach::UntilHeading);
        assert_eq!(doc.dirty_lines(), vec![1, 2, 3]);
    }

    #[test]
    fn test_char_helpers_handle_multibyte() {
        assert_eq!(split_at_char("aé b", 2), ("aé", " b"));
        assert_eq!(char_slice("日本語", 1, 3), "本語");
        assert_eq!(byte_offset("ab", 10), 2);
    }
}
