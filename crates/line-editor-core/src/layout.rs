//! Soft-wrap geometry.
//!
//! Every wrapped row of a line holds the same number of characters. The engine never measures
//! glyphs itself: it asks a [`WidthOracle`] how many rows a probe string occupies and derives a
//! single *measure* (characters per row) from that, cached until the viewport is resized.
//!
//! Continuation rows are indented by the line's indent, so only `measure - indent` characters of
//! wrappable text fit on each row (the *apparent measure*).

use unicode_width::UnicodeWidthChar;

/// Measure used when no oracle can report row counts. Lines never wrap.
pub const UNBOUNDED_MEASURE: usize = usize::MAX / 4;

/// Longest probe string handed to an oracle while searching for the measure.
pub const DEFAULT_MAX_PROBE_LEN: usize = 4096;

/// Calculate visual width of a character (based on UAX #11)
///
/// Return value:
/// - 1: Narrow character (ASCII, etc.)
/// - 2: Wide character (CJK, fullwidth, etc.)
/// - 0: Zero-width character (combining characters, etc.)
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Calculate total visual width of a string
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Source of truth for how text wraps in the host's viewport.
pub trait WidthOracle: Send {
    /// Number of visual rows `probe` occupies at the current viewport width.
    ///
    /// `None` means the oracle cannot measure right now (e.g. the view is detached).
    fn measure_row_count(&mut self, probe: &str) -> Option<usize>;
}

/// Oracle for a fixed-width grid of `columns` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceOracle {
    columns: usize,
}

impl MonospaceOracle {
    /// Grid that is `columns` cells wide. Zero columns means "unavailable".
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl WidthOracle for MonospaceOracle {
    fn measure_row_count(&mut self, probe: &str) -> Option<usize> {
        if self.columns == 0 {
            return None;
        }
        Some(str_width(probe).div_ceil(self.columns).max(1))
    }
}

/// Derive the measure: one less than the shortest probe that needs two rows.
///
/// Returns `None` when the oracle is unavailable. A viewport wider than `max_probe_len` is
/// treated as unbounded.
pub fn find_measure(oracle: &mut dyn WidthOracle, max_probe_len: usize) -> Option<usize> {
    let max_probe_len = max_probe_len.max(2);
    let mut rows = |len: usize| oracle.measure_row_count(&"0".repeat(len));

    if rows(max_probe_len)? < 2 {
        return Some(UNBOUNDED_MEASURE);
    }

    // Invariant: rows(hi) >= 2, and rows(lo - 1) < 2 for lo > 1.
    let (mut lo, mut hi) = (1usize, max_probe_len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if rows(mid)? >= 2 {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Some(hi.saturating_sub(1).max(1))
}

/// Viewport state: the oracle plus the cached measure.
pub struct Viewport {
    oracle: Box<dyn WidthOracle>,
    measure: usize,
    max_probe_len: usize,
}

impl Viewport {
    /// Create a viewport and measure it immediately.
    pub fn new(oracle: Box<dyn WidthOracle>, max_probe_len: usize) -> Self {
        let mut viewport = Self {
            oracle,
            measure: UNBOUNDED_MEASURE,
            max_probe_len,
        };
        viewport.resize();
        viewport
    }

    /// Cached characters-per-row.
    pub fn measure(&self) -> usize {
        self.measure
    }

    /// Whether the last measurement fell back to the unbounded measure.
    pub fn is_unbounded(&self) -> bool {
        self.measure == UNBOUNDED_MEASURE
    }

    /// Recompute the measure. Call whenever the host viewport changes size.
    pub fn resize(&mut self) -> usize {
        self.measure = match find_measure(self.oracle.as_mut(), self.max_probe_len) {
            Some(measure) => measure,
            None => {
                tracing::warn!("width oracle unavailable, lines will not wrap");
                UNBOUNDED_MEASURE
            }
        };
        tracing::debug!(measure = self.measure, "viewport measured");
        self.measure
    }

    /// Swap the oracle and re-measure.
    pub fn set_oracle(&mut self, oracle: Box<dyn WidthOracle>) -> usize {
        self.oracle = oracle;
        self.resize()
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("measure", &self.measure)
            .field("max_probe_len", &self.max_probe_len)
            .finish_non_exhaustive()
    }
}

/// A (row, column) position inside one line's wrapped rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisualPosition {
    /// Zero-based wrapped row.
    pub row: usize,
    /// Column within the row, counting the indent on every row.
    pub column: usize,
}

impl VisualPosition {
    /// Create a new visual position.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Geometry of one line at a given measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    /// Computed indentation.
    pub indent: usize,
    /// Characters of wrappable text.
    pub wrappable_length: usize,
    /// Characters per visual row.
    pub measure: usize,
}

impl LineMetrics {
    /// Metrics from raw numbers.
    pub fn new(indent: usize, wrappable_length: usize, measure: usize) -> Self {
        Self {
            indent,
            wrappable_length,
            measure,
        }
    }

    /// Metrics of `line` at `measure`.
    pub fn of(line: &crate::document::Line, measure: usize) -> Self {
        Self::new(line.indent(), line.wrappable_length(), measure)
    }

    /// `indent + wrappable_length`.
    pub fn selectable_length(&self) -> usize {
        self.indent + self.wrappable_length
    }

    /// Wrappable characters per row. Never zero, even when the indent exceeds the measure.
    pub fn apparent_measure(&self) -> usize {
        self.measure.saturating_sub(self.indent).max(1)
    }

    /// Index of the last wrapped row.
    pub fn last_row_index(&self) -> usize {
        self.wrappable_length
            .div_ceil(self.apparent_measure())
            .saturating_sub(1)
    }

    /// Whether the line occupies more than one row.
    pub fn is_wrapped(&self) -> bool {
        self.selectable_length() > self.measure
    }

    /// Map a caret offset to its wrapped row and column.
    ///
    /// Offsets inside the indent stay on row 0. An offset exactly at a row boundary belongs to
    /// the start of the next row.
    pub fn offset_to_visual(&self, offset: usize) -> VisualPosition {
        let offset = offset.min(self.selectable_length());
        if offset < self.indent {
            return VisualPosition::new(0, offset);
        }
        let apparent = self.apparent_measure();
        let within = offset - self.indent;
        VisualPosition::new(within / apparent, within % apparent + self.indent)
    }

    /// Map a wrapped row and column back to a caret offset, clamped to the line.
    ///
    /// Columns on continuation rows cannot point into the indent. Columns past the row end
    /// clamp to the measure; when the indent alone exceeds the measure, to `indent + 1`.
    pub fn visual_to_offset(&self, row: usize, column: usize) -> usize {
        let min_column = if row > 0 { self.indent } else { 0 };
        let max_column = self.indent.saturating_add(self.apparent_measure());
        let column = column.min(max_column).max(min_column);
        row.saturating_mul(self.apparent_measure())
            .saturating_add(column)
            .min(self.selectable_length())
    }
}
