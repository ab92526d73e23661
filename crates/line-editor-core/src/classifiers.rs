//! Line classifiers.
//!
//! Each classifier recognizes one [`LineType`]. A [`ClassifierSet`] tries its classifiers in a
//! fixed order and the first match wins. The standard set is
//!
//! ```text
//! Heading > Meta > List > Blank > Paragraph
//! ```
//!
//! The paragraph classifier accepts every input, so with the standard set an unclassifiable
//! line cannot occur.
//!
//! Every classifier follows the same protocol:
//!
//! - [`capture`](LineClassifier::capture): match raw text, returning the normalized text and
//!   parsed data;
//! - [`parse`](LineClassifier::parse): store the capture on the line (type, data, segments);
//! - [`format`](LineClassifier::format): recompute indentation (and list numbering) from the
//!   current [`FormatContext`], returning the change in selectable length;
//! - [`update_context`](LineClassifier::update_context): fold this line into the context seen
//!   by the following lines.

use crate::document::{Line, LineKind, LineType, ListMarker, MetaTag, char_slice};
use crate::error::EngineError;
use crate::format::FormatContext;
use crate::inline::{InlineSegment, scan_segments};
use regex::Regex;
use std::sync::LazyLock;

/// Default indentation step (in columns) per heading level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(#{1,6}) (.*)$").expect("Invalid heading regex"));

static META_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*#\+([A-Za-z0-9_-]+):[ \t]?(.*)$").expect("Invalid meta regex")
});

static LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(-*)([-*+]|[0-9]+\.) (.*)$").expect("Invalid list regex")
});

/// Result of a successful match: normalized line text plus parsed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Line text with leading whitespace removed.
    pub text: String,
    /// Type-specific data.
    pub kind: LineKind,
}

/// A per-type line recognizer and formatter.
pub trait LineClassifier: Send + Sync {
    /// The type this classifier produces.
    fn line_type(&self) -> LineType;

    /// Match raw line text.
    fn capture(&self, raw: &str) -> Option<Capture>;

    /// Store a capture produced by [`capture`](Self::capture) on `line`.
    fn parse(&self, line: &mut Line, capture: Capture) {
        let segments = plain_segments(&capture.text);
        line.set_parsed(capture.text, capture.kind, segments);
    }

    /// Recompute indentation; returns `new selectable length - old selectable length`.
    fn format(&self, line: &mut Line, context: &FormatContext) -> isize;

    /// Fold `line` into the context for the following lines.
    fn update_context(&self, _line: &Line, _context: &mut FormatContext) {}
}

fn plain_segments(text: &str) -> Vec<InlineSegment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![InlineSegment::Text(text.to_string())]
    }
}

fn leading_whitespace_trimmed(raw: &str) -> &str {
    raw.trim_start_matches([' ', '\t'])
}

fn set_indent(line: &mut Line, indent: usize) -> isize {
    let before = line.selectable_length() as isize;
    line.set_indent(indent);
    line.selectable_length() as isize - before
}

/// `#`..`######` followed by a space.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    indent_width: usize,
}

impl HeadingClassifier {
    /// Create a heading classifier; lines below a level-`n` heading indent by `n * indent_width`.
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }
}

impl LineClassifier for HeadingClassifier {
    fn line_type(&self) -> LineType {
        LineType::Heading
    }

    fn capture(&self, raw: &str) -> Option<Capture> {
        let caps = HEADING_REGEX.captures(raw)?;
        let level = caps.get(1)?.as_str().len();
        Some(Capture {
            text: leading_whitespace_trimmed(raw).to_string(),
            kind: LineKind::Heading { level },
        })
    }

    fn format(&self, line: &mut Line, _context: &FormatContext) -> isize {
        let level = line.section_level().unwrap_or(1);
        set_indent(line, level.saturating_sub(1) * self.indent_width)
    }

    fn update_context(&self, line: &Line, context: &mut FormatContext) {
        let level = line.section_level().unwrap_or(1);
        context.enter_section(level * self.indent_width);
    }
}

/// `#+key: value` metadata.
#[derive(Debug, Clone, Default)]
pub struct MetaClassifier;

impl LineClassifier for MetaClassifier {
    fn line_type(&self) -> LineType {
        LineType::Meta
    }

    fn capture(&self, raw: &str) -> Option<Capture> {
        let caps = META_REGEX.captures(raw)?;
        let key = caps.get(1)?.as_str().to_string();
        let value = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let tag = MetaTag::from_key(&key);
        if tag == MetaTag::Unknown {
            tracing::debug!(key = %key, "unrecognized meta key");
        }
        Some(Capture {
            text: leading_whitespace_trimmed(raw).to_string(),
            kind: LineKind::Meta { key, value, tag },
        })
    }

    fn format(&self, line: &mut Line, _context: &FormatContext) -> isize {
        set_indent(line, 0)
    }
}

/// List items: nesting setters, then a bullet or `<int>.`, then a space.
///
/// `- a` is depth 1, `-- b` is depth 2 (one setter), `--1. c` is an ordered item at depth 3.
#[derive(Debug, Clone, Default)]
pub struct ListClassifier;

impl ListClassifier {
    fn prefix_len(setters: usize, marker: ListMarker) -> usize {
        setters + marker.render().chars().count() + 1
    }
}

impl LineClassifier for ListClassifier {
    fn line_type(&self) -> LineType {
        LineType::List
    }

    fn capture(&self, raw: &str) -> Option<Capture> {
        let caps = LIST_REGEX.captures(raw)?;
        let setters = caps.get(1)?.as_str().len();
        let marker_text = caps.get(2)?.as_str();
        let marker = match marker_text.strip_suffix('.') {
            Some(digits) => ListMarker::Ordinal(digits.parse().ok()?),
            None => ListMarker::Bullet(marker_text.chars().next()?),
        };
        Some(Capture {
            text: leading_whitespace_trimmed(raw).to_string(),
            kind: LineKind::List {
                level: setters + 1,
                setters,
                marker,
            },
        })
    }

    fn parse(&self, line: &mut Line, capture: Capture) {
        let mut segments = Vec::new();
        if let LineKind::List {
            setters, marker, ..
        } = capture.kind
        {
            let prefix_len = Self::prefix_len(setters, marker);
            let prefix = char_slice(&capture.text, 0, prefix_len);
            let body = char_slice(&capture.text, prefix_len, usize::MAX);
            segments.push(InlineSegment::Text(prefix.to_string()));
            for segment in scan_segments(body) {
                if let (InlineSegment::Text(next), Some(InlineSegment::Text(last))) =
                    (&segment, segments.last_mut())
                {
                    last.push_str(next);
                    continue;
                }
                segments.push(segment);
            }
        }
        line.set_parsed(capture.text, capture.kind, segments);
    }

    fn format(&self, line: &mut Line, context: &FormatContext) -> isize {
        let before = line.selectable_length() as isize;
        let LineKind::List {
            level,
            setters,
            marker,
        } = *line.kind()
        else {
            return 0;
        };

        if let ListMarker::Ordinal(current) = marker {
            let ordinal = context.next_ordinal(level);
            if ordinal != current {
                let old_prefix = Self::prefix_len(setters, marker);
                let body = char_slice(line.text(), old_prefix, usize::MAX).to_string();
                let renumbered = ListMarker::Ordinal(ordinal);
                let text = format!("{}{} {}", "-".repeat(setters), renumbered.render(), body);
                self.parse(
                    line,
                    Capture {
                        text,
                        kind: LineKind::List {
                            level,
                            setters,
                            marker: renumbered,
                        },
                    },
                );
                tracing::trace!(from = current, to = ordinal, "renumbered list item");
            }
        }

        line.set_indent(context.indent_from_heading + context.list_self_indent(level));
        line.selectable_length() as isize - before
    }

    fn update_context(&self, line: &Line, context: &mut FormatContext) {
        if let LineKind::List {
            level,
            setters,
            marker,
        } = *line.kind()
        {
            let ordinal = match marker {
                ListMarker::Ordinal(n) => Some(n),
                ListMarker::Bullet(_) => None,
            };
            context.enter_list_item(level, Self::prefix_len(setters, marker), ordinal);
        }
    }
}

/// All-whitespace lines.
#[derive(Debug, Clone, Default)]
pub struct BlankClassifier;

impl LineClassifier for BlankClassifier {
    fn line_type(&self) -> LineType {
        LineType::Blank
    }

    fn capture(&self, raw: &str) -> Option<Capture> {
        raw.trim().is_empty().then(|| Capture {
            text: String::new(),
            kind: LineKind::Blank,
        })
    }

    fn format(&self, line: &mut Line, context: &FormatContext) -> isize {
        set_indent(line, context.indent_from_heading)
    }

    fn update_context(&self, _line: &Line, context: &mut FormatContext) {
        context.reset_list();
    }
}

/// Catch-all paragraph text with link and URL scanning.
#[derive(Debug, Clone, Default)]
pub struct ParagraphClassifier;

impl LineClassifier for ParagraphClassifier {
    fn line_type(&self) -> LineType {
        LineType::Paragraph
    }

    fn capture(&self, raw: &str) -> Option<Capture> {
        Some(Capture {
            text: leading_whitespace_trimmed(raw).to_string(),
            kind: LineKind::Paragraph,
        })
    }

    fn parse(&self, line: &mut Line, capture: Capture) {
        let segments = scan_segments(&capture.text);
        line.set_parsed(capture.text, capture.kind, segments);
    }

    fn format(&self, line: &mut Line, context: &FormatContext) -> isize {
        set_indent(
            line,
            context.indent_from_heading + context.indent_from_list,
        )
    }
}

/// An ordered list of classifiers; the first match wins.
pub struct ClassifierSet {
    classifiers: Vec<Box<dyn LineClassifier>>,
}

impl ClassifierSet {
    /// Build a set from classifiers in trial order.
    pub fn new(classifiers: Vec<Box<dyn LineClassifier>>) -> Self {
        Self { classifiers }
    }

    /// Heading > Meta > List > Blank > Paragraph.
    pub fn standard(indent_width: usize) -> Self {
        Self::new(vec![
            Box::new(HeadingClassifier::new(indent_width)),
            Box::new(MetaClassifier),
            Box::new(ListClassifier),
            Box::new(BlankClassifier),
            Box::new(ParagraphClassifier),
        ])
    }

    /// Line types in trial order.
    pub fn trial_order(&self) -> Vec<LineType> {
        self.classifiers.iter().map(|c| c.line_type()).collect()
    }

    /// The classifier responsible for `line_type`.
    pub fn for_type(&self, line_type: LineType) -> Option<&dyn LineClassifier> {
        self.classifiers
            .iter()
            .find(|c| c.line_type() == line_type)
            .map(|c| c.as_ref())
    }

    /// Classify and parse `line` (at `index`, for error reporting).
    pub fn classify(&self, line: &mut Line, index: usize) -> Result<LineType, EngineError> {
        for classifier in &self.classifiers {
            if let Some(capture) = classifier.capture(line.text()) {
                classifier.parse(line, capture);
                return Ok(classifier.line_type());
            }
        }
        Err(EngineError::UnclassifiableLine {
            index,
            text: line.text().to_string(),
        })
    }
}

impl Default for ClassifierSet {
    fn default() -> Self {
        Self::standard(DEFAULT_INDENT_WIDTH)
    }
}

impl std::fmt::Debug for ClassifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSet")
            .field("trial_order", &self.trial_order())
            .finish()
    }
}
