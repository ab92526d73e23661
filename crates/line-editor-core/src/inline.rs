//! Inline segment scanning.
//!
//! Paragraph and list text is split into alternating plain-text and markup runs. Two kinds of
//! markup are recognized: `[title](target)` links and bare `http(s)://` URLs. At any given
//! position the link pattern is tried before the URL pattern, so a URL used as a link target
//! never surfaces as a separate run.

use regex::Regex;
use std::sync::LazyLock;

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("Invalid link regex")
});

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("Invalid URL regex"));

/// One rendered run of a line's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSegment {
    /// Unstyled text.
    Text(String),
    /// A `[title](target)` span.
    Link {
        /// Text between the brackets.
        title: String,
        /// Text between the parentheses.
        target: String,
    },
    /// A bare URL.
    Url(String),
}

impl InlineSegment {
    /// The source text this segment was produced from.
    pub fn source_text(&self) -> String {
        match self {
            Self::Text(text) | Self::Url(text) => text.clone(),
            Self::Link { title, target } => format!("[{title}]({target})"),
        }
    }
}

/// Split `text` into plain and markup segments, scanning left to right.
///
/// Concatenating [`InlineSegment::source_text`] of the result reproduces `text`.
pub fn scan_segments(text: &str) -> Vec<InlineSegment> {
    let mut segments = Vec::new();
    let mut pos = 0usize;

    while pos < text.len() {
        let link = LINK_REGEX.captures_at(text, pos);
        let url = URL_REGEX
            .find_at(text, pos)
            .map(|m| (m.start(), trim_url_end(text, m.start(), m.end())));

        let link_start = link
            .as_ref()
            .and_then(|caps| caps.get(0))
            .map(|m| m.start());
        let url_start = url.map(|(start, _)| start);

        // Ties go to the link pattern.
        let take_link = match (link_start, url_start) {
            (Some(l), Some(u)) => l <= u,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if take_link {
            let Some(caps) = link else { break };
            let Some(whole) = caps.get(0) else { break };
            push_text(&mut segments, &text[pos..whole.start()]);
            segments.push(InlineSegment::Link {
                title: caps
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                target: caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            });
            pos = whole.end();
        } else {
            let Some((start, end)) = url else { break };
            if end <= start {
                push_text(&mut segments, &text[pos..start + 1]);
                pos = start + 1;
                continue;
            }
            push_text(&mut segments, &text[pos..start]);
            segments.push(InlineSegment::Url(text[start..end].to_string()));
            pos = end;
        }
    }

    push_text(&mut segments, &text[pos.min(text.len())..]);
    segments
}

fn push_text(segments: &mut Vec<InlineSegment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(InlineSegment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(InlineSegment::Text(text.to_string()));
    }
}

/// Drop trailing punctuation that usually belongs to the sentence, not the URL.
fn trim_url_end(text: &str, start: usize, mut end: usize) -> usize {
    while end > start {
        let Some(last) = text[start..end].chars().last() else {
            break;
        };
        if matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | ')' | '}') {
            end -= last.len_utf8();
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> InlineSegment {
        InlineSegment::Text(s.to_string())
    }

    #[test]
    fn test_plain_text_is_single_segment() {
        assert_eq!(scan_segments("just words"), vec![text("just words")]);
        assert!(scan_segments("").is_empty());
    }

    #[test]
    fn test_link_and_url_alternate_with_text() {
        let segments = scan_segments("see [docs](https://a.example/x) or https://b.example.");
        assert_eq!(
            segments,
            vec![
                text("see "),
                InlineSegment::Link {
                    title: "docs".to_string(),
                    target: "https://a.example/x".to_string(),
                },
                text(" or "),
                InlineSegment::Url("https://b.example".to_string()),
                text("."),
            ]
        );
    }

    #[test]
    fn test_segments_reproduce_source() {
        let source = "a [b](c) http://d.e/f, [unclosed](x";
        let rebuilt: String = scan_segments(source)
            .iter()
            .map(InlineSegment::source_text)
            .collect();
        assert_eq!(rebuilt, source);
    }
}
