//! Line ending helpers.
//!
//! The engine splits documents on LF (`'\n'`) only. Incoming text (loaded documents and pasted
//! clipboard contents) is normalized first; the preferred line ending is re-applied on export.

use std::borrow::Cow;

/// The preferred newline sequence used when exporting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: if the input contains any CRLF (`"\r\n"`), returns [`LineEnding::Crlf`],
    /// otherwise [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Convert an LF-normalized text to this line ending.
    pub fn apply_to_text(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::Crlf => text.replace('\n', "\r\n"),
        }
    }
}

/// Rewrite CRLF and lone CR newlines as LF. Borrows when there is nothing to rewrite.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert!(matches!(normalize("a\nb"), Cow::Borrowed("a\nb")));
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_detect_and_apply() {
        let ending = LineEnding::detect_in_text("x\r\ny");
        assert_eq!(ending, LineEnding::Crlf);
        assert_eq!(ending.apply_to_text("x\ny"), "x\r\ny");
        assert_eq!(LineEnding::Lf.apply_to_text("x\ny"), "x\ny");
    }
}
