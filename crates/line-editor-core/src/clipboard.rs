//! Clipboard seam.
//!
//! The engine only reads and writes plain text; hosts plug in the system clipboard.

/// A text clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents.
    fn write_text(&mut self, text: &str);

    /// Current contents, if any.
    fn read_text(&mut self) -> Option<String>;
}

/// Process-local clipboard, useful for tests and headless hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard pre-filled with `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }

    /// Peek at the contents without the trait's `&mut`.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }

    fn read_text(&mut self) -> Option<String> {
        self.contents.clone()
    }
}
