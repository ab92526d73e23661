//! Engine error type.
//!
//! Only internal-consistency failures surface from the engine. Out-of-range carets, an
//! unavailable width oracle and undo/redo past the stack bounds are all recovered where they
//! happen and never reach the caller.

use thiserror::Error;

/// Errors produced by the editing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No classifier in the active set accepted a line.
    ///
    /// The paragraph classifier matches every input, so this indicates a misconfigured
    /// [`ClassifierSet`](crate::ClassifierSet) rather than bad document content.
    #[error("no classifier matched line {index}: {text:?}")]
    UnclassifiableLine {
        /// Zero-based index of the offending line.
        index: usize,
        /// Raw text of the offending line.
        text: String,
    },

    /// A command carried arguments that cannot be applied.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
