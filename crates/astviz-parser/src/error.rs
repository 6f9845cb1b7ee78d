//! Errors raised while turning source text into a syntax tree.

use thiserror::Error;

/// Error type for the parse step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Untrusted input exceeded the character ceiling; nothing was parsed.
    #[error("input code is too large ({length} characters, limit is {limit})")]
    InputTooLarge { length: usize, limit: usize },

    /// The source is not valid Python.
    #[error("{message} at line {line}, column {column}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// The source nests deeper than the pipeline accepts.
    #[error("code is nested too deeply at line {line}, column {column} (limit is {limit} levels)")]
    NestingTooDeep {
        line: usize,
        column: usize,
        limit: usize,
    },

    /// The Python grammar could not be loaded or produced no tree.
    #[error("failed to load Python grammar: {0}")]
    Language(String),
}

impl ParseError {
    /// Returns `true` if the error was raised by the size guard.
    pub fn is_input_too_large(&self) -> bool {
        matches!(self, Self::InputTooLarge { .. })
    }
}
