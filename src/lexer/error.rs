//! Lexical error types.
//!
//! Lexical errors never stop scanning: the lexer records them and keeps
//! going, so a single pass reports every bad character in the file.

use crate::ast::Span;
use thiserror::Error;

/// A lexical error with its location.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    /// A string literal ran into the end of the line.
    #[error("unterminated string literal")]
    UnterminatedString {
        /// Location of the partial literal.
        span: Span,
    },

    /// A character that cannot start any token.
    #[error("unexpected character `{ch}`")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Location of the character.
        span: Span,
    },
}

impl LexError {
    /// Returns the span of this error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span } => *span,
            LexError::UnexpectedCharacter { span, .. } => *span,
        }
    }
}
